// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loom directory bridge server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use loom_server::{create_directory_client, create_provisioning_service, create_router, version};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loom directory bridge - provisions users and group memberships in the
/// identity directory.
#[derive(Parser, Debug)]
#[command(
	name = "loom-server",
	about = "Loom directory provisioning bridge",
	version
)]
struct Args {
	/// Path to the TOML config file
	#[arg(long, env = "LOOM_SERVER_CONFIG", default_value = loom_server_config::SYSTEM_CONFIG_PATH)]
	config: PathBuf,

	/// Subcommands for loom-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = loom_server_config::load_config_with_file(&args.config)?;

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		directory = %config.directory.url,
		realm = %config.directory.realm,
		"starting loom-server"
	);

	let pool = loom_server_db::create_pool(&config.database.url).await?;
	loom_server_db::run_migrations(&pool).await?;

	let directory = Arc::new(create_directory_client(&config.directory)?);
	let service = Arc::new(create_provisioning_service(&config, directory, pool));
	let app = create_router(&config, service);

	if config.api.token.is_none() {
		tracing::warn!("no API token configured, all protected routes will answer 401");
	}

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
