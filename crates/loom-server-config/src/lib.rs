// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Loom directory bridge.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`LOOM_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use loom_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub database: DatabaseConfig,
	pub directory: DirectoryConfig,
	pub provisioning: ProvisioningSettings,
	pub paired: PairedConfig,
	pub api: ApiConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		self.http.socket_addr()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOOM_SERVER_*`)
/// 2. Config file (`/etc/loom/directory.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_config_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let directory = layer.directory.unwrap_or_default().finalize()?;
	let provisioning = layer.provisioning.unwrap_or_default().finalize()?;
	let paired = layer.paired.unwrap_or_default().finalize();
	let api = layer.api.unwrap_or_default().finalize();

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		directory_url = %directory.url,
		realm = %directory.realm,
		associations = provisioning.facets.associations.len(),
		types = provisioning.facets.types.len(),
		paired_enabled = paired.enabled,
		api_token_configured = api.token.is_some(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		logging,
		database,
		directory,
		provisioning,
		paired,
		api,
	})
}
