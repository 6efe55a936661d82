// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loom directory bridge server.
//!
//! Wires the configuration, the Keycloak admin client, the paired-account
//! database and the provisioning service into one axum router.

pub mod error;
pub mod version;

use std::sync::Arc;

use axum::Router;
use loom_directory_client::{DirectoryClient, KeycloakClient, KeycloakConfig};
use loom_server_config::DirectoryConfig;
use loom_server_db::PairedAccountRepository;
use loom_server_directory::directory_routes;
use loom_server_provisioning::{
	PairedAccountProvisioner, ProvisioningConfig, UserProvisioningService,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub use error::ServerError;
pub use loom_server_config::ServerConfig;

pub fn keycloak_config(config: &DirectoryConfig) -> KeycloakConfig {
	KeycloakConfig::new(
		config.url.clone(),
		config.realm.clone(),
		config.client_id.clone(),
		config.client_secret.clone(),
	)
	.with_timeout(config.timeout)
	.with_retry_config(config.retry_config())
}

pub fn create_directory_client(config: &DirectoryConfig) -> Result<KeycloakClient, ServerError> {
	Ok(KeycloakClient::new(keycloak_config(config))?)
}

/// The paired step is wired only when `paired.enabled` is set.
pub fn create_provisioning_service(
	config: &ServerConfig,
	directory: Arc<dyn DirectoryClient>,
	pool: SqlitePool,
) -> UserProvisioningService {
	let paired = config.paired.enabled.then(|| {
		PairedAccountProvisioner::new(
			Arc::new(PairedAccountRepository::new(pool)),
			config.paired.provider.clone(),
		)
	});

	UserProvisioningService::new(
		directory,
		paired,
		ProvisioningConfig {
			facets: config.provisioning.facets.clone(),
			temporary_password_length: config.provisioning.temporary_password_length,
		},
	)
}

pub fn create_router(config: &ServerConfig, service: Arc<UserProvisioningService>) -> Router {
	directory_routes(config.api.token.clone(), service).layer(TraceLayer::new_for_http())
}
