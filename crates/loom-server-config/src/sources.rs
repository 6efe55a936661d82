// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use loom_common_config::load_secret_env;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	ApiConfigLayer, DatabaseConfigLayer, DirectoryConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	PairedConfigLayer, ProvisioningConfigLayer,
};

/// Default location of the server's TOML config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/loom/directory.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOOM_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			logging: Some(load_logging_from_env()),
			database: Some(load_database_from_env()),
			directory: Some(load_directory_from_env()?),
			provisioning: Some(load_provisioning_from_env()?),
			paired: Some(load_paired_from_env()),
			api: Some(load_api_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|v| parse_list(&v))
}

fn parse_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}

fn secret_env(
	name: &str,
) -> Result<Option<loom_common_config::SecretString>, ConfigError> {
	load_secret_env(name).map_err(|e| ConfigError::Secret(e.to_string()))
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("LOOM_SERVER_HOST"),
		port: env_parse("LOOM_SERVER_PORT", "u16")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("LOOM_SERVER_LOG_LEVEL"),
	}
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("LOOM_SERVER_DATABASE_URL"),
	}
}

fn load_directory_from_env() -> Result<DirectoryConfigLayer, ConfigError> {
	Ok(DirectoryConfigLayer {
		url: env_var("LOOM_SERVER_DIRECTORY_URL"),
		realm: env_var("LOOM_SERVER_DIRECTORY_REALM"),
		client_id: env_var("LOOM_SERVER_DIRECTORY_CLIENT_ID"),
		client_secret: secret_env("LOOM_SERVER_DIRECTORY_CLIENT_SECRET")?,
		timeout_secs: env_parse("LOOM_SERVER_DIRECTORY_TIMEOUT_SECS", "u64")?,
		retry_max_attempts: env_parse("LOOM_SERVER_DIRECTORY_RETRY_MAX_ATTEMPTS", "u32")?,
	})
}

fn load_provisioning_from_env() -> Result<ProvisioningConfigLayer, ConfigError> {
	Ok(ProvisioningConfigLayer {
		associations: env_list("LOOM_SERVER_PROVISIONING_ASSOCIATIONS"),
		types: env_list("LOOM_SERVER_PROVISIONING_TYPES"),
		profile_prefix: env_var("LOOM_SERVER_PROVISIONING_PROFILE_PREFIX"),
		temporary_password_length: env_parse("LOOM_SERVER_PROVISIONING_PASSWORD_LENGTH", "usize")?,
	})
}

fn load_paired_from_env() -> PairedConfigLayer {
	PairedConfigLayer {
		enabled: env_bool("LOOM_SERVER_PAIRED_ENABLED"),
		provider: env_var("LOOM_SERVER_PAIRED_PROVIDER"),
	}
}

fn load_api_from_env() -> Result<ApiConfigLayer, ConfigError> {
	Ok(ApiConfigLayer {
		token: secret_env("LOOM_SERVER_API_TOKEN")?,
	})
}
