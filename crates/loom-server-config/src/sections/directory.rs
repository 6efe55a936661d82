// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity directory (Keycloak admin API) configuration section.

use std::time::Duration;

use loom_common_config::SecretString;
use loom_common_http::RetryConfig;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_CLIENT_ID: &str = "loom-directory";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Directory configuration layer (all fields optional for layering).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfigLayer {
	/// Keycloak base URL, without the `/admin` or `/realms` suffix.
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub realm: Option<String>,
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub client_secret: Option<SecretString>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub retry_max_attempts: Option<u32>,
}

impl DirectoryConfigLayer {
	pub fn merge(&mut self, other: DirectoryConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.realm.is_some() {
			self.realm = other.realm;
		}
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.client_secret.is_some() {
			self.client_secret = other.client_secret;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
		if other.retry_max_attempts.is_some() {
			self.retry_max_attempts = other.retry_max_attempts;
		}
	}

	pub fn finalize(self) -> Result<DirectoryConfig, ConfigError> {
		let raw_url = self
			.url
			.filter(|u| !u.trim().is_empty())
			.ok_or_else(|| ConfigError::Missing("directory.url".to_string()))?;
		let url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidValue {
			key: "directory.url".to_string(),
			message: e.to_string(),
		})?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::InvalidValue {
				key: "directory.url".to_string(),
				message: format!("unsupported scheme '{}'", url.scheme()),
			});
		}

		let realm = self
			.realm
			.filter(|r| !r.trim().is_empty())
			.ok_or_else(|| ConfigError::Missing("directory.realm".to_string()))?;

		let client_secret = self
			.client_secret
			.ok_or_else(|| ConfigError::Missing("directory.client_secret".to_string()))?;

		let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
		if timeout_secs == 0 {
			return Err(ConfigError::InvalidValue {
				key: "directory.timeout_secs".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		Ok(DirectoryConfig {
			url,
			realm,
			client_id: self
				.client_id
				.unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
			client_secret,
			timeout: Duration::from_secs(timeout_secs),
			retry_max_attempts: self
				.retry_max_attempts
				.unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS)
				.max(1),
		})
	}
}

/// Validated directory configuration.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
	pub url: Url,
	pub realm: String,
	pub client_id: String,
	pub client_secret: SecretString,
	pub timeout: Duration,
	pub retry_max_attempts: u32,
}

impl DirectoryConfig {
	pub fn retry_config(&self) -> RetryConfig {
		RetryConfig {
			max_attempts: self.retry_max_attempts,
			..RetryConfig::default()
		}
	}
}
