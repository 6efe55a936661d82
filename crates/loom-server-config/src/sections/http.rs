// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Listener address of the bridge API.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl HttpConfig {
	/// `host:port` as passed to the TCP listener.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
	}

	/// Rejects port 0 and a blank host.
	pub fn finalize(self) -> Result<HttpConfig, ConfigError> {
		let host = match self.host {
			Some(host) if host.trim().is_empty() => {
				return Err(ConfigError::InvalidValue {
					key: "http.host".to_string(),
					message: "must not be empty".to_string(),
				});
			}
			Some(host) => host,
			None => DEFAULT_HOST.to_string(),
		};

		let port = self.port.unwrap_or(DEFAULT_PORT);
		if port == 0 {
			return Err(ConfigError::InvalidValue {
				key: "http.port".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		Ok(HttpConfig { host, port })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unset_layer_listens_on_all_interfaces() {
		let config = HttpConfigLayer::default().finalize().unwrap();
		assert_eq!(config, HttpConfig::default());
		assert_eq!(config.socket_addr(), "0.0.0.0:8080");
	}

	#[test]
	fn test_later_layer_wins_per_field() {
		let mut base = HttpConfigLayer {
			host: Some("127.0.0.1".to_string()),
			port: Some(9000),
		};
		base.merge(HttpConfigLayer {
			port: Some(9443),
			..Default::default()
		});
		assert_eq!(base.finalize().unwrap().socket_addr(), "127.0.0.1:9443");
	}

	#[test]
	fn test_port_zero_rejected() {
		let layer = HttpConfigLayer {
			port: Some(0),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("http.port"));
	}

	#[test]
	fn test_blank_host_rejected() {
		let layer = HttpConfigLayer {
			host: Some("  ".to_string()),
			..Default::default()
		};
		assert!(matches!(
			layer.finalize(),
			Err(ConfigError::InvalidValue { key, .. }) if key == "http.host"
		));
	}
}
