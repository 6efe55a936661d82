// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Paired secondary account configuration.

use serde::Deserialize;

const DEFAULT_PROVIDER: &str = "keycloak";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedConfig {
	pub enabled: bool,
	/// Stored as the account's `provider` column.
	pub provider: String,
}

impl Default for PairedConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			provider: DEFAULT_PROVIDER.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairedConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub provider: Option<String>,
}

impl PairedConfigLayer {
	pub fn merge(&mut self, other: PairedConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.provider.is_some() {
			self.provider = other.provider;
		}
	}

	pub fn finalize(self) -> PairedConfig {
		PairedConfig {
			enabled: self.enabled.unwrap_or(true),
			provider: self
				.provider
				.unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_enabled_by_default() {
		assert_eq!(PairedConfigLayer::default().finalize(), PairedConfig::default());
	}

	#[test]
	fn test_disable() {
		let mut layer = PairedConfigLayer::default();
		layer.merge(PairedConfigLayer {
			enabled: Some(false),
			provider: None,
		});
		let config = layer.finalize();
		assert!(!config.enabled);
		assert_eq!(config.provider, "keycloak");
	}
}
