// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Facet names and temporary credential settings.

use loom_directory_core::{FacetConfig, DEFAULT_TEMPORARY_PASSWORD_LENGTH};
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub associations: Option<Vec<String>>,
	#[serde(default)]
	pub types: Option<Vec<String>>,
	#[serde(default)]
	pub profile_prefix: Option<String>,
	#[serde(default)]
	pub temporary_password_length: Option<usize>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.associations.is_some() {
			self.associations = other.associations;
		}
		if other.types.is_some() {
			self.types = other.types;
		}
		if other.profile_prefix.is_some() {
			self.profile_prefix = other.profile_prefix;
		}
		if other.temporary_password_length.is_some() {
			self.temporary_password_length = other.temporary_password_length;
		}
	}

	pub fn finalize(self) -> Result<ProvisioningSettings, ConfigError> {
		let defaults = FacetConfig::default();
		let facets = FacetConfig {
			associations: self.associations.unwrap_or(defaults.associations),
			types: self.types.unwrap_or(defaults.types),
			profile_prefix: self.profile_prefix.unwrap_or(defaults.profile_prefix),
		};
		facets.validate()?;

		let temporary_password_length = self
			.temporary_password_length
			.unwrap_or(DEFAULT_TEMPORARY_PASSWORD_LENGTH);
		if temporary_password_length == 0 {
			return Err(ConfigError::InvalidValue {
				key: "provisioning.temporary_password_length".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		Ok(ProvisioningSettings {
			facets,
			temporary_password_length,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningSettings {
	pub facets: FacetConfig,
	pub temporary_password_length: usize,
}

impl Default for ProvisioningSettings {
	fn default() -> Self {
		Self {
			facets: FacetConfig::default(),
			temporary_password_length: DEFAULT_TEMPORARY_PASSWORD_LENGTH,
		}
	}
}
