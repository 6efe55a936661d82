// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Facet classification of directory groups by naming convention.

use serde::{Deserialize, Serialize};

use crate::error::FacetConfigError;

/// The facet a directory group belongs to.
///
/// Association and type are exclusive (a user holds at most one of each);
/// profiles are multi-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
	Association,
	Type,
	Profile,
	Unclassified,
}

impl Facet {
	pub fn is_exclusive(self) -> bool {
		matches!(self, Facet::Association | Facet::Type)
	}
}

impl std::fmt::Display for Facet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Facet::Association => write!(f, "association"),
			Facet::Type => write!(f, "type"),
			Facet::Profile => write!(f, "profile"),
			Facet::Unclassified => write!(f, "unclassified"),
		}
	}
}

/// Deployment-specific naming convention for facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetConfig {
	pub associations: Vec<String>,
	pub types: Vec<String>,
	pub profile_prefix: String,
}

impl Default for FacetConfig {
	fn default() -> Self {
		Self {
			associations: ["hsm", "hst", "hfgg", "hfgo", "kisd", "ext"]
				.into_iter()
				.map(String::from)
				.collect(),
			types: ["staff", "student", "management"]
				.into_iter()
				.map(String::from)
				.collect(),
			profile_prefix: "gpu-".to_string(),
		}
	}
}

impl FacetConfig {
	pub fn classify(&self, group_name: &str) -> Facet {
		if self.is_association(group_name) {
			Facet::Association
		} else if self.is_type(group_name) {
			Facet::Type
		} else if self.is_profile(group_name) {
			Facet::Profile
		} else {
			Facet::Unclassified
		}
	}

	pub fn is_association(&self, name: &str) -> bool {
		self.associations.iter().any(|a| a == name)
	}

	pub fn is_type(&self, name: &str) -> bool {
		self.types.iter().any(|t| t == name)
	}

	pub fn is_profile(&self, name: &str) -> bool {
		name.starts_with(&self.profile_prefix)
	}

	/// Reject configurations where a name could fall into two facets.
	pub fn validate(&self) -> Result<(), FacetConfigError> {
		if self.profile_prefix.is_empty() {
			return Err(FacetConfigError::EmptyProfilePrefix);
		}
		if let Some(name) = self.associations.iter().find(|a| self.is_type(a)) {
			return Err(FacetConfigError::Overlap(name.clone()));
		}
		if let Some(name) = self
			.associations
			.iter()
			.chain(self.types.iter())
			.find(|n| self.is_profile(n))
		{
			return Err(FacetConfigError::MatchesProfilePrefix(name.clone()));
		}
		Ok(())
	}
}
