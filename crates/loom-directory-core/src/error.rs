// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

/// Aggregated field-level validation failure.
///
/// Codes follow `<field>_missing` / `<field>_invalid` and keep schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
	codes: Vec<String>,
}

impl ValidationError {
	pub fn new(codes: Vec<String>) -> Self {
		Self { codes }
	}

	pub fn no_data() -> Self {
		Self::new(vec!["no_data".to_string()])
	}

	pub fn codes(&self) -> &[String] {
		&self.codes
	}

	pub fn contains(&self, code: &str) -> bool {
		self.codes.iter().any(|c| c == code)
	}

	/// Comma-joined codes, as returned in `errorMessage`.
	pub fn message(&self) -> String {
		self.codes.join(",")
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message())
	}
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FacetConfigError {
	#[error("profile prefix must not be empty")]
	EmptyProfilePrefix,

	#[error("group name '{0}' is listed as both an association and a type")]
	Overlap(String),

	#[error("group name '{0}' also matches the profile prefix")]
	MatchesProfilePrefix(String),
}
