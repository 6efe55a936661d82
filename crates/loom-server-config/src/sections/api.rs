// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inbound API authentication.

use loom_common_config::SecretString;
use serde::Deserialize;

/// API configuration (runtime, fully resolved).
///
/// Without a token every protected route answers 401.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
	pub token: Option<SecretString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfigLayer {
	#[serde(default)]
	pub token: Option<SecretString>,
}

impl ApiConfigLayer {
	pub fn merge(&mut self, other: ApiConfigLayer) {
		if other.token.is_some() {
			self.token = other.token;
		}
	}

	pub fn finalize(self) -> ApiConfig {
		ApiConfig {
			token: self.token.filter(|t| !t.expose().is_empty()),
		}
	}
}
