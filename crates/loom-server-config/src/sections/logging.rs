// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use serde::Deserialize;

fn default_level() -> String {
	"info,tower_http::trace=debug,loom_directory_client=debug".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(default_level),
		}
	}
}

/// `level` is an `EnvFilter` directive string; `RUST_LOG` wins when set.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_level(),
		}
	}
}
