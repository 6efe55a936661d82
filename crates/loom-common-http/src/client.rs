// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};

/// Client builder preloaded with the service User-Agent.
///
/// Callers add their own timeout before `build()`.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// `loom-directory/{version}`; directory audit logs show this per admin call.
pub fn user_agent() -> String {
	format!("loom-directory/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_names_service_and_version() {
		let ua = user_agent();
		let (name, version) = ua.split_once('/').unwrap();
		assert_eq!(name, "loom-directory");
		assert!(!version.is_empty());
	}

	#[test]
	fn builder_produces_client() {
		assert!(builder().build().is_ok());
	}
}
