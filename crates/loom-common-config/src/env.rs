// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment helpers for secrets.
//!
//! Secrets can be provided either directly (`VAR=value`) or through a mounted
//! file (`VAR_FILE=/run/secrets/name`), which is how the directory client
//! secret is normally delivered in Kubernetes.

use std::path::PathBuf;
use std::{env, fs};

use thiserror::Error;

use crate::secret::Secret;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {file_var}")]
	Missing { var: String, file_var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}

/// Load a secret from `{var}_FILE` (preferred) or `{var}`.
///
/// A single trailing newline is stripped from file contents. Returns
/// `Ok(None)` when neither variable is set.
pub fn load_secret_env(var: &str) -> Result<Option<Secret<String>>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		let value = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(Secret::new(value)));
	}

	match env::var(var) {
		Ok(value) if !value.is_empty() => Ok(Some(Secret::new(value))),
		_ => Ok(None),
	}
}

/// Like [`load_secret_env`] but fails when the secret is absent.
pub fn require_secret_env(var: &str) -> Result<Secret<String>, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}
