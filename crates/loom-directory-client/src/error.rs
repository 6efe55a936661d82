// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_common_http::RetryableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("directory request timed out")]
	Timeout,

	#[error("directory rejected the service credentials")]
	Unauthorized,

	#[error("directory resource not found")]
	NotFound,

	#[error("directory returned {status}: {message}")]
	Api { status: u16, message: String },

	#[error("invalid directory response: {0}")]
	InvalidResponse(String),

	#[error("directory client misconfigured: {0}")]
	Config(String),
}

impl RetryableError for DirectoryError {
	fn is_retryable(&self) -> bool {
		match self {
			DirectoryError::Network(e) => e.is_retryable(),
			DirectoryError::Timeout => true,
			DirectoryError::Api { status, .. } => *status == 429 || *status >= 500,
			DirectoryError::Unauthorized
			| DirectoryError::NotFound
			| DirectoryError::InvalidResponse(_)
			| DirectoryError::Config(_) => false,
		}
	}
}
