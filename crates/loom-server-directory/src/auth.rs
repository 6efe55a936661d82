// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::Response,
};
use loom_common_config::SecretString;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::DirectoryApiError;

/// Require `Authorization: Bearer <token>` matching the configured token.
/// With no token configured every request is rejected.
pub async fn bearer_auth_middleware(
	State(expected_token): State<Option<SecretString>>,
	request: Request,
	next: Next,
) -> Result<Response, DirectoryApiError> {
	let Some(expected) = expected_token else {
		warn!("API auth failed: no token configured");
		return Err(DirectoryApiError::Unauthorized);
	};

	let auth_header = request
		.headers()
		.get("Authorization")
		.and_then(|h| h.to_str().ok());

	let Some(auth_value) = auth_header else {
		warn!("API auth failed: missing Authorization header");
		return Err(DirectoryApiError::Unauthorized);
	};

	let Some(token) = auth_value.strip_prefix("Bearer ").map(str::trim) else {
		warn!("API auth failed: invalid Authorization format");
		return Err(DirectoryApiError::Unauthorized);
	};

	let expected_bytes = expected.expose().as_bytes();
	let token_bytes = token.as_bytes();

	if expected_bytes.len() != token_bytes.len() {
		warn!("API auth failed: token length mismatch");
		return Err(DirectoryApiError::Unauthorized);
	}

	if expected_bytes.ct_eq(token_bytes).into() {
		Ok(next.run(request).await)
	} else {
		warn!("API auth failed: invalid token");
		Err(DirectoryApiError::Unauthorized)
	}
}
