// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use loom_directory_client::DirectoryError;
use loom_directory_core::ValidationError;
use loom_server_provisioning::ProvisioningError;
use serde::Serialize;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	pub message: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryApiError {
	#[error("unauthorized")]
	Unauthorized,
	#[error("not found")]
	NotFound,
	#[error("method not allowed")]
	MethodNotAllowed,
	#[error("validation failed: {0}")]
	Validation(ValidationError),
	/// The directory failed. `user_id` is set when the user was created
	/// before the failure.
	#[error("upstream failure: {message}")]
	Upstream {
		message: String,
		user_id: Option<String>,
	},
	#[error("internal error: {0}")]
	Internal(String),
}

impl DirectoryApiError {
	fn status(&self) -> StatusCode {
		match self {
			DirectoryApiError::Unauthorized => StatusCode::UNAUTHORIZED,
			DirectoryApiError::NotFound => StatusCode::NOT_FOUND,
			DirectoryApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
			DirectoryApiError::Validation(_) => StatusCode::BAD_REQUEST,
			DirectoryApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
			DirectoryApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message_key(&self) -> &'static str {
		match self {
			DirectoryApiError::Unauthorized => "api_errors.unauthorized",
			DirectoryApiError::NotFound => "api_errors.not_found",
			DirectoryApiError::MethodNotAllowed => "api_errors.method_not_allowed",
			DirectoryApiError::Validation(_) => "api_errors.validation_failed",
			DirectoryApiError::Upstream { .. } => "api_errors.upstream_failed",
			DirectoryApiError::Internal(_) => "api_errors.internal",
		}
	}
}

impl From<DirectoryError> for DirectoryApiError {
	fn from(e: DirectoryError) -> Self {
		match e {
			DirectoryError::NotFound => DirectoryApiError::NotFound,
			DirectoryError::Config(msg) => DirectoryApiError::Internal(msg),
			other => DirectoryApiError::Upstream {
				message: other.to_string(),
				user_id: None,
			},
		}
	}
}

impl From<ProvisioningError> for DirectoryApiError {
	fn from(e: ProvisioningError) -> Self {
		match e {
			ProvisioningError::Validation(v) => DirectoryApiError::Validation(v),
			ProvisioningError::Directory(d) => d.into(),
			ProvisioningError::PartialFailure {
				user_id, source, ..
			} => DirectoryApiError::Upstream {
				message: source.to_string(),
				user_id: Some(user_id),
			},
		}
	}
}

impl IntoResponse for DirectoryApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = self.message_key();

		let body = match self {
			DirectoryApiError::Validation(v) => ErrorResponse {
				message,
				error_message: Some(v.message()),
				user_id: None,
			},
			DirectoryApiError::Upstream { message: error, user_id } => {
				tracing::warn!(error = %error, user_id = ?user_id, "directory request failed");
				ErrorResponse {
					message,
					error_message: Some(error),
					user_id,
				}
			}
			DirectoryApiError::Internal(error) => {
				tracing::error!(error = %error, "internal error");
				ErrorResponse {
					message,
					error_message: None,
					user_id: None,
				}
			}
			_ => ErrorResponse {
				message,
				error_message: None,
				user_id: None,
			},
		};

		(status, Json(body)).into_response()
	}
}
