// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Bytes,
	extract::{Path, Query, State},
	http::StatusCode,
	Json,
};
use loom_directory_core::{fields, UserRecord};
use loom_server_provisioning::ProvisionedUser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::DirectoryApiError;
use crate::routes::DirectoryState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetResponse {
	pub temporary_password: String,
}

/// Body that is not JSON is treated like a missing body and fails
/// validation with `no_data`.
fn parse_body(body: &Bytes) -> Value {
	serde_json::from_slice(body).unwrap_or(Value::Null)
}

pub async fn list_users(
	State(state): State<DirectoryState>,
	Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<UserRecord>>, DirectoryApiError> {
	Ok(Json(state.provisioning.list_users(&query).await?))
}

pub async fn create_user(
	State(state): State<DirectoryState>,
	body: Bytes,
) -> Result<(StatusCode, Json<UserRecord>), DirectoryApiError> {
	let user = state.provisioning.provision_user(parse_body(&body)).await?;

	info!(
		user_id = %user.user_id,
		secondary = ?user.secondary,
		"provisioned directory user"
	);

	Ok((StatusCode::CREATED, Json(created_body(user))))
}

/// The normalized fields plus the identifiers and facets assigned during
/// creation.
fn created_body(user: ProvisionedUser) -> UserRecord {
	let mut body = user.fields;
	body.insert(fields::ID.to_string(), Value::String(user.user_id));
	if let Some(association) = user.association {
		body.insert(fields::ASSOCIATION.to_string(), Value::String(association));
	}
	if let Some(user_type) = user.user_type {
		body.insert(fields::TYPE.to_string(), Value::String(user_type));
	}
	body.insert(fields::PROFILES.to_string(), json!(user.profiles));
	body.insert(
		"temporaryPassword".to_string(),
		Value::String(user.temporary_password),
	);
	if let Some(account_id) = user.secondary.account_id() {
		body.insert(
			"secondaryAccountId".to_string(),
			Value::String(account_id.to_string()),
		);
	}
	body
}

pub async fn get_user(
	State(state): State<DirectoryState>,
	Path(id): Path<String>,
) -> Result<Json<UserRecord>, DirectoryApiError> {
	Ok(Json(state.provisioning.get_user(&id).await?))
}

pub async fn patch_user(
	State(state): State<DirectoryState>,
	Path(id): Path<String>,
	body: Bytes,
) -> Result<Json<UserRecord>, DirectoryApiError> {
	let updated = state
		.provisioning
		.update_user(&id, parse_body(&body))
		.await?;
	Ok(Json(updated.user))
}

/// Users are never deleted through this API.
pub async fn delete_user(Path(_id): Path<String>) -> DirectoryApiError {
	DirectoryApiError::MethodNotAllowed
}

pub async fn reset_password(
	State(state): State<DirectoryState>,
	Path(id): Path<String>,
) -> Result<Json<PasswordResetResponse>, DirectoryApiError> {
	let temporary_password = state.provisioning.reset_password(&id).await?;
	Ok(Json(PasswordResetResponse { temporary_password }))
}
