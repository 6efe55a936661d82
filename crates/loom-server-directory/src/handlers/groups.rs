// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{extract::State, Json};
use loom_directory_core::Facet;

use crate::error::DirectoryApiError;
use crate::routes::DirectoryState;

async fn facet_names(
	state: &DirectoryState,
	facet: Facet,
) -> Result<Json<Vec<String>>, DirectoryApiError> {
	Ok(Json(state.provisioning.facet_names(facet).await?))
}

pub async fn list_associations(
	State(state): State<DirectoryState>,
) -> Result<Json<Vec<String>>, DirectoryApiError> {
	facet_names(&state, Facet::Association).await
}

pub async fn list_types(
	State(state): State<DirectoryState>,
) -> Result<Json<Vec<String>>, DirectoryApiError> {
	facet_names(&state, Facet::Type).await
}

pub async fn list_profiles(
	State(state): State<DirectoryState>,
) -> Result<Json<Vec<String>>, DirectoryApiError> {
	facet_names(&state, Facet::Profile).await
}
