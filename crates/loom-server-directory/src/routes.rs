// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use loom_common_config::SecretString;
use loom_server_provisioning::UserProvisioningService;

use crate::auth::bearer_auth_middleware;
use crate::handlers::{groups, health, users};

#[derive(Clone)]
pub struct DirectoryState {
	pub provisioning: Arc<UserProvisioningService>,
}

/// Build the API router. `/health` and `DELETE /users/{id}` are public;
/// everything else requires the bearer token.
pub fn directory_routes(
	token: Option<SecretString>,
	provisioning: Arc<UserProvisioningService>,
) -> Router {
	let state = DirectoryState { provisioning };
	let auth = middleware::from_fn_with_state(token, bearer_auth_middleware);

	// route_layer only covers the methods registered before it, so DELETE
	// answers 405 without a token.
	let user = get(users::get_user)
		.patch(users::patch_user)
		.route_layer(auth.clone())
		.delete(users::delete_user);

	let protected = Router::new()
		.route("/users", get(users::list_users).post(users::create_user))
		.route("/users/{id}/password", post(users::reset_password))
		.route("/associations", get(groups::list_associations))
		.route("/types", get(groups::list_types))
		.route("/profiles", get(groups::list_profiles))
		.route_layer(auth);

	Router::new()
		.route("/health", get(health::health))
		.route("/users/{id}", user)
		.merge(protected)
		.with_state(state)
}
