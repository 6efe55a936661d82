// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use loom_directory_core::{Group, UserRecord};

use crate::error::DirectoryError;

/// Operations the provisioning service needs from the directory.
///
/// Every call is a separate remote request; nothing here is transactional.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
	/// List users, passing the caller's query pairs through unchanged.
	async fn list_users(&self, query: &[(String, String)])
		-> Result<Vec<UserRecord>, DirectoryError>;

	async fn get_user(&self, user_id: &str) -> Result<UserRecord, DirectoryError>;

	/// Create a user and return the identifier the directory assigned.
	async fn create_user(&self, user: &UserRecord) -> Result<String, DirectoryError>;

	async fn update_user(&self, user_id: &str, fields: &UserRecord) -> Result<(), DirectoryError>;

	async fn list_groups(&self) -> Result<Vec<Group>, DirectoryError>;

	async fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>, DirectoryError>;

	async fn add_membership(&self, user_id: &str, group_id: &str) -> Result<(), DirectoryError>;

	async fn remove_membership(&self, user_id: &str, group_id: &str)
		-> Result<(), DirectoryError>;

	/// Set a temporary password the user must change on next login.
	async fn reset_password(&self, user_id: &str, password: &str) -> Result<(), DirectoryError>;
}
