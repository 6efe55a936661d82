// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_directory_client::DirectoryError;
use loom_directory_core::{MembershipBatch, ValidationError};

/// Errors that can occur during user provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	/// The payload was rejected before any directory call was made.
	#[error("validation failed: {0}")]
	Validation(#[from] ValidationError),

	#[error("directory error: {0}")]
	Directory(#[from] DirectoryError),

	/// The user exists but a later step failed. Nothing is rolled back;
	/// `batch` holds every membership change attempted, including the failed one.
	#[error("user {user_id} left partially provisioned: {source}")]
	PartialFailure {
		user_id: String,
		batch: MembershipBatch,
		#[source]
		source: DirectoryError,
	},
}

impl ProvisioningError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, ProvisioningError::Directory(DirectoryError::NotFound))
	}
}
