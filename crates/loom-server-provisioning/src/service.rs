// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use loom_directory_client::DirectoryClient;
use loom_directory_core::{
	generate_temporary_password, project_user, project_user_with_memberships, validate_user, Facet,
	FacetConfig, MembershipBatch, Mode, SecondaryOutcome, UserRecord,
	DEFAULT_TEMPORARY_PASSWORD_LENGTH,
};
use serde_json::Value;

use crate::catalog::fetch_catalog;
use crate::error::ProvisioningError;
use crate::paired::PairedAccountProvisioner;
use crate::reconcile::{apply_plan, plan_facet_changes};
use crate::request::{CreateRequest, UpdateRequest};

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisioningError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
	pub facets: FacetConfig,
	pub temporary_password_length: usize,
}

impl Default for ProvisioningConfig {
	fn default() -> Self {
		Self {
			facets: FacetConfig::default(),
			temporary_password_length: DEFAULT_TEMPORARY_PASSWORD_LENGTH,
		}
	}
}

/// A user created by [`UserProvisioningService::provision_user`].
#[derive(Debug, Clone)]
pub struct ProvisionedUser {
	pub user_id: String,
	/// Normalized fields as sent to the directory.
	pub fields: UserRecord,
	pub association: Option<String>,
	pub user_type: Option<String>,
	pub profiles: Vec<String>,
	pub batch: MembershipBatch,
	pub temporary_password: String,
	pub secondary: SecondaryOutcome,
}

#[derive(Debug, Clone)]
pub struct UpdatedUser {
	/// The user as re-read from the directory after the update.
	pub user: UserRecord,
	pub batch: MembershipBatch,
}

/// Service for creating, reconciling and resetting directory users.
///
/// Every remote call is issued sequentially. Nothing is cached across calls
/// except the directory client's access token.
#[derive(Clone)]
pub struct UserProvisioningService {
	directory: Arc<dyn DirectoryClient>,
	paired: Option<PairedAccountProvisioner>,
	config: Arc<ProvisioningConfig>,
}

impl UserProvisioningService {
	pub fn new(
		directory: Arc<dyn DirectoryClient>,
		paired: Option<PairedAccountProvisioner>,
		config: ProvisioningConfig,
	) -> Self {
		Self {
			directory,
			paired,
			config: Arc::new(config),
		}
	}

	pub fn facets(&self) -> &FacetConfig {
		&self.config.facets
	}

	pub fn directory(&self) -> &dyn DirectoryClient {
		self.directory.as_ref()
	}

	/// Create a user, assign its facets, set a temporary password and attach
	/// the paired account.
	///
	/// Validation failures make no directory call. A failed create leaves
	/// nothing behind. Failures after the create return
	/// [`ProvisioningError::PartialFailure`] and are not rolled back.
	#[tracing::instrument(skip_all)]
	pub async fn provision_user(&self, payload: Value) -> Result<ProvisionedUser> {
		let normalized = validate_user(payload, Mode::Create, &self.config.facets)?;
		let request = CreateRequest::from_normalized(normalized);

		let catalog = fetch_catalog(self.directory(), &self.config.facets).await?;
		let plan = plan_facet_changes(&catalog, &[], &request.facets);

		let user_id = self.directory.create_user(&request.fields).await?;
		tracing::info!(user_id = %user_id, "directory user created");

		let batch = apply_plan(self.directory(), &user_id, plan).await?;

		let temporary_password = generate_temporary_password(self.config.temporary_password_length);
		if let Err(e) = self
			.directory
			.reset_password(&user_id, &temporary_password)
			.await
		{
			tracing::warn!(user_id = %user_id, error = %e, "setting temporary password failed");
			return Err(ProvisioningError::PartialFailure {
				user_id,
				batch,
				source: e,
			});
		}

		let assigned = |facet: Facet| -> Vec<String> {
			batch
				.applied()
				.filter(|change| change.facet == facet)
				.map(|change| change.group.name.clone())
				.collect()
		};
		let association = assigned(Facet::Association).into_iter().next();
		let user_type = assigned(Facet::Type).into_iter().next();
		let profiles = assigned(Facet::Profile);

		let secondary = match (&self.paired, request.skip_secondary_account) {
			(_, true) => SecondaryOutcome::skipped("suppressed by request"),
			(None, false) => SecondaryOutcome::skipped("paired accounts disabled"),
			(Some(paired), false) => {
				paired
					.provision(
						&user_id,
						&request.fields,
						association.as_deref(),
						user_type.as_deref(),
					)
					.await
			}
		};

		tracing::info!(
			user_id = %user_id,
			memberships = batch.len(),
			paired_account = secondary.account_id().unwrap_or("none"),
			"user provisioned"
		);

		Ok(ProvisionedUser {
			user_id,
			fields: request.fields,
			association,
			user_type,
			profiles,
			batch,
			temporary_password,
			secondary,
		})
	}

	/// Apply a partial update: reconcile requested facets, then pass the
	/// remaining fields to the directory and re-read the user.
	#[tracing::instrument(skip(self, payload))]
	pub async fn update_user(&self, user_id: &str, payload: Value) -> Result<UpdatedUser> {
		let normalized = validate_user(payload, Mode::Update, &self.config.facets)?;
		let request = UpdateRequest::from_normalized(normalized);

		let batch = if request.facets.is_empty() {
			MembershipBatch::new()
		} else {
			let current = self.directory.list_user_groups(user_id).await?;
			let catalog = fetch_catalog(self.directory(), &self.config.facets).await?;
			let plan = plan_facet_changes(&catalog, &current, &request.facets);
			tracing::debug!(changes = plan.len(), "planned membership changes");
			apply_plan(self.directory(), user_id, plan).await?
		};

		if let Err(e) = self.directory.update_user(user_id, &request.fields).await {
			if batch.is_empty() {
				return Err(e.into());
			}
			return Err(ProvisioningError::PartialFailure {
				user_id: user_id.to_string(),
				batch,
				source: e,
			});
		}

		let user = self.get_user(user_id).await?;
		tracing::info!(user_id, memberships = batch.len(), "user updated");
		Ok(UpdatedUser { user, batch })
	}

	/// Single-user read with facets derived from live memberships.
	#[tracing::instrument(skip(self))]
	pub async fn get_user(&self, user_id: &str) -> Result<UserRecord> {
		let record = self.directory.get_user(user_id).await?;
		let memberships = self.directory.list_user_groups(user_id).await?;
		Ok(project_user_with_memberships(
			&record,
			&memberships,
			&self.config.facets,
		))
	}

	/// List users; the query is passed through to the directory unchanged.
	#[tracing::instrument(skip(self))]
	pub async fn list_users(&self, query: &[(String, String)]) -> Result<Vec<UserRecord>> {
		let users = self.directory.list_users(query).await?;
		Ok(users.iter().map(project_user).collect())
	}

	/// Set and return a fresh temporary password.
	#[tracing::instrument(skip(self))]
	pub async fn reset_password(&self, user_id: &str) -> Result<String> {
		let password = generate_temporary_password(self.config.temporary_password_length);
		self.directory.reset_password(user_id, &password).await?;
		tracing::info!(user_id, "temporary password reset");
		Ok(password)
	}

	/// Group names of one facet, from a fresh catalog.
	#[tracing::instrument(skip(self))]
	pub async fn facet_names(&self, facet: Facet) -> Result<Vec<String>> {
		let catalog = fetch_catalog(self.directory(), &self.config.facets).await?;
		Ok(catalog.names(facet))
	}
}
