// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Best-effort creation of the paired secondary account.

use std::sync::Arc;

use loom_directory_core::{fields, role_key, SecondaryOutcome, UserRecord};
use loom_server_db::{NewPairedAccount, PairedAccountStore};

#[derive(Clone)]
pub struct PairedAccountProvisioner {
	store: Arc<dyn PairedAccountStore>,
	provider: String,
}

impl PairedAccountProvisioner {
	pub fn new(store: Arc<dyn PairedAccountStore>, provider: impl Into<String>) -> Self {
		Self {
			store,
			provider: provider.into(),
		}
	}

	/// Create the paired account for a freshly created directory user.
	///
	/// Never returns an error: every failure is logged and reported as
	/// [`SecondaryOutcome::Failed`] or [`SecondaryOutcome::Skipped`].
	#[tracing::instrument(skip(self, user))]
	pub async fn provision(
		&self,
		user_id: &str,
		user: &UserRecord,
		association: Option<&str>,
		user_type: Option<&str>,
	) -> SecondaryOutcome {
		let (Some(association), Some(user_type)) = (association, user_type) else {
			tracing::debug!("association or type unresolved, no paired account");
			return SecondaryOutcome::skipped("association or type not assigned");
		};
		let key = role_key(association, user_type);

		match self.store.get_account_by_external_identifier(user_id).await {
			Ok(Some(existing)) => {
				tracing::debug!(paired_account_id = %existing.id, "paired account already exists");
				return SecondaryOutcome::skipped("paired account already exists");
			}
			Ok(None) => {}
			Err(e) => return failed("lookup of existing paired account failed", e),
		}

		let role = match self.store.get_role_id_by_key(&key).await {
			Ok(Some(role)) => role,
			Ok(None) => {
				tracing::warn!(role_key = %key, "no role mapped, paired account not created");
				return SecondaryOutcome::skipped(format!("no role mapped for {key}"));
			}
			Err(e) => return failed("role lookup failed", e),
		};

		let account = NewPairedAccount {
			provider: self.provider.clone(),
			first_name: string_field(user, fields::FIRST_NAME),
			last_name: string_field(user, fields::LAST_NAME),
			email: string_field(user, fields::EMAIL),
			external_identifier: user_id.to_string(),
			role,
		};

		match self.store.create_account(&account).await {
			Ok(created) => {
				tracing::info!(
					paired_account_id = %created.id,
					role_key = %key,
					"paired account created"
				);
				SecondaryOutcome::Attached {
					account_id: created.id,
				}
			}
			Err(e) => failed("paired account creation failed", e),
		}
	}
}

fn failed(what: &str, e: loom_server_db::DbError) -> SecondaryOutcome {
	tracing::warn!(error = %e, "{what}");
	SecondaryOutcome::Failed {
		reason: format!("{what}: {e}"),
	}
}

fn string_field(user: &UserRecord, key: &str) -> String {
	user
		.get(key)
		.and_then(|v| v.as_str())
		.unwrap_or_default()
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use loom_server_db::testing::{create_migrated_test_pool, insert_role_mapping};
	use loom_server_db::{DbError, PairedAccount, PairedAccountRepository};
	use serde_json::json;

	fn user() -> UserRecord {
		json!({
			"email": "ada@example.org",
			"firstName": "Ada",
			"lastName": "Lovelace",
		})
		.as_object()
		.cloned()
		.unwrap()
	}

	async fn provisioner() -> (PairedAccountProvisioner, Arc<PairedAccountRepository>) {
		let pool = create_migrated_test_pool().await;
		insert_role_mapping(&pool, "hsm-staff", "role-7").await;
		let repo = Arc::new(PairedAccountRepository::new(pool));
		(PairedAccountProvisioner::new(repo.clone(), "keycloak"), repo)
	}

	#[tokio::test]
	async fn management_uses_staff_role() {
		let (provisioner, repo) = provisioner().await;

		let outcome = provisioner
			.provision("user-1", &user(), Some("hsm"), Some("management"))
			.await;

		let account_id = outcome.account_id().unwrap().to_string();
		let stored = repo
			.get_account_by_external_identifier("user-1")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.id, account_id);
		assert_eq!(stored.role, "role-7");
		assert_eq!(stored.first_name, "Ada");
		assert_eq!(stored.provider, "keycloak");
	}

	#[tokio::test]
	async fn missing_role_mapping_is_skipped() {
		let (provisioner, repo) = provisioner().await;

		let outcome = provisioner
			.provision("user-1", &user(), Some("hsm"), Some("student"))
			.await;

		assert!(matches!(outcome, SecondaryOutcome::Skipped { .. }));
		assert!(repo
			.get_account_by_external_identifier("user-1")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn created_at_most_once() {
		let (provisioner, _repo) = provisioner().await;

		let first = provisioner
			.provision("user-1", &user(), Some("hsm"), Some("staff"))
			.await;
		let second = provisioner
			.provision("user-1", &user(), Some("hsm"), Some("staff"))
			.await;

		assert!(first.account_id().is_some());
		assert!(matches!(second, SecondaryOutcome::Skipped { .. }));
	}

	#[tokio::test]
	async fn unresolved_facets_are_skipped() {
		let (provisioner, _repo) = provisioner().await;
		let outcome = provisioner.provision("user-1", &user(), None, Some("staff")).await;
		assert!(matches!(outcome, SecondaryOutcome::Skipped { .. }));
	}

	struct BrokenStore;

	#[async_trait]
	impl PairedAccountStore for BrokenStore {
		async fn get_role_id_by_key(&self, _role_key: &str) -> Result<Option<String>, DbError> {
			Ok(Some("role-1".to_string()))
		}

		async fn get_account_by_external_identifier(
			&self,
			_external_identifier: &str,
		) -> Result<Option<PairedAccount>, DbError> {
			Ok(None)
		}

		async fn create_account(
			&self,
			_account: &NewPairedAccount,
		) -> Result<PairedAccount, DbError> {
			Err(DbError::Internal("disk full".to_string()))
		}
	}

	#[tokio::test]
	async fn store_errors_are_contained() {
		let provisioner = PairedAccountProvisioner::new(Arc::new(BrokenStore), "keycloak");
		let outcome = provisioner
			.provision("user-1", &user(), Some("hsm"), Some("staff"))
			.await;
		match outcome {
			SecondaryOutcome::Failed { reason } => assert!(reason.contains("disk full")),
			other => panic!("unexpected outcome: {other:?}"),
		}
	}
}
