// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use loom_directory_client::testing::{DirectoryCall, InMemoryDirectory};
use loom_directory_client::DirectoryError;
use loom_directory_core::{Group, SecondaryOutcome, UserRecord};
use loom_server_db::testing::{create_migrated_test_pool, insert_role_mapping};
use loom_server_db::{PairedAccountRepository, PairedAccountStore};
use loom_server_provisioning::{
	PairedAccountProvisioner, ProvisioningConfig, ProvisioningError, UserProvisioningService,
};
use serde_json::{json, Value};

fn catalog_groups() -> Vec<Group> {
	vec![
		Group::new("g-hsm", "hsm"),
		Group::new("g-kisd", "kisd"),
		Group::new("g-staff", "staff"),
		Group::new("g-student", "student"),
		Group::new("g-mgmt", "management"),
		Group::new("g-a", "gpu-a"),
		Group::new("g-b", "gpu-b"),
		Group::new("g-c", "gpu-c"),
		Group::new("g-admins", "admins"),
	]
}

fn create_payload() -> Value {
	json!({
		"email": "ada@example.org",
		"username": "ada",
		"firstName": "Ada",
		"lastName": "Lovelace",
		"association": "hsm",
		"type": "management",
		"profiles": ["gpu-a", "gpu-b"],
	})
}

fn record(value: Value) -> UserRecord {
	value.as_object().cloned().unwrap()
}

struct Harness {
	directory: Arc<InMemoryDirectory>,
	store: Arc<PairedAccountRepository>,
	service: UserProvisioningService,
}

async fn harness() -> Harness {
	harness_with(ProvisioningConfig::default()).await
}

async fn harness_with(config: ProvisioningConfig) -> Harness {
	let directory = Arc::new(InMemoryDirectory::with_groups(catalog_groups()));
	let pool = create_migrated_test_pool().await;
	insert_role_mapping(&pool, "hsm-staff", "role-hsm-staff").await;
	let store = Arc::new(PairedAccountRepository::new(pool));
	let paired = PairedAccountProvisioner::new(store.clone(), "keycloak");
	let service = UserProvisioningService::new(directory.clone(), Some(paired), config);
	Harness {
		directory,
		store,
		service,
	}
}

fn seeded_user(h: &Harness, groups: &[&str]) -> String {
	let id = h.directory.insert_user(record(json!({
		"username": "grace",
		"email": "grace@example.org",
		"firstName": "Grace",
		"lastName": "Hopper",
		"enabled": true,
	})));
	h.directory.set_memberships(&id, groups);
	h.directory.clear_calls();
	id
}

#[tokio::test]
async fn create_assigns_one_association_and_one_type() {
	let h = harness().await;

	let user = h.service.provision_user(create_payload()).await.unwrap();

	assert_eq!(
		h.directory.membership_names(&user.user_id),
		vec!["hsm", "management", "gpu-a", "gpu-b"]
	);
	assert_eq!(user.association.as_deref(), Some("hsm"));
	assert_eq!(user.user_type.as_deref(), Some("management"));
	assert_eq!(user.profiles, vec!["gpu-a", "gpu-b"]);
	assert_eq!(user.temporary_password.len(), 6);
	assert_eq!(user.fields["enabled"], json!(true));
}

#[tokio::test]
async fn create_follows_the_workflow_order() {
	let h = harness().await;
	let user = h.service.provision_user(create_payload()).await.unwrap();

	let calls = h.directory.calls();
	assert_eq!(calls[0], DirectoryCall::ListGroups);
	assert!(matches!(calls[1], DirectoryCall::CreateUser(_)));
	assert!(calls[2..6].iter().all(DirectoryCall::is_membership_change));
	assert_eq!(
		calls[6],
		DirectoryCall::ResetPassword {
			user_id: user.user_id.clone(),
			password: user.temporary_password.clone(),
		}
	);
	assert_eq!(calls.len(), 7);
}

#[tokio::test]
async fn created_user_never_carries_facet_fields() {
	let h = harness().await;
	h.service.provision_user(create_payload()).await.unwrap();

	let DirectoryCall::CreateUser(sent) = &h.directory.calls()[1] else {
		panic!("expected create call");
	};
	for key in ["association", "type", "profiles", "skipSecondaryAccount", "id"] {
		assert!(!sent.contains_key(key), "{key} sent to directory");
	}
}

#[tokio::test]
async fn validation_failure_makes_no_directory_call() {
	let h = harness().await;
	let mut payload = create_payload();
	payload["email"] = json!("nope");
	payload.as_object_mut().unwrap().remove("username");

	let err = h.service.provision_user(payload).await.unwrap_err();

	let ProvisioningError::Validation(validation) = err else {
		panic!("expected validation error");
	};
	assert_eq!(validation.message(), "email_invalid,username_missing");
	assert!(h.directory.calls().is_empty());
}

#[tokio::test]
async fn unresolved_names_are_skipped_silently() {
	let h = harness().await;
	let mut payload = create_payload();
	payload["association"] = json!("ext");
	payload["profiles"] = json!(["gpu-a", "gpu-zzz"]);

	let user = h.service.provision_user(payload).await.unwrap();

	assert_eq!(
		h.directory.membership_names(&user.user_id),
		vec!["management", "gpu-a"]
	);
	assert!(user.association.is_none());
	assert!(matches!(user.secondary, SecondaryOutcome::Skipped { .. }));
}

#[tokio::test]
async fn failed_create_stops_everything() {
	let h = harness().await;
	h.directory
		.fail_when(|call| matches!(call, DirectoryCall::CreateUser(_)));

	let err = h.service.provision_user(create_payload()).await.unwrap_err();

	assert!(matches!(err, ProvisioningError::Directory(_)));
	assert_eq!(h.directory.calls().len(), 2);
}

#[tokio::test]
async fn membership_failure_leaves_user_partially_provisioned() {
	let h = harness().await;
	h.directory.fail_add_membership("g-mgmt");

	let err = h.service.provision_user(create_payload()).await.unwrap_err();

	let ProvisioningError::PartialFailure { user_id, batch, .. } = err else {
		panic!("expected partial failure");
	};
	assert!(h.directory.user(&user_id).is_some());
	assert_eq!(h.directory.membership_names(&user_id), vec!["hsm"]);
	assert_eq!(batch.applied().count(), 1);
	assert_eq!(batch.failed().count(), 1);
	assert!(!h
		.directory
		.calls()
		.iter()
		.any(|c| matches!(c, DirectoryCall::ResetPassword { .. })));
	assert!(h
		.store
		.get_account_by_external_identifier(&user_id)
		.await
		.unwrap()
		.is_none());
}

#[tokio::test]
async fn password_failure_keeps_memberships() {
	let h = harness().await;
	h.directory
		.fail_when(|call| matches!(call, DirectoryCall::ResetPassword { .. }));

	let err = h.service.provision_user(create_payload()).await.unwrap_err();

	let ProvisioningError::PartialFailure {
		user_id,
		batch,
		source,
	} = err
	else {
		panic!("expected partial failure");
	};
	assert_eq!(batch.applied().count(), 4);
	assert_eq!(h.directory.membership_names(&user_id).len(), 4);
	assert!(matches!(source, DirectoryError::Api { status: 500, .. }));
}

#[tokio::test]
async fn paired_account_attached_with_normalized_role() {
	let h = harness().await;

	let user = h.service.provision_user(create_payload()).await.unwrap();

	let account_id = user.secondary.account_id().unwrap();
	let stored = h
		.store
		.get_account_by_external_identifier(&user.user_id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(stored.id, account_id);
	assert_eq!(stored.role, "role-hsm-staff");
	assert_eq!(stored.email, "ada@example.org");
}

#[tokio::test]
async fn paired_account_can_be_suppressed() {
	let h = harness().await;
	let mut payload = create_payload();
	payload["skipSecondaryAccount"] = json!(true);

	let user = h.service.provision_user(payload).await.unwrap();

	assert!(matches!(user.secondary, SecondaryOutcome::Skipped { .. }));
	assert!(h
		.store
		.get_account_by_external_identifier(&user.user_id)
		.await
		.unwrap()
		.is_none());
}

#[tokio::test]
async fn missing_role_mapping_does_not_fail_the_request() {
	let h = harness().await;
	let mut payload = create_payload();
	payload["type"] = json!("student");

	let user = h.service.provision_user(payload).await.unwrap();

	assert!(user.secondary.account_id().is_none());
	assert_eq!(user.user_type.as_deref(), Some("student"));
}

#[tokio::test]
async fn password_length_is_configurable() {
	let h = harness_with(ProvisioningConfig {
		temporary_password_length: 12,
		..ProvisioningConfig::default()
	})
	.await;
	let id = seeded_user(&h, &[]);

	for _ in 0..3 {
		assert_eq!(h.service.reset_password(&id).await.unwrap().len(), 12);
	}
}

#[tokio::test]
async fn patch_with_current_profiles_changes_nothing() {
	let h = harness().await;
	let id = seeded_user(&h, &["g-hsm", "g-staff", "g-a", "g-b"]);

	h.service
		.update_user(&id, json!({"profiles": ["gpu-b", "gpu-a"]}))
		.await
		.unwrap();

	assert!(h.directory.membership_calls().is_empty());
}

#[tokio::test]
async fn patch_profiles_issues_minimal_delta() {
	let h = harness().await;
	let id = seeded_user(&h, &["g-a", "g-b"]);

	let updated = h
		.service
		.update_user(&id, json!({"profiles": ["gpu-b", "gpu-c"]}))
		.await
		.unwrap();

	assert_eq!(
		h.directory.membership_calls(),
		vec![
			DirectoryCall::AddMembership {
				user_id: id.clone(),
				group_id: "g-c".to_string(),
			},
			DirectoryCall::RemoveMembership {
				user_id: id.clone(),
				group_id: "g-a".to_string(),
			},
		]
	);
	assert_eq!(updated.user["profiles"], json!(["gpu-b", "gpu-c"]));
}

#[tokio::test]
async fn patch_association_removes_before_adding() {
	let h = harness().await;
	let id = seeded_user(&h, &["g-hsm", "g-staff"]);

	let updated = h
		.service
		.update_user(&id, json!({"association": "kisd"}))
		.await
		.unwrap();

	assert_eq!(
		h.directory.membership_calls(),
		vec![
			DirectoryCall::RemoveMembership {
				user_id: id.clone(),
				group_id: "g-hsm".to_string(),
			},
			DirectoryCall::AddMembership {
				user_id: id.clone(),
				group_id: "g-kisd".to_string(),
			},
		]
	);
	assert_eq!(updated.user["association"], json!("kisd"));
	assert_eq!(updated.user["type"], json!("staff"));
}

#[tokio::test]
async fn patch_passes_remaining_fields_through() {
	let h = harness().await;
	let id = seeded_user(&h, &["g-hsm"]);

	let updated = h
		.service
		.update_user(
			&id,
			json!({"firstName": "Amazing", "type": "student", "isAdmin": true}),
		)
		.await
		.unwrap();

	let update = h
		.directory
		.calls()
		.into_iter()
		.find_map(|call| match call {
			DirectoryCall::UpdateUser { fields, .. } => Some(fields),
			_ => None,
		})
		.unwrap();
	assert_eq!(update["firstName"], json!("Amazing"));
	assert!(!update.contains_key("type"));
	assert!(!update.contains_key("isAdmin"));
	assert_eq!(updated.user["firstName"], json!("Amazing"));
	assert_eq!(updated.user["type"], json!("student"));
}

#[tokio::test]
async fn patch_validation_failure_changes_nothing() {
	let h = harness().await;
	let id = seeded_user(&h, &["g-hsm"]);

	let err = h
		.service
		.update_user(&id, json!({"association": "mit", "profiles": ["cpu"]}))
		.await
		.unwrap_err();

	let ProvisioningError::Validation(validation) = err else {
		panic!("expected validation error");
	};
	assert_eq!(validation.codes(), ["association_invalid", "profiles_invalid"]);
	assert!(h.directory.calls().is_empty());
}

#[tokio::test]
async fn patch_unknown_user_is_not_found() {
	let h = harness().await;
	let err = h
		.service
		.update_user("missing", json!({"association": "kisd"}))
		.await
		.unwrap_err();
	assert!(err.is_not_found());
}

#[tokio::test]
async fn read_derives_type_without_association() {
	let h = harness().await;
	let id = seeded_user(&h, &["g-student", "g-c", "g-admins"]);

	let user = h.service.get_user(&id).await.unwrap();

	assert!(!user.contains_key("association"));
	assert_eq!(user["type"], json!("student"));
	assert_eq!(user["profiles"], json!(["gpu-c"]));
	assert_eq!(user["id"], json!(id));
}

#[tokio::test]
async fn list_projects_without_facets() {
	let h = harness().await;
	seeded_user(&h, &["g-hsm"]);

	let users = h.service.list_users(&[]).await.unwrap();

	assert_eq!(users.len(), 1);
	assert!(!users[0].contains_key("association"));
	assert!(!users[0].contains_key("profiles"));
}

#[tokio::test]
async fn facet_listing_uses_fresh_catalog() {
	let h = harness().await;
	let names = h
		.service
		.facet_names(loom_directory_core::Facet::Type)
		.await
		.unwrap();
	assert_eq!(names, vec!["staff", "student", "management"]);
	assert_eq!(h.directory.calls(), vec![DirectoryCall::ListGroups]);
}
