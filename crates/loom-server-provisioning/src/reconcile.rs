// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Membership reconciliation: plan the minimal add/remove set, then apply it
//! one call at a time.

use std::collections::HashSet;

use loom_directory_client::DirectoryClient;
use loom_directory_core::{
	Facet, Group, GroupCatalog, MembershipBatch, MembershipChange, MembershipOp,
};

use crate::error::ProvisioningError;
use crate::request::FacetRequest;

/// Plan the membership changes that take `current` to `request`.
///
/// Changes are ordered association, type, profile adds, profile removes.
/// Within an exclusive facet the old membership is removed before the new one
/// is added. Requested names missing from the catalog are skipped. With an
/// empty `current` this is the initial assignment of a new user.
pub fn plan_facet_changes(
	catalog: &GroupCatalog,
	current: &[Group],
	request: &FacetRequest,
) -> Vec<MembershipChange> {
	let mut plan = Vec::new();

	if let Some(name) = &request.association {
		plan_exclusive(Facet::Association, name, catalog, current, &mut plan);
	}
	if let Some(name) = &request.user_type {
		plan_exclusive(Facet::Type, name, catalog, current, &mut plan);
	}
	if let Some(names) = &request.profiles {
		plan_profiles(names, catalog, current, &mut plan);
	}

	plan
}

fn held_in<'a>(facet: Facet, catalog: &GroupCatalog, current: &'a [Group]) -> Vec<&'a Group> {
	current
		.iter()
		.filter(|group| catalog.classify(group) == facet)
		.collect()
}

fn plan_exclusive(
	facet: Facet,
	requested: &str,
	catalog: &GroupCatalog,
	current: &[Group],
	plan: &mut Vec<MembershipChange>,
) {
	let held = held_in(facet, catalog, current);
	let already_held = held.iter().any(|group| group.name == requested);

	for group in held.into_iter().filter(|group| group.name != requested) {
		plan.push(MembershipChange::remove(facet, group.clone()));
	}
	if already_held {
		return;
	}

	match catalog.find_in(facet, requested) {
		Some(group) => plan.push(MembershipChange::add(facet, group.clone())),
		None => tracing::debug!(%facet, group = requested, "requested group not in catalog, skipping"),
	}
}

fn plan_profiles(
	requested: &[String],
	catalog: &GroupCatalog,
	current: &[Group],
	plan: &mut Vec<MembershipChange>,
) {
	let held = held_in(Facet::Profile, catalog, current);
	let mut seen = HashSet::new();

	for name in requested {
		if !seen.insert(name.as_str()) || held.iter().any(|group| &group.name == name) {
			continue;
		}
		match catalog.find_in(Facet::Profile, name) {
			Some(group) => plan.push(MembershipChange::add(Facet::Profile, group.clone())),
			None => tracing::debug!(group = %name, "requested profile not in catalog, skipping"),
		}
	}

	for group in held {
		if !seen.contains(group.name.as_str()) {
			plan.push(MembershipChange::remove(Facet::Profile, group.clone()));
		}
	}
}

/// Apply a plan sequentially, stopping at the first failure. Changes applied
/// before the failure stay applied.
pub async fn apply_plan(
	directory: &dyn DirectoryClient,
	user_id: &str,
	plan: Vec<MembershipChange>,
) -> Result<MembershipBatch, ProvisioningError> {
	let mut batch = MembershipBatch::new();

	for change in plan {
		let result = match change.op {
			MembershipOp::Add => directory.add_membership(user_id, &change.group.id).await,
			MembershipOp::Remove => {
				directory
					.remove_membership(user_id, &change.group.id)
					.await
			}
		};

		match result {
			Ok(()) => {
				tracing::info!(
					user_id,
					op = ?change.op,
					facet = %change.facet,
					group = %change.group.name,
					"membership changed"
				);
				batch.record_applied(change);
			}
			Err(e) => {
				tracing::warn!(
					user_id,
					op = ?change.op,
					facet = %change.facet,
					group = %change.group.name,
					error = %e,
					"membership change failed"
				);
				batch.record_failed(change, e.to_string());
				return Err(ProvisioningError::PartialFailure {
					user_id: user_id.to_string(),
					batch,
					source: e,
				});
			}
		}
	}

	Ok(batch)
}

#[cfg(test)]
mod tests {
	use super::*;
	use loom_directory_client::testing::{DirectoryCall, InMemoryDirectory};
	use loom_directory_core::FacetConfig;
	use proptest::prelude::*;
	use serde_json::json;

	fn groups() -> Vec<Group> {
		vec![
			Group::new("g-hsm", "hsm"),
			Group::new("g-kisd", "kisd"),
			Group::new("g-staff", "staff"),
			Group::new("g-student", "student"),
			Group::new("g-a", "gpu-a"),
			Group::new("g-b", "gpu-b"),
			Group::new("g-c", "gpu-c"),
			Group::new("g-admins", "admins"),
		]
	}

	fn catalog() -> GroupCatalog {
		GroupCatalog::new(groups(), &FacetConfig::default())
	}

	fn group(name: &str) -> Group {
		groups().into_iter().find(|g| g.name == name).unwrap()
	}

	fn profiles(names: &[&str]) -> FacetRequest {
		FacetRequest {
			profiles: Some(names.iter().map(|n| n.to_string()).collect()),
			..FacetRequest::default()
		}
	}

	#[test]
	fn profile_delta_is_minimal() {
		let current = vec![group("gpu-a"), group("gpu-b"), group("hsm")];
		let plan = plan_facet_changes(&catalog(), &current, &profiles(&["gpu-b", "gpu-c"]));

		assert_eq!(
			plan,
			vec![
				MembershipChange::add(Facet::Profile, group("gpu-c")),
				MembershipChange::remove(Facet::Profile, group("gpu-a")),
			]
		);
	}

	#[test]
	fn association_change_removes_before_adding() {
		let current = vec![group("hsm"), group("staff")];
		let request = FacetRequest {
			association: Some("kisd".to_string()),
			..FacetRequest::default()
		};
		let plan = plan_facet_changes(&catalog(), &current, &request);

		assert_eq!(
			plan,
			vec![
				MembershipChange::remove(Facet::Association, group("hsm")),
				MembershipChange::add(Facet::Association, group("kisd")),
			]
		);
	}

	#[test]
	fn same_exclusive_value_is_a_no_op() {
		let current = vec![group("hsm"), group("staff")];
		let request = FacetRequest {
			association: Some("hsm".to_string()),
			user_type: Some("staff".to_string()),
			profiles: None,
		};
		assert!(plan_facet_changes(&catalog(), &current, &request).is_empty());
	}

	#[test]
	fn unresolved_exclusive_value_still_removes_current() {
		let current = vec![group("hsm")];
		let request = FacetRequest {
			association: Some("ext".to_string()),
			..FacetRequest::default()
		};
		let plan = plan_facet_changes(&catalog(), &current, &request);
		assert_eq!(
			plan,
			vec![MembershipChange::remove(Facet::Association, group("hsm"))]
		);
	}

	#[test]
	fn initial_assignment_orders_facets() {
		let request = FacetRequest {
			association: Some("kisd".to_string()),
			user_type: Some("student".to_string()),
			profiles: Some(vec!["gpu-a".to_string(), "gpu-missing".to_string()]),
		};
		let plan = plan_facet_changes(&catalog(), &[], &request);
		let names: Vec<&str> = plan.iter().map(|c| c.group.name.as_str()).collect();
		assert_eq!(names, vec!["kisd", "student", "gpu-a"]);
		assert!(plan.iter().all(|c| c.op == MembershipOp::Add));
	}

	#[test]
	fn unclassified_memberships_are_never_touched() {
		let current = vec![group("admins"), group("gpu-a")];
		let plan = plan_facet_changes(&catalog(), &current, &profiles(&[]));
		assert_eq!(
			plan,
			vec![MembershipChange::remove(Facet::Profile, group("gpu-a"))]
		);
	}

	#[tokio::test]
	async fn apply_stops_at_first_failure() {
		let directory = InMemoryDirectory::with_groups(groups());
		let user_id = directory.insert_user(json!({"username": "ada"}).as_object().cloned().unwrap());
		directory.fail_add_membership("g-student");

		let plan = plan_facet_changes(
			&catalog(),
			&[],
			&FacetRequest {
				association: Some("hsm".to_string()),
				user_type: Some("student".to_string()),
				profiles: Some(vec!["gpu-a".to_string()]),
			},
		);
		let err = apply_plan(&directory, &user_id, plan).await.unwrap_err();

		let ProvisioningError::PartialFailure { batch, .. } = err else {
			panic!("expected partial failure");
		};
		assert_eq!(batch.len(), 2);
		assert_eq!(batch.applied().count(), 1);
		assert_eq!(directory.membership_names(&user_id), vec!["hsm"]);
		assert!(!directory
			.calls()
			.contains(&DirectoryCall::AddMembership {
				user_id: user_id.clone(),
				group_id: "g-a".to_string(),
			}));
	}

	fn profile_names() -> impl Strategy<Value = Vec<String>> {
		prop::collection::vec(prop::sample::select(vec!["gpu-a", "gpu-b", "gpu-c"]), 0..4)
			.prop_map(|names| names.into_iter().map(String::from).collect())
	}

	proptest! {
		/// Requesting the profiles a user already holds changes nothing.
		#[test]
		fn current_profiles_plan_is_empty(names in profile_names()) {
			let mut current: Vec<Group> = Vec::new();
			for name in &names {
				if !current.iter().any(|g| &g.name == name) {
					current.push(group(name));
				}
			}
			let plan = plan_facet_changes(&catalog(), &current, &FacetRequest {
				profiles: Some(names),
				..FacetRequest::default()
			});
			prop_assert!(plan.is_empty());
		}

		/// Applying a profile plan leaves exactly the requested profiles.
		#[test]
		fn profile_plan_reaches_requested_set(held in profile_names(), wanted in profile_names()) {
			let mut current: Vec<Group> = Vec::new();
			for name in &held {
				if !current.iter().any(|g| &g.name == name) {
					current.push(group(name));
				}
			}
			let plan = plan_facet_changes(&catalog(), &current, &FacetRequest {
				profiles: Some(wanted.clone()),
				..FacetRequest::default()
			});

			let mut result: HashSet<String> = current.iter().map(|g| g.name.clone()).collect();
			for change in &plan {
				match change.op {
					MembershipOp::Add => prop_assert!(result.insert(change.group.name.clone())),
					MembershipOp::Remove => prop_assert!(result.remove(&change.group.name)),
				}
			}
			let expected: HashSet<String> = wanted.into_iter().collect();
			prop_assert_eq!(result, expected);
		}
	}
}
