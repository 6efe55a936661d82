// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound user representations.

use serde_json::Value;

use crate::catalog::{DerivedFacets, Group};
use crate::facet::FacetConfig;
use crate::schema::{descriptor, fields};
use crate::UserRecord;

/// Keep only declared, projectable fields. Used for list reads.
pub fn project_user(record: &UserRecord) -> UserRecord {
	record
		.iter()
		.filter(|(key, value)| {
			!value.is_null() && descriptor(key).is_some_and(|d| d.visibility.is_projected())
		})
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect()
}

/// Project a single user and replace its facet fields with ones derived from
/// live group memberships.
pub fn project_user_with_memberships(
	record: &UserRecord,
	memberships: &[Group],
	facets: &FacetConfig,
) -> UserRecord {
	let mut projected = project_user(record);
	let derived = DerivedFacets::from_memberships(memberships, facets);

	match derived.association {
		Some(group) => {
			projected.insert(fields::ASSOCIATION.to_string(), Value::String(group.name));
		}
		None => {
			projected.remove(fields::ASSOCIATION);
		}
	}
	match derived.user_type {
		Some(group) => {
			projected.insert(fields::TYPE.to_string(), Value::String(group.name));
		}
		None => {
			projected.remove(fields::TYPE);
		}
	}
	projected.insert(
		fields::PROFILES.to_string(),
		Value::Array(
			derived
				.profiles
				.into_iter()
				.map(|g| Value::String(g.name))
				.collect(),
		),
	);

	projected
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn raw_user() -> UserRecord {
		json!({
			"id": "u-1",
			"email": "ada@example.org",
			"username": "ada",
			"firstName": "Ada",
			"lastName": "Lovelace",
			"enabled": true,
			"authData": {"hash": "x"},
			"createdTimestamp": 1700000000,
			"skipSecondaryAccount": true,
			"association": "stale",
		})
		.as_object()
		.cloned()
		.unwrap()
	}

	#[test]
	fn list_projection_drops_hidden_fields_and_keeps_id() {
		let projected = project_user(&raw_user());
		assert_eq!(projected["id"], json!("u-1"));
		assert!(!projected.contains_key("authData"));
		assert!(!projected.contains_key("createdTimestamp"));
		assert!(!projected.contains_key("skipSecondaryAccount"));
	}

	#[test]
	fn single_projection_derives_facets() {
		let memberships = vec![
			Group::new("g1", "kisd"),
			Group::new("g2", "management"),
			Group::new("g3", "gpu-a100"),
			Group::new("g4", "admins"),
		];
		let projected =
			project_user_with_memberships(&raw_user(), &memberships, &FacetConfig::default());
		assert_eq!(projected["association"], json!("kisd"));
		assert_eq!(projected["type"], json!("management"));
		assert_eq!(projected["profiles"], json!(["gpu-a100"]));
	}

	#[test]
	fn type_is_derived_without_association() {
		let memberships = vec![Group::new("g2", "student")];
		let projected =
			project_user_with_memberships(&raw_user(), &memberships, &FacetConfig::default());
		assert!(!projected.contains_key("association"));
		assert_eq!(projected["type"], json!("student"));
		assert_eq!(projected["profiles"], json!([]));
	}
}
