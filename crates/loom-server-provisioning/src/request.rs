// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Split a normalized user payload into directory fields and facet requests.

use loom_directory_core::{fields, UserRecord};
use serde_json::Value;

/// Requested group facets, by group name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetRequest {
	pub association: Option<String>,
	pub user_type: Option<String>,
	/// `None` leaves profiles untouched; `Some(vec![])` removes them all.
	pub profiles: Option<Vec<String>>,
}

impl FacetRequest {
	fn take_from(record: &mut UserRecord) -> Self {
		let association = take_string(record, fields::ASSOCIATION);
		let user_type = take_string(record, fields::TYPE);
		let profiles = record.remove(fields::PROFILES).and_then(|value| match value {
			Value::Array(items) => Some(
				items
					.into_iter()
					.filter_map(|item| match item {
						Value::String(name) => Some(name),
						_ => None,
					})
					.collect(),
			),
			_ => None,
		});

		Self {
			association,
			user_type,
			profiles,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.association.is_none() && self.user_type.is_none() && self.profiles.is_none()
	}
}

fn take_string(record: &mut UserRecord, key: &str) -> Option<String> {
	match record.remove(key) {
		Some(Value::String(s)) => Some(s),
		_ => None,
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
	/// Fields sent to the directory's create call.
	pub fields: UserRecord,
	pub facets: FacetRequest,
	pub skip_secondary_account: bool,
}

impl CreateRequest {
	/// Build from a payload already validated in create mode. New users are
	/// always created enabled.
	pub fn from_normalized(mut record: UserRecord) -> Self {
		let facets = FacetRequest::take_from(&mut record);
		let skip_secondary_account = matches!(
			record.remove(fields::SKIP_SECONDARY_ACCOUNT),
			Some(Value::Bool(true))
		);
		record.insert(fields::ENABLED.to_string(), Value::Bool(true));

		Self {
			fields: record,
			facets,
			skip_secondary_account,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
	/// Non-facet fields passed through to the directory's update call.
	pub fields: UserRecord,
	pub facets: FacetRequest,
}

impl UpdateRequest {
	/// Build from a payload already validated in update mode.
	pub fn from_normalized(mut record: UserRecord) -> Self {
		let facets = FacetRequest::take_from(&mut record);
		record.remove(fields::SKIP_SECONDARY_ACCOUNT);
		Self {
			fields: record,
			facets,
		}
	}
}
