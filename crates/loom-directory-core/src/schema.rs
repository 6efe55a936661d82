// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative user field table.
//!
//! [`USER_SCHEMA`] is plain data; [`crate::validate::validate_user`] and the
//! projection functions interpret it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::facet::FacetConfig;

/// Field names as they appear on the wire.
pub mod fields {
	pub const ID: &str = "id";
	pub const EMAIL: &str = "email";
	pub const USERNAME: &str = "username";
	pub const FIRST_NAME: &str = "firstName";
	pub const LAST_NAME: &str = "lastName";
	pub const ASSOCIATION: &str = "association";
	pub const TYPE: &str = "type";
	pub const ENABLED: &str = "enabled";
	pub const PROFILES: &str = "profiles";
	pub const SKIP_SECONDARY_ACCOUNT: &str = "skipSecondaryAccount";
	pub const AUTH_DATA: &str = "authData";
}

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
	)
	.unwrap()
});

static PERSON_NAME_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\p{L}+(?:[- ]\p{L}+)*$").unwrap());

/// Who may see or write a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	/// Accepted inbound and projected outbound.
	Public,
	/// Never accepted inbound; projected outbound.
	Protected,
	/// Accepted inbound for the workflow's own use; never forwarded or projected.
	RequestOnly,
	/// Never accepted inbound and never projected.
	Internal,
}

impl Visibility {
	pub fn accepts_input(self) -> bool {
		matches!(self, Visibility::Public | Visibility::RequestOnly)
	}

	pub fn is_projected(self) -> bool {
		matches!(self, Visibility::Public | Visibility::Protected)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
	Email,
	Alphanumeric,
	PersonName,
	Association,
	Type,
	Boolean,
	ProfileList,
}

impl Rule {
	pub fn check(self, value: &Value, facets: &FacetConfig) -> bool {
		match self {
			Rule::Email => value.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s)),
			Rule::Alphanumeric => value
				.as_str()
				.is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())),
			Rule::PersonName => value
				.as_str()
				.is_some_and(|s| PERSON_NAME_REGEX.is_match(s)),
			Rule::Association => value.as_str().is_some_and(|s| facets.is_association(s)),
			Rule::Type => value.as_str().is_some_and(|s| facets.is_type(s)),
			Rule::Boolean => value.is_boolean(),
			Rule::ProfileList => value.as_array().is_some_and(|items| {
				items
					.iter()
					.all(|item| item.as_str().is_some_and(|s| facets.is_profile(s)))
			}),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
	Bool(bool),
}

impl FieldDefault {
	pub fn to_value(self) -> Value {
		match self {
			FieldDefault::Bool(b) => Value::Bool(b),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
	pub name: &'static str,
	pub required: bool,
	pub rule: Option<Rule>,
	pub default: Option<FieldDefault>,
	pub visibility: Visibility,
}

impl FieldDescriptor {
	const fn public(name: &'static str, required: bool, rule: Rule) -> Self {
		Self {
			name,
			required,
			rule: Some(rule),
			default: None,
			visibility: Visibility::Public,
		}
	}

	pub fn missing_code(&self) -> String {
		format!("{}_missing", self.name)
	}

	pub fn invalid_code(&self) -> String {
		format!("{}_invalid", self.name)
	}
}

/// Ordered field table. Validation errors are reported in this order.
pub const USER_SCHEMA: &[FieldDescriptor] = &[
	FieldDescriptor {
		name: fields::ID,
		required: false,
		rule: None,
		default: None,
		visibility: Visibility::Protected,
	},
	FieldDescriptor::public(fields::EMAIL, true, Rule::Email),
	FieldDescriptor::public(fields::USERNAME, true, Rule::Alphanumeric),
	FieldDescriptor::public(fields::FIRST_NAME, true, Rule::PersonName),
	FieldDescriptor::public(fields::LAST_NAME, true, Rule::PersonName),
	FieldDescriptor::public(fields::ASSOCIATION, true, Rule::Association),
	FieldDescriptor::public(fields::TYPE, true, Rule::Type),
	FieldDescriptor {
		name: fields::ENABLED,
		required: false,
		rule: Some(Rule::Boolean),
		default: Some(FieldDefault::Bool(true)),
		visibility: Visibility::Public,
	},
	FieldDescriptor::public(fields::PROFILES, false, Rule::ProfileList),
	FieldDescriptor {
		name: fields::SKIP_SECONDARY_ACCOUNT,
		required: false,
		rule: Some(Rule::Boolean),
		default: None,
		visibility: Visibility::RequestOnly,
	},
	FieldDescriptor {
		name: fields::AUTH_DATA,
		required: false,
		rule: None,
		default: None,
		visibility: Visibility::Internal,
	},
];

pub fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
	USER_SCHEMA.iter().find(|d| d.name == name)
}
