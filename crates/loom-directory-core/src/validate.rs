// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::Value;

use crate::error::ValidationError;
use crate::facet::FacetConfig;
use crate::schema::USER_SCHEMA;
use crate::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	Create,
	Update,
}

fn is_present(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::String(s) => !s.is_empty(),
		_ => true,
	}
}

/// Validate and normalize an inbound user payload against [`USER_SCHEMA`].
///
/// Undeclared, protected and internal fields are dropped. Every violation is
/// collected before failing.
pub fn validate_user(
	input: Value,
	mode: Mode,
	facets: &FacetConfig,
) -> Result<UserRecord, ValidationError> {
	let Value::Object(mut input) = input else {
		return Err(ValidationError::no_data());
	};

	let mut normalized = UserRecord::new();
	let mut codes = Vec::new();

	for field in USER_SCHEMA {
		if !field.visibility.accepts_input() {
			continue;
		}

		let value = input.remove(field.name).filter(is_present);
		let Some(value) = value else {
			if let Some(default) = field.default {
				normalized.insert(field.name.to_string(), default.to_value());
			} else if field.required && mode == Mode::Create {
				codes.push(field.missing_code());
			}
			continue;
		};

		match field.rule {
			Some(rule) if !rule.check(&value, facets) => codes.push(field.invalid_code()),
			_ => {
				normalized.insert(field.name.to_string(), value);
			}
		}
	}

	if codes.is_empty() {
		Ok(normalized)
	} else {
		Err(ValidationError::new(codes))
	}
}
