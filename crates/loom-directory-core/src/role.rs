// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Role-mapping key for a paired account: `<association>-<type>`, with the
/// `management` type folded into `staff`.
pub fn role_key(association: &str, user_type: &str) -> String {
	let user_type = match user_type {
		"management" => "staff",
		other => other,
	};
	format!("{association}-{user_type}")
}
