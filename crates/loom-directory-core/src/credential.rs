// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const DEFAULT_TEMPORARY_PASSWORD_LENGTH: usize = 6;

/// Random alphanumeric one-time password. The directory marks it temporary so
/// the user must replace it on first login.
pub fn generate_temporary_password(length: usize) -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(length)
		.map(char::from)
		.collect()
}
