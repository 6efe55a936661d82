// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	(
		"001_role_group_mapping",
		include_str!("../migrations/001_role_group_mapping.sql"),
	),
	(
		"002_paired_accounts",
		include_str!("../migrations/002_paired_accounts.sql"),
	),
];

/// Apply all migrations. Safe to run on every start.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for stmt in sql.split(';').filter(|s| !s.trim().is_empty()) {
			if let Err(e) = sqlx::query(stmt).execute(pool).await {
				let msg = e.to_string();
				if !msg.contains("already exists") {
					tracing::error!(migration = name, error = %e, "migration failed");
					return Err(e.into());
				}
			}
		}
		tracing::debug!(migration = name, "migration applied");
	}
	Ok(())
}
