// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::migrations::run_migrations;

/// Single-connection in-memory pool; every connection to `:memory:` would
/// otherwise see its own empty database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.create_if_missing(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool")
}

pub async fn create_migrated_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn insert_role_mapping(pool: &SqlitePool, role_key: &str, role_id: &str) {
	sqlx::query("INSERT INTO role_group_mapping (group_id, role_id) VALUES (?, ?)")
		.bind(role_key)
		.bind(role_id)
		.execute(pool)
		.await
		.unwrap();
}
