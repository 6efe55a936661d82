// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Paired accounts and the role mapping they are keyed by.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedAccount {
	pub id: String,
	pub provider: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub external_identifier: String,
	pub role: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPairedAccount {
	pub provider: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub external_identifier: String,
	pub role: String,
}

#[async_trait]
pub trait PairedAccountStore: Send + Sync {
	async fn get_role_id_by_key(&self, role_key: &str) -> Result<Option<String>, DbError>;
	async fn get_account_by_external_identifier(
		&self,
		external_identifier: &str,
	) -> Result<Option<PairedAccount>, DbError>;
	async fn create_account(&self, account: &NewPairedAccount) -> Result<PairedAccount, DbError>;
}

#[async_trait]
impl PairedAccountStore for PairedAccountRepository {
	async fn get_role_id_by_key(&self, role_key: &str) -> Result<Option<String>, DbError> {
		self.get_role_id_by_key(role_key).await
	}

	async fn get_account_by_external_identifier(
		&self,
		external_identifier: &str,
	) -> Result<Option<PairedAccount>, DbError> {
		self
			.get_account_by_external_identifier(external_identifier)
			.await
	}

	async fn create_account(&self, account: &NewPairedAccount) -> Result<PairedAccount, DbError> {
		self.create_account(account).await
	}
}

#[derive(Clone)]
pub struct PairedAccountRepository {
	pool: SqlitePool,
}

impl PairedAccountRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Role identifier for a `<association>-<type>` key.
	#[tracing::instrument(skip(self))]
	pub async fn get_role_id_by_key(&self, role_key: &str) -> Result<Option<String>, DbError> {
		let row = sqlx::query("SELECT role_id FROM role_group_mapping WHERE group_id = ?")
			.bind(role_key)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|row| row.get("role_id")))
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_account_by_external_identifier(
		&self,
		external_identifier: &str,
	) -> Result<Option<PairedAccount>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, provider, first_name, last_name, email, external_identifier, role, created_at
			FROM paired_accounts
			WHERE external_identifier = ?
			"#,
		)
		.bind(external_identifier)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(parse_paired_account_row(&row)?)),
			None => Ok(None),
		}
	}

	/// Insert a paired account. The unique external identifier turns a second
	/// insert for the same directory user into [`DbError::Conflict`].
	#[tracing::instrument(
		skip(self, account),
		fields(external_identifier = %account.external_identifier, role = %account.role)
	)]
	pub async fn create_account(&self, account: &NewPairedAccount) -> Result<PairedAccount, DbError> {
		let id = Uuid::new_v4().to_string();
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			INSERT INTO paired_accounts (
				id, provider, first_name, last_name, email, external_identifier, role, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&id)
		.bind(&account.provider)
		.bind(&account.first_name)
		.bind(&account.last_name)
		.bind(&account.email)
		.bind(&account.external_identifier)
		.bind(&account.role)
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await;

		if let Err(sqlx::Error::Database(db_err)) = &result {
			if db_err.is_unique_violation() {
				return Err(DbError::Conflict(format!(
					"paired account already exists for {}",
					account.external_identifier
				)));
			}
		}
		result?;

		tracing::debug!(paired_account_id = %id, "paired account created");
		Ok(PairedAccount {
			id,
			provider: account.provider.clone(),
			first_name: account.first_name.clone(),
			last_name: account.last_name.clone(),
			email: account.email.clone(),
			external_identifier: account.external_identifier.clone(),
			role: account.role.clone(),
			created_at: now,
		})
	}
}

fn parse_paired_account_row(row: &sqlx::sqlite::SqliteRow) -> Result<PairedAccount, DbError> {
	let created_at: String = row.get("created_at");
	let created_at = DateTime::parse_from_rfc3339(&created_at)
		.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
		.with_timezone(&Utc);

	Ok(PairedAccount {
		id: row.get("id"),
		provider: row.get("provider"),
		first_name: row.get("first_name"),
		last_name: row.get("last_name"),
		email: row.get("email"),
		external_identifier: row.get("external_identifier"),
		role: row.get("role"),
		created_at,
	})
}
