// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process directory double that records every call in order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use loom_directory_core::{Group, UserRecord};
use serde_json::Value;

use crate::client::DirectoryClient;
use crate::error::DirectoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
	ListUsers(Vec<(String, String)>),
	GetUser(String),
	CreateUser(UserRecord),
	UpdateUser { user_id: String, fields: UserRecord },
	ListGroups,
	ListUserGroups(String),
	AddMembership { user_id: String, group_id: String },
	RemoveMembership { user_id: String, group_id: String },
	ResetPassword { user_id: String, password: String },
}

impl DirectoryCall {
	pub fn is_membership_change(&self) -> bool {
		matches!(
			self,
			DirectoryCall::AddMembership { .. } | DirectoryCall::RemoveMembership { .. }
		)
	}
}

type FailurePredicate = Box<dyn Fn(&DirectoryCall) -> bool + Send + Sync>;

#[derive(Default)]
struct State {
	users: BTreeMap<String, UserRecord>,
	groups: Vec<Group>,
	memberships: HashMap<String, Vec<String>>,
	calls: Vec<DirectoryCall>,
	failures: Vec<FailurePredicate>,
	next_id: u64,
}

#[derive(Default)]
pub struct InMemoryDirectory {
	state: Mutex<State>,
}

impl InMemoryDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_groups(groups: Vec<Group>) -> Self {
		let directory = Self::new();
		directory.lock().groups = groups;
		directory
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Seed a user, returning its id. An `id` field in the record is honoured.
	pub fn insert_user(&self, mut record: UserRecord) -> String {
		let mut state = self.lock();
		let id = match record.get("id").and_then(Value::as_str) {
			Some(id) => id.to_string(),
			None => {
				state.next_id += 1;
				format!("user-{}", state.next_id)
			}
		};
		record.insert("id".to_string(), Value::String(id.clone()));
		state.users.insert(id.clone(), record);
		id
	}

	pub fn set_memberships(&self, user_id: &str, group_ids: &[&str]) {
		self.lock().memberships.insert(
			user_id.to_string(),
			group_ids.iter().map(|g| g.to_string()).collect(),
		);
	}

	pub fn user(&self, user_id: &str) -> Option<UserRecord> {
		self.lock().users.get(user_id).cloned()
	}

	pub fn memberships(&self, user_id: &str) -> Vec<Group> {
		let state = self.lock();
		resolve_memberships(&state, user_id)
	}

	pub fn membership_names(&self, user_id: &str) -> Vec<String> {
		self
			.memberships(user_id)
			.into_iter()
			.map(|g| g.name)
			.collect()
	}

	pub fn calls(&self) -> Vec<DirectoryCall> {
		self.lock().calls.clone()
	}

	pub fn membership_calls(&self) -> Vec<DirectoryCall> {
		self
			.calls()
			.into_iter()
			.filter(DirectoryCall::is_membership_change)
			.collect()
	}

	pub fn clear_calls(&self) {
		self.lock().calls.clear();
	}

	/// Fail every call matching `predicate` with a 500 after recording it.
	pub fn fail_when<F>(&self, predicate: F)
	where
		F: Fn(&DirectoryCall) -> bool + Send + Sync + 'static,
	{
		self.lock().failures.push(Box::new(predicate));
	}

	pub fn fail_add_membership(&self, group_id: &str) {
		let group_id = group_id.to_string();
		self.fail_when(move |call| {
			matches!(call, DirectoryCall::AddMembership { group_id: g, .. } if *g == group_id)
		});
	}

	fn record(&self, call: DirectoryCall) -> Result<std::sync::MutexGuard<'_, State>, DirectoryError> {
		let mut state = self.lock();
		let fails = state.failures.iter().any(|predicate| predicate(&call));
		state.calls.push(call);
		if fails {
			return Err(DirectoryError::Api {
				status: 500,
				message: "injected failure".to_string(),
			});
		}
		Ok(state)
	}
}

fn resolve_memberships(state: &State, user_id: &str) -> Vec<Group> {
	state
		.memberships
		.get(user_id)
		.map(|ids| {
			ids
				.iter()
				.filter_map(|id| state.groups.iter().find(|g| &g.id == id).cloned())
				.collect()
		})
		.unwrap_or_default()
}

fn matches_query(record: &UserRecord, query: &[(String, String)]) -> bool {
	query.iter().all(|(key, expected)| match record.get(key) {
		Some(Value::String(actual)) => actual == expected,
		Some(other) => other.to_string() == *expected,
		None => true,
	})
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
	async fn list_users(
		&self,
		query: &[(String, String)],
	) -> Result<Vec<UserRecord>, DirectoryError> {
		let state = self.record(DirectoryCall::ListUsers(query.to_vec()))?;
		Ok(state
			.users
			.values()
			.filter(|user| matches_query(user, query))
			.cloned()
			.collect())
	}

	async fn get_user(&self, user_id: &str) -> Result<UserRecord, DirectoryError> {
		let state = self.record(DirectoryCall::GetUser(user_id.to_string()))?;
		state.users.get(user_id).cloned().ok_or(DirectoryError::NotFound)
	}

	async fn create_user(&self, user: &UserRecord) -> Result<String, DirectoryError> {
		let mut state = self.record(DirectoryCall::CreateUser(user.clone()))?;
		state.next_id += 1;
		let id = format!("user-{}", state.next_id);
		let mut record = user.clone();
		record.insert("id".to_string(), Value::String(id.clone()));
		state.users.insert(id.clone(), record);
		Ok(id)
	}

	async fn update_user(&self, user_id: &str, fields: &UserRecord) -> Result<(), DirectoryError> {
		let mut state = self.record(DirectoryCall::UpdateUser {
			user_id: user_id.to_string(),
			fields: fields.clone(),
		})?;
		let user = state.users.get_mut(user_id).ok_or(DirectoryError::NotFound)?;
		for (key, value) in fields {
			user.insert(key.clone(), value.clone());
		}
		Ok(())
	}

	async fn list_groups(&self) -> Result<Vec<Group>, DirectoryError> {
		let state = self.record(DirectoryCall::ListGroups)?;
		Ok(state.groups.clone())
	}

	async fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>, DirectoryError> {
		let state = self.record(DirectoryCall::ListUserGroups(user_id.to_string()))?;
		if !state.users.contains_key(user_id) {
			return Err(DirectoryError::NotFound);
		}
		Ok(resolve_memberships(&state, user_id))
	}

	async fn add_membership(&self, user_id: &str, group_id: &str) -> Result<(), DirectoryError> {
		let mut state = self.record(DirectoryCall::AddMembership {
			user_id: user_id.to_string(),
			group_id: group_id.to_string(),
		})?;
		if !state.users.contains_key(user_id) || !state.groups.iter().any(|g| g.id == group_id) {
			return Err(DirectoryError::NotFound);
		}
		let memberships = state.memberships.entry(user_id.to_string()).or_default();
		if !memberships.iter().any(|g| g == group_id) {
			memberships.push(group_id.to_string());
		}
		Ok(())
	}

	async fn remove_membership(
		&self,
		user_id: &str,
		group_id: &str,
	) -> Result<(), DirectoryError> {
		let mut state = self.record(DirectoryCall::RemoveMembership {
			user_id: user_id.to_string(),
			group_id: group_id.to_string(),
		})?;
		if !state.users.contains_key(user_id) {
			return Err(DirectoryError::NotFound);
		}
		if let Some(memberships) = state.memberships.get_mut(user_id) {
			memberships.retain(|g| g != group_id);
		}
		Ok(())
	}

	async fn reset_password(&self, user_id: &str, password: &str) -> Result<(), DirectoryError> {
		let state = self.record(DirectoryCall::ResetPassword {
			user_id: user_id.to_string(),
			password: password.to_string(),
		})?;
		if !state.users.contains_key(user_id) {
			return Err(DirectoryError::NotFound);
		}
		Ok(())
	}
}
