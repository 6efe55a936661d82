// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Results of multi-call provisioning steps.
//!
//! Membership changes are independent remote calls with no rollback, so a
//! [`MembershipBatch`] records each one rather than a single pass/fail.

use serde::Serialize;

use crate::catalog::Group;
use crate::facet::Facet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipOp {
	Add,
	Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipChange {
	pub op: MembershipOp,
	pub facet: Facet,
	pub group: Group,
}

impl MembershipChange {
	pub fn add(facet: Facet, group: Group) -> Self {
		Self {
			op: MembershipOp::Add,
			facet,
			group,
		}
	}

	pub fn remove(facet: Facet, group: Group) -> Self {
		Self {
			op: MembershipOp::Remove,
			facet,
			group,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeStatus {
	Applied,
	Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeResult {
	pub change: MembershipChange,
	pub status: ChangeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipBatch {
	results: Vec<ChangeResult>,
}

impl MembershipBatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record_applied(&mut self, change: MembershipChange) {
		self.results.push(ChangeResult {
			change,
			status: ChangeStatus::Applied,
		});
	}

	pub fn record_failed(&mut self, change: MembershipChange, reason: impl Into<String>) {
		self.results.push(ChangeResult {
			change,
			status: ChangeStatus::Failed {
				reason: reason.into(),
			},
		});
	}

	pub fn results(&self) -> &[ChangeResult] {
		&self.results
	}

	pub fn applied(&self) -> impl Iterator<Item = &MembershipChange> {
		self
			.results
			.iter()
			.filter(|r| r.status == ChangeStatus::Applied)
			.map(|r| &r.change)
	}

	pub fn failed(&self) -> impl Iterator<Item = &ChangeResult> {
		self
			.results
			.iter()
			.filter(|r| matches!(r.status, ChangeStatus::Failed { .. }))
	}

	pub fn has_failures(&self) -> bool {
		self.failed().next().is_some()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}
}

/// What happened to the paired secondary account. Never fails the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SecondaryOutcome {
	Attached { account_id: String },
	Skipped { reason: String },
	Failed { reason: String },
}

impl SecondaryOutcome {
	pub fn skipped(reason: impl Into<String>) -> Self {
		SecondaryOutcome::Skipped {
			reason: reason.into(),
		}
	}

	pub fn account_id(&self) -> Option<&str> {
		match self {
			SecondaryOutcome::Attached { account_id } => Some(account_id),
			_ => None,
		}
	}
}
