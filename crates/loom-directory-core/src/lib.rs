// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory user model for Loom.
//!
//! Everything here is pure: no I/O, no async. The provisioning service and
//! the HTTP handlers build on these pieces:
//!
//! - [`schema`] / [`validate`]: the declarative user field table and the
//!   routine that interprets it
//! - [`facet`] / [`catalog`]: classification of directory groups into
//!   association, type and profile facets
//! - [`projection`]: outbound user representations
//! - [`role`]: role keys for paired secondary accounts
//! - [`outcome`]: batch and secondary-step results

pub mod catalog;
pub mod credential;
pub mod error;
pub mod facet;
pub mod outcome;
pub mod projection;
pub mod role;
pub mod schema;
pub mod validate;

pub use catalog::{DerivedFacets, Group, GroupCatalog};
pub use credential::{generate_temporary_password, DEFAULT_TEMPORARY_PASSWORD_LENGTH};
pub use error::{FacetConfigError, ValidationError};
pub use facet::{Facet, FacetConfig};
pub use outcome::{ChangeResult, ChangeStatus, MembershipBatch, MembershipChange, MembershipOp, SecondaryOutcome};
pub use projection::{project_user, project_user_with_memberships};
pub use role::role_key;
pub use schema::{fields, FieldDescriptor, Rule, Visibility, USER_SCHEMA};
pub use validate::{validate_user, Mode};

/// A directory user as a JSON object, keyed by the directory's field names.
pub type UserRecord = serde_json::Map<String, serde_json::Value>;
