// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory user provisioning for Loom.
//!
//! [`UserProvisioningService`] is the single code path for creating users,
//! reconciling their group facets on update, and resetting their temporary
//! password. Membership changes are independent directory calls with no
//! rollback; [`loom_directory_core::MembershipBatch`] records what was
//! applied when one fails.

mod catalog;
mod error;
mod paired;
mod reconcile;
mod request;
mod service;

pub use catalog::fetch_catalog;
pub use error::ProvisioningError;
pub use paired::PairedAccountProvisioner;
pub use reconcile::{apply_plan, plan_facet_changes};
pub use request::{CreateRequest, FacetRequest, UpdateRequest};
pub use service::{ProvisionedUser, ProvisioningConfig, UpdatedUser, UserProvisioningService};
