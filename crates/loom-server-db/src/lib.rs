// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # loom-server-db
//!
//! SQLite persistence for the secondary system: the read-only role mapping
//! table and the paired accounts created alongside directory users.
//!
//! Follows the store/repository split: [`PairedAccountStore`] is the trait
//! the provisioning service depends on, [`PairedAccountRepository`] the
//! sqlx implementation.
//!
//! Lookups where absence is normal return `Result<Option<T>>`. A second
//! account for the same external identifier is a [`DbError::Conflict`].

pub mod error;
pub mod migrations;
pub mod paired_account;
pub mod pool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use paired_account::{NewPairedAccount, PairedAccount, PairedAccountRepository, PairedAccountStore};
pub use pool::create_pool;
