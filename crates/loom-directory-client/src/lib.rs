// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory service client.
//!
//! [`DirectoryClient`] is the seam the provisioning service talks through.
//! [`KeycloakClient`] implements it against the Keycloak admin REST API;
//! [`testing::InMemoryDirectory`] is an in-process double for tests.

mod client;
mod error;
mod keycloak;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::DirectoryClient;
pub use error::DirectoryError;
pub use keycloak::{KeycloakClient, KeycloakConfig};
