// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP surface of the directory bridge: user CRUD, password reset and facet
//! listings, all behind a static bearer token.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;

pub use error::DirectoryApiError;
pub use routes::{directory_routes, DirectoryState};
