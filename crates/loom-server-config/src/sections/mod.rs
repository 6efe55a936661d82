// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for loom-server.

pub mod api;
pub mod database;
pub mod directory;
pub mod http;
pub mod logging;
pub mod paired;
pub mod provisioning;

pub use api::{ApiConfig, ApiConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use directory::{DirectoryConfig, DirectoryConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use paired::{PairedConfig, PairedConfigLayer};
pub use provisioning::{ProvisioningSettings, ProvisioningConfigLayer};
