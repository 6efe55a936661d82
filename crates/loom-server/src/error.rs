// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_directory_client::DirectoryError;
use loom_server_config::ConfigError;
use loom_server_db::DbError;

/// Startup failures of the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("directory client error: {0}")]
	Directory(#[from] DirectoryError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
