// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Common configuration primitives for the Loom directory bridge.
//!
//! - [`Secret<T>`]: wraps directory client secrets and API tokens so they never
//!   reach logs or config dumps
//! - [`load_secret_env`]: loads a secret from `VAR` or the file named by
//!   `VAR_FILE`

pub mod env;
pub mod secret;

pub use env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
