// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for outbound calls to the directory service.
//!
//! - A client builder with a consistent User-Agent header
//! - Retry with exponential backoff for transient failures

mod client;
mod retry;

pub use client::{builder, user_agent};
pub use retry::{retry, RetryConfig, RetryableError};
