// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff.
//!
//! Only idempotent directory calls go through [`retry`]; user creation is
//! never retried because a lost response would create a second identity.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
		}
	}
}

impl RetryConfig {
	/// Single attempt, no backoff.
	pub fn disabled() -> Self {
		Self {
			max_attempts: 1,
			..Self::default()
		}
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

const RETRYABLE_STATUSES: [StatusCode; 6] = [
	StatusCode::TOO_MANY_REQUESTS,
	StatusCode::REQUEST_TIMEOUT,
	StatusCode::INTERNAL_SERVER_ERROR,
	StatusCode::BAD_GATEWAY,
	StatusCode::SERVICE_UNAVAILABLE,
	StatusCode::GATEWAY_TIMEOUT,
];

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		self
			.status()
			.is_some_and(|status| RETRYABLE_STATUSES.contains(&status))
	}
}

fn calculate_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
	let exponential = cfg.base_delay.as_secs_f64() * cfg.backoff_factor.powi(attempt as i32);
	let capped = exponential.min(cfg.max_delay.as_secs_f64());

	let delay = if cfg.jitter {
		capped * (0.5 + fastrand::f64())
	} else {
		capped
	};

	Duration::from_secs_f64(delay)
}

pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !err.is_retryable() || attempt >= cfg.max_attempts {
					return Err(err);
				}

				let delay = calculate_delay(cfg, attempt - 1);
				warn!(
					error = ?err,
					attempt,
					max_attempts = cfg.max_attempts,
					delay_ms = delay.as_millis() as u64,
					"retrying directory call"
				);

				tokio::time::sleep(delay).await;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::Arc;

	#[derive(Debug)]
	struct Flaky {
		retryable: bool,
	}

	impl RetryableError for Flaky {
		fn is_retryable(&self) -> bool {
			self.retryable
		}
	}

	fn fast() -> RetryConfig {
		RetryConfig {
			max_attempts: 3,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(5),
			backoff_factor: 2.0,
			jitter: false,
		}
	}

	#[tokio::test]
	async fn non_retryable_error_is_returned_immediately() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&calls);

		let result: Result<(), Flaky> = retry(&fast(), || {
			let counter = Arc::clone(&counter);
			async move {
				counter.fetch_add(1, Ordering::SeqCst);
				Err(Flaky { retryable: false })
			}
		})
		.await;

		assert!(result.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn retryable_error_stops_at_max_attempts() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&calls);

		let result: Result<(), Flaky> = retry(&fast(), || {
			let counter = Arc::clone(&counter);
			async move {
				counter.fetch_add(1, Ordering::SeqCst);
				Err(Flaky { retryable: true })
			}
		})
		.await;

		assert!(result.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn recovers_after_transient_failures() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&calls);

		let result: Result<&str, Flaky> = retry(&fast(), || {
			let counter = Arc::clone(&counter);
			async move {
				if counter.fetch_add(1, Ordering::SeqCst) < 2 {
					Err(Flaky { retryable: true })
				} else {
					Ok("groups")
				}
			}
		})
		.await;

		assert_eq!(result.unwrap(), "groups");
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn disabled_config_makes_one_attempt() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&calls);

		let _: Result<(), Flaky> = retry(&RetryConfig::disabled(), || {
			let counter = Arc::clone(&counter);
			async move {
				counter.fetch_add(1, Ordering::SeqCst);
				Err(Flaky { retryable: true })
			}
		})
		.await;

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn delay_is_capped() {
		let cfg = RetryConfig {
			max_attempts: 10,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(5),
			backoff_factor: 10.0,
			jitter: false,
		};
		for attempt in 0..10 {
			assert!(calculate_delay(&cfg, attempt) <= Duration::from_secs(5));
		}
	}
}
