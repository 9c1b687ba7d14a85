//! Request guards for storefront services—sliding-window rate limiting, HMAC-signed short-lived
//! tokens, and purpose-bound reset/verification links in one small crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod error;
pub mod limit;
pub mod obs;
pub mod reservation;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		clock::{Clock, ManualClock},
		limit::{RateLimiter, RateLimiterConfig},
		token::{SigningSecret, TokenManager, TokenManagerConfig},
	};

	/// Fixed instant every fixture clock starts at.
	pub const FIXTURE_EPOCH: OffsetDateTime = time::macros::datetime!(2025-11-10 12:00 UTC);

	/// Builds a manual clock pinned to [`FIXTURE_EPOCH`].
	pub fn fixture_clock() -> Arc<ManualClock> {
		Arc::new(ManualClock::new(FIXTURE_EPOCH))
	}

	/// Constructs a [`RateLimiter`] that reads time from the provided manual clock.
	pub fn build_test_limiter(
		interval: Duration,
		max_unique_keys: usize,
		clock: Arc<ManualClock>,
	) -> RateLimiter {
		let config = RateLimiterConfig::default()
			.with_interval(interval)
			.with_max_unique_keys(max_unique_keys);
		let clock: Arc<dyn Clock> = clock;

		RateLimiter::with_clock(config, clock)
			.expect("Test limiter configuration should be valid.")
	}

	/// Constructs a [`TokenManager`] with the default lifetime and the provided manual clock.
	pub fn build_test_token_manager(clock: Arc<ManualClock>) -> TokenManager {
		let clock: Arc<dyn Clock> = clock;

		TokenManager::with_clock(TokenManagerConfig::default(), clock)
			.expect("Default token manager configuration should be valid.")
	}

	/// Wraps a fixture secret.
	pub fn test_secret(value: &str) -> SigningSecret {
		SigningSecret::new(value).expect("Fixture secret should be non-empty.")
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use tokio as _;
