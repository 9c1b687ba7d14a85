//! Rate limiter configuration with serde defaults and builder-style setters.

// self
use crate::{_prelude::*, error::ConfigError};

/// Settings fixed at [`RateLimiter`](crate::limit::RateLimiter) construction.
///
/// Missing fields fall back to [`Default`] when deserialized, so a bare `{}` yields a one-hour
/// window over at most 500 keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterConfig {
	/// Trailing window length in seconds.
	pub interval_secs: u64,
	/// Ceiling on distinct tracked keys before insertion-order eviction kicks in.
	pub max_unique_keys: usize,
}
impl RateLimiterConfig {
	/// Default window length (one hour).
	pub const DEFAULT_INTERVAL_SECS: u64 = 60 * 60;
	/// Default ceiling on distinct tracked keys.
	pub const DEFAULT_MAX_UNIQUE_KEYS: usize = 500;

	/// Overrides the window length.
	///
	/// The window is stored in whole seconds, so a fractional second rounds up. Negative
	/// durations clamp to zero and fail validation.
	pub fn with_interval(mut self, interval: Duration) -> Self {
		let secs = interval
			.whole_seconds()
			.saturating_add(i64::from(interval.subsec_nanoseconds() > 0));

		self.interval_secs = u64::try_from(secs).unwrap_or(0);

		self
	}

	/// Overrides the distinct-key ceiling.
	pub fn with_max_unique_keys(mut self, max_unique_keys: usize) -> Self {
		self.max_unique_keys = max_unique_keys;

		self
	}

	/// Window length as a [`Duration`].
	pub fn interval(&self) -> Duration {
		Duration::seconds(i64::try_from(self.interval_secs).unwrap_or(i64::MAX))
	}

	/// Rejects settings that would make the limiter meaningless.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.interval_secs == 0 {
			return Err(ConfigError::ZeroInterval);
		}
		if self.max_unique_keys == 0 {
			return Err(ConfigError::ZeroKeyCeiling);
		}

		Ok(())
	}
}
impl Default for RateLimiterConfig {
	fn default() -> Self {
		Self {
			interval_secs: Self::DEFAULT_INTERVAL_SECS,
			max_unique_keys: Self::DEFAULT_MAX_UNIQUE_KEYS,
		}
	}
}
