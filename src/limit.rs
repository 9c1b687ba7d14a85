//! Sliding-window rate limiting for request handlers.
//!
//! Handlers hold a shared [`RateLimiter`] (or any [`RateLimitPolicy`]) and ask it, per call,
//! whether a client key still has quota inside the trailing window. Rejections carry a
//! [`RetryDirective`] with the seconds to wait and an HTTP status hint.

pub mod config;
pub mod sliding_window;

pub use config::*;
pub use sliding_window::*;

// self
use crate::_prelude::*;

/// Status code callers should surface when a quota is exhausted.
pub const QUOTA_EXCEEDED_STATUS: u16 = 429;

/// Strategy that decides whether the next call for a key may proceed.
pub trait RateLimitPolicy
where
	Self: Send + Sync,
{
	/// Evaluates (and records, when admitted) a call for `key` under `limit` calls per window.
	fn evaluate(&self, limit: u32, key: &str) -> RateLimitDecision;

	/// Same as [`evaluate`](Self::evaluate) but turns a rejection into
	/// [`Error::QuotaExceeded`]. Returns the remaining quota on success.
	fn enforce(&self, limit: u32, key: &str) -> Result<u32> {
		match self.evaluate(limit, key) {
			RateLimitDecision::Allow { remaining } => Ok(remaining),
			RateLimitDecision::Reject(directive) => Err(Error::QuotaExceeded(directive)),
		}
	}
}

/// Result emitted by a [`RateLimitPolicy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The call may proceed immediately.
	Allow {
		/// Calls still available to the key inside the current window.
		remaining: u32,
	},
	/// The call was refused and not recorded.
	Reject(RetryDirective),
}
impl RateLimitDecision {
	/// Returns `true` when the call was admitted.
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allow { .. })
	}

	/// Returns the retry directive for rejected calls.
	pub fn retry_directive(&self) -> Option<&RetryDirective> {
		match self {
			Self::Allow { .. } => None,
			Self::Reject(directive) => Some(directive),
		}
	}
}

/// Advises callers when to retry after a [`RateLimitDecision::Reject`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Instant when the oldest counted call leaves the window.
	pub earliest_retry_at: OffsetDateTime,
	/// Whole seconds until `earliest_retry_at`, rounded up and never below 1.
	pub retry_after_seconds: u64,
	/// HTTP-style status code for the caller to surface.
	pub status_hint: u16,
}
impl RetryDirective {
	/// Creates a directive for a retry at `earliest_retry_at`, observed at `now`.
	pub fn new(earliest_retry_at: OffsetDateTime, now: OffsetDateTime) -> Self {
		Self {
			earliest_retry_at,
			retry_after_seconds: ceil_seconds(earliest_retry_at - now),
			status_hint: QUOTA_EXCEEDED_STATUS,
		}
	}

	/// Suggested wait as a [`Duration`].
	pub fn retry_after(&self) -> Duration {
		Duration::seconds(i64::try_from(self.retry_after_seconds).unwrap_or(i64::MAX))
	}

	/// Value for an HTTP `Retry-After` header (delta-seconds form).
	pub fn retry_after_header(&self) -> String {
		self.retry_after_seconds.to_string()
	}
}

/// Key that scopes a client identifier to a single guarded route.
///
/// Sharing one limiter across login, signup, and review endpoints is safe as long as each
/// route composes its own scope, e.g. `login:203.0.113.9`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);
impl RateLimitKey {
	/// Joins `scope` and `identifier` with a colon.
	pub fn composite(scope: &str, identifier: &str) -> Self {
		Self(format!("{scope}:{identifier}"))
	}

	/// Borrows the composed key.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for RateLimitKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for RateLimitKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn ceil_seconds(wait: Duration) -> u64 {
	const NANOS_PER_SECOND: i128 = 1_000_000_000;

	let nanos = wait.whole_nanoseconds();

	if nanos <= 0 {
		return 1;
	}

	let seconds = (nanos + NANOS_PER_SECOND - 1) / NANOS_PER_SECOND;

	u64::try_from(seconds).unwrap_or(u64::MAX).max(1)
}
