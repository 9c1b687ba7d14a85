//! Optional observability helpers for guard operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `storefront_guard.op` with the `op` (guard
//!   operation) and `stage` (call site) fields, plus `debug` events for rejections and evictions.
//! - Enable `metrics` to increment the `storefront_guard_decision_total` counter for every
//!   decision, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

pub(crate) use tracing::guard_debug;

// self
use crate::_prelude::*;

/// Guard operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardOp {
	/// Sliding-window quota check.
	RateLimit,
	/// Signed token issuance.
	TokenIssue,
	/// Signed token verification.
	TokenVerify,
	/// Purpose-bound token redemption (password reset, email verification).
	PurposeRedeem,
}
impl GuardOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GuardOp::RateLimit => "rate_limit",
			GuardOp::TokenIssue => "token_issue",
			GuardOp::TokenVerify => "token_verify",
			GuardOp::PurposeRedeem => "purpose_redeem",
		}
	}
}
impl Display for GuardOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardOutcome {
	/// The call was admitted, or the token was issued/accepted.
	Success,
	/// The call was throttled, or the token was refused.
	Rejected,
}
impl GuardOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GuardOutcome::Success => "success",
			GuardOutcome::Rejected => "rejected",
		}
	}

	/// Maps a result onto its outcome label.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Rejected }
	}
}
impl Display for GuardOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
