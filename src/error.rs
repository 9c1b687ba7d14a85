//! Guard-level error types shared across the limiter, token manager, and reservation helpers.

// self
use crate::{_prelude::*, limit::RetryDirective, reservation::ReservationIdError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical guard error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token could not be issued or verified.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Reservation identifier failed validation.
	#[error(transparent)]
	Reservation(#[from] ReservationIdError),

	/// Caller exhausted its quota; retry after the directive's delay.
	#[error("Rate limit exceeded; retry in {} seconds.", .0.retry_after_seconds)]
	QuotaExceeded(RetryDirective),
}
impl Error {
	/// HTTP-style status code a request handler should surface for this error.
	pub fn status_hint(&self) -> u16 {
		match self {
			Self::QuotaExceeded(directive) => directive.status_hint,
			Self::Token(_) => 401,
			Self::Config(_) => 500,
			Self::Reservation(_) => 400,
		}
	}
}

/// Configuration and validation failures raised while constructing guards.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// Signing secrets must contain at least one byte.
	#[error("Signing secret cannot be empty.")]
	EmptySecret,
	/// The HMAC primitive refused the signing key.
	#[error("Signing secret cannot key HMAC-SHA-256.")]
	SigningKey,
	/// Rate limit windows must be longer than zero.
	#[error("Rate limit interval must be positive.")]
	ZeroInterval,
	/// At least one key must be trackable.
	#[error("The max_unique_keys ceiling must be at least 1.")]
	ZeroKeyCeiling,
	/// Token lifetimes must be longer than zero.
	#[error("Token lifetime must be positive.")]
	NonPositiveLifetime,
}

/// Failures produced while issuing or verifying signed tokens.
///
/// Every verification failure is terminal for that attempt; callers must obtain a fresh token.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Token does not have exactly three segments, or its body cannot be decoded.
	#[error("Token is malformed.")]
	InvalidFormat,
	/// Recomputed signature does not match the supplied one.
	#[error("Token signature is invalid.")]
	InvalidSignature,
	/// Token lifetime has elapsed.
	#[error("Token expired at unix time {expired_at}.")]
	Expired {
		/// Value of the `exp` claim (unix seconds).
		expired_at: i64,
	},
	/// Payload did not serialize into a JSON object.
	#[error("Token payload must serialize to a JSON object.")]
	PayloadNotObject,
	/// Token was minted for a different flow.
	#[error("Token purpose mismatch: expected {expected}, found {found}.")]
	PurposeMismatch {
		/// Purpose the caller attempted to redeem.
		expected: String,
		/// Purpose recorded in the token, or `none`.
		found: String,
	},
	/// Verified claims could not be decoded into the requested type.
	#[error("Token claims could not be decoded.")]
	ClaimsDecode {
		/// Structured decoding failure including the offending claim path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
