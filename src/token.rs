//! Compact HMAC-SHA-256 signed tokens with a fixed lifetime.
//!
//! Tokens take the familiar `header.body.signature` shape: each segment is URL-safe base64
//! without padding, the header is always `{"alg":"HS256","typ":"JWT"}`, and the body is the
//! caller's claims plus `iat`/`exp` in unix seconds. Nothing is stored server-side.

pub mod claims;
pub mod manager;
pub mod purpose;
pub mod secret;

pub use claims::*;
pub use manager::*;
pub use purpose::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// Signs `payload` with the default 15-minute lifetime and the system clock.
pub fn create_token<P>(payload: &P, secret: &SigningSecret) -> Result<String>
where
	P: ?Sized + Serialize,
{
	TokenManager::default().create_token(payload, secret)
}

/// Verifies `token` against `secret` using the system clock.
pub fn verify_token(token: &str, secret: &SigningSecret) -> Result<Claims> {
	TokenManager::default().verify_token(token, secret)
}
