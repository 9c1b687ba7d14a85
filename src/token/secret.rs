//! Redacted HMAC-SHA-256 signing key.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{_prelude::*, error::ConfigError};

type HmacSha256 = Hmac<Sha256>;

/// Shared symmetric secret used to sign and verify tokens.
///
/// The secret is keyed into an HMAC instance once at construction; the raw bytes are never
/// printed by `Debug` or `Display`.
#[derive(Clone)]
pub struct SigningSecret {
	mac: HmacSha256,
}
impl SigningSecret {
	/// Keys a new secret. Empty secrets are rejected.
	pub fn new(value: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
		let value = value.as_ref();

		if value.is_empty() {
			return Err(ConfigError::EmptySecret);
		}

		let mac = <HmacSha256 as Mac>::new_from_slice(value).map_err(|_| ConfigError::SigningKey)?;

		Ok(Self { mac })
	}

	/// Signs `input` and returns the raw 32-byte tag.
	pub(crate) fn sign(&self, input: &str) -> Vec<u8> {
		let mut mac = self.mac.clone();

		mac.update(input.as_bytes());

		mac.finalize().into_bytes().to_vec()
	}

	/// Checks `tag` against the signature of `input` in constant time.
	pub(crate) fn verify(&self, input: &str, tag: &[u8]) -> bool {
		let mut mac = self.mac.clone();

		mac.update(input.as_bytes());

		mac.verify_slice(tag).is_ok()
	}
}
impl Debug for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
	}
}
impl Display for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
