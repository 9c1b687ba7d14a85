//! Claim maps carried inside signed tokens.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, error::TokenError};

/// Verified (or about-to-be-signed) claim payload.
///
/// Besides the caller's own claims, every issued token carries [`Claims::ISSUED_AT`] and
/// [`Claims::EXPIRES_AT`] as unix seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);
impl Claims {
	/// Registered claim holding the issue instant.
	pub const ISSUED_AT: &'static str = "iat";
	/// Registered claim holding the expiry instant.
	pub const EXPIRES_AT: &'static str = "exp";

	/// Creates an empty claim set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a claim.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(name.into(), value.into());

		self
	}

	/// Looks up a claim by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Looks up a string claim by name.
	pub fn get_str(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(Value::as_str)
	}

	/// Issue instant in unix seconds.
	pub fn issued_at(&self) -> Option<i64> {
		self.get(Self::ISSUED_AT).and_then(Value::as_i64)
	}

	/// Expiry instant in unix seconds.
	pub fn expires_at(&self) -> Option<i64> {
		self.get(Self::EXPIRES_AT).and_then(Value::as_i64)
	}

	/// Borrows the underlying JSON object.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Consumes the claims and returns the underlying JSON object.
	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}

	/// Decodes the claims into a caller-defined type, reporting the failing claim path.
	pub fn deserialize_into<T>(&self) -> Result<T, TokenError>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(Value::Object(self.0.clone()))
			.map_err(|source| TokenError::ClaimsDecode { source })
	}

	pub(crate) fn stamp(&mut self, issued_at: i64, expires_at: i64) {
		self.0.insert(Self::ISSUED_AT.into(), issued_at.into());
		self.0.insert(Self::EXPIRES_AT.into(), expires_at.into());
	}
}
impl From<Map<String, Value>> for Claims {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
