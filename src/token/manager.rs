//! Issues and verifies compact `header.body.signature` tokens.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	error::{ConfigError, TokenError},
	obs::{self, GuardOp, GuardOutcome, GuardSpan},
	token::{Claims, SigningSecret},
};

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const SEPARATOR: char = '.';

/// Token manager settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenManagerConfig {
	/// Seconds between `iat` and `exp` on every issued token.
	pub lifetime_secs: i64,
}
impl TokenManagerConfig {
	/// Default token lifetime (15 minutes).
	pub const DEFAULT_LIFETIME_SECS: i64 = 15 * 60;

	/// Overrides the token lifetime.
	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime_secs = lifetime.whole_seconds();

		self
	}

	/// Rejects non-positive lifetimes.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.lifetime_secs <= 0 {
			return Err(ConfigError::NonPositiveLifetime);
		}

		Ok(())
	}
}
impl Default for TokenManagerConfig {
	fn default() -> Self {
		Self { lifetime_secs: Self::DEFAULT_LIFETIME_SECS }
	}
}

/// Signs claim payloads with HMAC-SHA-256 and verifies them back.
///
/// Tokens are never stored; verification is a pure function of the token string, the secret,
/// and the clock. The signature is always checked before any claim (including `exp`) is read.
#[derive(Clone)]
pub struct TokenManager {
	lifetime: Duration,
	clock: Arc<dyn Clock>,
}
impl TokenManager {
	/// Creates a manager that reads the system clock.
	pub fn new(config: TokenManagerConfig) -> Result<Self> {
		Self::with_clock(config, clock::system())
	}

	/// Creates a manager that reads time from `clock`.
	pub fn with_clock(config: TokenManagerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
		config.validate()?;

		Ok(Self { lifetime: Duration::seconds(config.lifetime_secs), clock })
	}

	/// Lifetime stamped onto every issued token.
	pub fn lifetime(&self) -> Duration {
		self.lifetime
	}

	/// Signs `payload` (merged with `iat`/`exp`) into a three-segment token.
	///
	/// `payload` must serialize to a JSON object; `iat` and `exp` entries it carries are
	/// overwritten.
	pub fn create_token<P>(&self, payload: &P, secret: &SigningSecret) -> Result<String>
	where
		P: ?Sized + Serialize,
	{
		let _span = GuardSpan::new(GuardOp::TokenIssue, "create_token").entered();
		let result = self.sign_claims(payload, secret);

		obs::record_guard_outcome(GuardOp::TokenIssue, GuardOutcome::of(&result));

		Ok(result?)
	}

	/// Verifies `token` against `secret` and returns every claim it carries.
	pub fn verify_token(&self, token: &str, secret: &SigningSecret) -> Result<Claims> {
		let _span = GuardSpan::new(GuardOp::TokenVerify, "verify_token").entered();
		let result = self.open(token, secret);

		if let Err(e) = &result {
			obs::guard_debug!(error = %e, "Token rejected.");

			#[cfg(not(feature = "tracing"))]
			let _ = e;
		}

		obs::record_guard_outcome(GuardOp::TokenVerify, GuardOutcome::of(&result));

		Ok(result?)
	}

	/// Verifies `token` and decodes its claims into `T`.
	pub fn verify_as<T>(&self, token: &str, secret: &SigningSecret) -> Result<T>
	where
		T: DeserializeOwned,
	{
		Ok(self.verify_token(token, secret)?.deserialize_into()?)
	}

	fn sign_claims<P>(&self, payload: &P, secret: &SigningSecret) -> Result<String, TokenError>
	where
		P: ?Sized + Serialize,
	{
		let Ok(Value::Object(map)) = serde_json::to_value(payload) else {
			return Err(TokenError::PayloadNotObject);
		};
		let mut claims = Claims::from(map);
		let issued_at = self.clock.now().unix_timestamp();

		claims.stamp(issued_at, issued_at.saturating_add(self.lifetime.whole_seconds()));

		let body = Value::Object(claims.into_map()).to_string();
		let signing_input = format!(
			"{}{SEPARATOR}{}",
			URL_SAFE_NO_PAD.encode(HEADER_JSON),
			URL_SAFE_NO_PAD.encode(body)
		);
		let signature = URL_SAFE_NO_PAD.encode(secret.sign(&signing_input));

		Ok(format!("{signing_input}{SEPARATOR}{signature}"))
	}

	fn open(&self, token: &str, secret: &SigningSecret) -> Result<Claims, TokenError> {
		let segments = token.split(SEPARATOR).collect::<Vec<_>>();
		let [header, body, signature] = segments.as_slice() else {
			return Err(TokenError::InvalidFormat);
		};
		let signing_input = &token[..header.len() + 1 + body.len()];
		let tag = URL_SAFE_NO_PAD.decode(signature).map_err(|_| TokenError::InvalidSignature)?;

		if !secret.verify(signing_input, &tag) {
			return Err(TokenError::InvalidSignature);
		}

		let bytes = URL_SAFE_NO_PAD.decode(body).map_err(|_| TokenError::InvalidFormat)?;
		let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&bytes) else {
			return Err(TokenError::InvalidFormat);
		};
		let claims = Claims::from(map);

		if let Some(expires_at) = claims.get(Claims::EXPIRES_AT) {
			let expires_at = expires_at.as_i64().ok_or(TokenError::InvalidFormat)?;

			if expires_at < self.clock.now().unix_timestamp() {
				return Err(TokenError::Expired { expired_at: expires_at });
			}
		}

		Ok(claims)
	}
}
impl Default for TokenManager {
	fn default() -> Self {
		Self {
			lifetime: Duration::seconds(TokenManagerConfig::DEFAULT_LIFETIME_SECS),
			clock: clock::system(),
		}
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager").field("lifetime", &self.lifetime).finish()
	}
}
