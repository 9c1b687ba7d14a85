//! Purpose-bound tokens for password-reset and email-verification links.

// self
use crate::{
	_prelude::*,
	error::TokenError,
	obs::{self, GuardOp, GuardOutcome, GuardSpan},
	token::{Claims, SigningSecret, TokenManager},
};

/// Flow a purpose-bound token may be redeemed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
	/// Password-reset link sent by email.
	PasswordReset,
	/// Address-confirmation link sent after signup.
	EmailVerification,
}
impl TokenPurpose {
	/// Returns the stable claim value for the purpose.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenPurpose::PasswordReset => "password_reset",
			TokenPurpose::EmailVerification => "email_verification",
		}
	}
}
impl Display for TokenPurpose {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Issues and redeems tokens that are only valid for a single [`TokenPurpose`].
#[derive(Clone, Debug)]
pub struct PurposeTokens {
	manager: TokenManager,
	secret: SigningSecret,
}
impl PurposeTokens {
	/// Claim naming the account the token was issued for.
	pub const SUBJECT: &'static str = "sub";
	/// Claim naming the flow the token was issued for.
	pub const PURPOSE: &'static str = "purpose";

	/// Binds a manager to the secret used for every purpose-bound token.
	pub fn new(manager: TokenManager, secret: SigningSecret) -> Self {
		Self { manager, secret }
	}

	/// Issues a token for `subject` that only `purpose` may redeem.
	pub fn issue(&self, purpose: TokenPurpose, subject: &str) -> Result<String> {
		let claims =
			Claims::new().with(Self::SUBJECT, subject).with(Self::PURPOSE, purpose.as_str());

		self.manager.create_token(&claims, &self.secret)
	}

	/// Verifies `token`, requires it to carry `purpose`, and returns its subject.
	pub fn redeem(&self, purpose: TokenPurpose, token: &str) -> Result<String> {
		let _span = GuardSpan::new(GuardOp::PurposeRedeem, "redeem").entered();
		let result = self
			.manager
			.verify_token(token, &self.secret)
			.and_then(|claims| Self::subject_for(purpose, &claims).map_err(Error::from));

		obs::record_guard_outcome(GuardOp::PurposeRedeem, GuardOutcome::of(&result));

		result
	}

	fn subject_for(purpose: TokenPurpose, claims: &Claims) -> Result<String, TokenError> {
		match claims.get_str(Self::PURPOSE) {
			Some(found) if found == purpose.as_str() => {},
			found => {
				return Err(TokenError::PurposeMismatch {
					expected: purpose.as_str().into(),
					found: found.unwrap_or("none").into(),
				});
			},
		}

		claims.get_str(Self::SUBJECT).map(ToOwned::to_owned).ok_or(TokenError::InvalidFormat)
	}
}
