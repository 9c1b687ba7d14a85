//! Human-readable reservation codes (`RSV-YYYYMMDD-XXXXXX`).

// std
use std::ops::Deref;
// crates.io
use rand::Rng;
use time::{Date, Month};
// self
use crate::{_prelude::*, clock::Clock};

const PREFIX: &str = "RSV-";
const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ENCODED_LEN: usize = PREFIX.len() + 8 + 1 + SUFFIX_LEN;

/// Error returned when a reservation code fails validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ReservationIdError {
	/// The code does not follow the `RSV-YYYYMMDD-XXXXXX` shape.
	#[error("Reservation code `{value}` is malformed.")]
	Malformed {
		/// Offending input.
		value: String,
	},
	/// The date component is not a real calendar date.
	#[error("Reservation code `{value}` carries an invalid date.")]
	InvalidDate {
		/// Offending input.
		value: String,
	},
}

/// Validated reservation code stamped with its UTC creation date.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReservationId(String);
impl ReservationId {
	/// Generates a fresh code dated with `clock`'s current UTC day.
	pub fn generate(clock: &dyn Clock) -> Self {
		Self::generate_at(clock.now(), &mut rand::rng())
	}

	/// Generates a code for `instant` using the provided random source.
	pub fn generate_at<R>(instant: OffsetDateTime, rng: &mut R) -> Self
	where
		R: Rng,
	{
		let date = instant.to_offset(time::UtcOffset::UTC).date();
		let suffix = (0..SUFFIX_LEN)
			.map(|_| char::from(SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())]))
			.collect::<String>();

		Self(format!(
			"{PREFIX}{:04}{:02}{:02}-{suffix}",
			date.year(),
			u8::from(date.month()),
			date.day()
		))
	}

	/// Calendar date encoded in the code.
	pub fn date(&self) -> Date {
		// Shape and date were validated at construction.
		parse_date(&self.0[PREFIX.len()..PREFIX.len() + 8]).unwrap_or(Date::MIN)
	}

	/// Random suffix of the code.
	pub fn suffix(&self) -> &str {
		&self.0[ENCODED_LEN - SUFFIX_LEN..]
	}
}
impl Deref for ReservationId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ReservationId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ReservationId> for String {
	fn from(value: ReservationId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ReservationId {
	type Error = ReservationIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for ReservationId {
	type Err = ReservationIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_from(s.to_owned())
	}
}
impl Debug for ReservationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Reservation({})", self.0)
	}
}
impl Display for ReservationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate(value: &str) -> Result<(), ReservationIdError> {
	let malformed = || ReservationIdError::Malformed { value: value.to_owned() };

	if value.len() != ENCODED_LEN || !value.is_ascii() {
		return Err(malformed());
	}

	let rest = value.strip_prefix(PREFIX).ok_or_else(malformed)?;
	let (date, suffix) = rest.split_once('-').ok_or_else(malformed)?;

	if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
		return Err(malformed());
	}
	if suffix.len() != SUFFIX_LEN || !suffix.bytes().all(|b| SUFFIX_CHARSET.contains(&b)) {
		return Err(malformed());
	}

	parse_date(date).ok_or_else(|| ReservationIdError::InvalidDate { value: value.to_owned() })?;

	Ok(())
}

fn parse_date(digits: &str) -> Option<Date> {
	let year = digits.get(0..4)?.parse::<i32>().ok()?;
	let month = digits.get(4..6)?.parse::<u8>().ok()?;
	let day = digits.get(6..8)?.parse::<u8>().ok()?;

	Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}
