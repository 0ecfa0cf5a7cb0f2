//! RFC 3339 timestamps with nanosecond precision.
//!
//! The fractional second is written with trailing zeros trimmed (200ns is
//! `.0000002`, a whole second has no fraction at all) and a zero offset is
//! written as `Z`. Parsing is strict: an uppercase `T` separates date and
//! time, a zero offset is an uppercase `Z` or numeric, and leap seconds are
//! rejected. Anything parsed therefore formats back to the same text.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// A timezone-aware instant as carried in envelope properties.
pub type Timestamp = DateTime<FixedOffset>;

const NANOS_PER_SECOND: u32 = 1_000_000_000;
const DATE_TIME_SEPARATOR_INDEX: usize = 10;

/// Reasons a timestamp is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimestampError {
    /// Not an RFC 3339 timestamp at all.
    #[error(transparent)]
    Layout(#[from] chrono::ParseError),

    /// Date and time are separated by something other than an uppercase `T`.
    #[error("date and time must be separated by an uppercase 'T'")]
    Separator,

    /// A zero offset written as a lowercase `z`.
    #[error("zero offset must be an uppercase 'Z'")]
    LowercaseZulu,

    /// The seconds field is 60.
    #[error("leap seconds are not supported")]
    LeapSecond,
}

/// Format `ts` in the envelope's textual form.
#[must_use]
pub fn format(ts: &Timestamp) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();

    // chrono carries a leap second's extra second in the nanoseconds.
    let nanos = ts.timestamp_subsec_nanos() % NANOS_PER_SECOND;
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    if ts.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&ts.format("%:z").to_string());
    }

    out
}

/// Parse an RFC 3339 timestamp, keeping its offset.
///
/// # Errors
///
/// Returns [`ParseTimestampError::Layout`] if `s` is not RFC 3339, and the
/// other variants for RFC 3339 spellings outside the envelope's layout.
pub fn parse(s: &str) -> Result<Timestamp, ParseTimestampError> {
    let ts = DateTime::parse_from_rfc3339(s)?;

    if s.as_bytes().get(DATE_TIME_SEPARATOR_INDEX) != Some(&b'T') {
        return Err(ParseTimestampError::Separator);
    }
    if s.ends_with('z') {
        return Err(ParseTimestampError::LowercaseZulu);
    }
    if ts.timestamp_subsec_nanos() >= NANOS_PER_SECOND {
        return Err(ParseTimestampError::LeapSecond);
    }

    Ok(ts)
}

/// Serde adapter writing timestamps with [`format`] and reading them with [`parse`].
pub mod rfc3339_nano {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    /// Serialize a timestamp as a string.
    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(ts))
    }

    /// Deserialize a timestamp from a string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).map_err(D::Error::custom)
    }
}
