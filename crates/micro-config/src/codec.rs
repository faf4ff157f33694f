//! String encodings for typed settings.
//!
//! Every setting is stored as text. A codec is passed explicitly on read and
//! write; nothing is inferred from the stored string.

use std::convert::Infallible;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Canonical layout for stored timestamps (`YYYY-MM-DD HH:MM:SS.ffffff`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// The fraction is optional on read so values written without one still parse.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// `0` marks a digit; every other byte must match exactly.
const WHOLE_SECONDS_SHAPE: &str = "0000-00-00 00:00:00";
const MAX_FRACTION_DIGITS: usize = 6;

/// Reasons a stored timestamp is rejected.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The text is not `YYYY-MM-DD HH:MM:SS[.ffffff]`, including any padding.
    #[error("timestamp does not match YYYY-MM-DD HH:MM:SS.ffffff")]
    Layout,
    /// The fraction is finer than microseconds.
    #[error("timestamp fraction exceeds microsecond precision")]
    Precision {
        /// Number of fractional digits found.
        digits: usize,
    },
    /// The layout matched but the fields do not form a valid date and time.
    #[error("timestamp fields out of range")]
    OutOfRange {
        /// Underlying chrono parse error.
        source: chrono::ParseError,
    },
}

fn check_layout(raw: &str) -> Result<(), TimestampError> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };

    let shaped = whole.len() == WHOLE_SECONDS_SHAPE.len()
        && whole
            .bytes()
            .zip(WHOLE_SECONDS_SHAPE.bytes())
            .all(|(byte, expected)| match expected {
                b'0' => byte.is_ascii_digit(),
                other => byte == other,
            });
    if !shaped {
        return Err(TimestampError::Layout);
    }

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(TimestampError::Layout);
        }
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(TimestampError::Precision {
                digits: fraction.len(),
            });
        }
    }
    Ok(())
}

/// Conversion between a typed value and its stored string.
pub trait SettingCodec {
    /// Decoded type.
    type Value;
    /// Decoding failure.
    type Error: std::error::Error + Send + Sync + 'static;
    /// Short name recorded in errors.
    const KIND: &'static str;

    /// Parse a stored string.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not a valid encoding.
    fn decode(&self, raw: &str) -> Result<Self::Value, Self::Error>;

    /// Render a value for storage.
    fn encode(&self, value: &Self::Value) -> String;
}

/// Identity codec: the stored string as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl SettingCodec for Text {
    type Value = String;
    type Error = Infallible;
    const KIND: &'static str = "text";

    fn decode(&self, raw: &str) -> Result<String, Infallible> {
        Ok(raw.to_string())
    }

    fn encode(&self, value: &String) -> String {
        value.clone()
    }
}

/// Naive local timestamp with microsecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp;

impl SettingCodec for Timestamp {
    type Value = NaiveDateTime;
    type Error = TimestampError;
    const KIND: &'static str = "timestamp";

    fn decode(&self, raw: &str) -> Result<NaiveDateTime, TimestampError> {
        check_layout(raw)?;
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT)
            .map_err(|source| TimestampError::OutOfRange { source })
    }

    fn encode(&self, value: &NaiveDateTime) -> String {
        value.format(TIMESTAMP_FORMAT).to_string()
    }
}
