//! Timestamp wire forms: epoch seconds, RFC 3339 date-time, HTTP date.

use shapewire_schema::traits::TimestampFormatTrait;
use shapewire_schema::{Schema, TimestampFormat};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{DeserializeError, SerializeError};

const HTTP_DATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Format for `schema`: its `timestampFormat` trait, else `default`.
pub fn resolve_format(schema: &Schema, default: TimestampFormat) -> TimestampFormat {
    schema
        .get_trait::<TimestampFormatTrait>()
        .map(|t| t.0)
        .unwrap_or(default)
}

fn unix_millis(t: OffsetDateTime) -> i128 {
    t.unix_timestamp_nanos().div_euclid(1_000_000)
}

/// Epoch seconds as a JSON number literal, millisecond precision.
/// Whole seconds are written without a fractional part.
pub fn epoch_seconds_literal(t: OffsetDateTime) -> String {
    let millis = unix_millis(t);
    if millis % 1000 == 0 {
        (millis / 1000).to_string()
    } else {
        (millis as f64 / 1000.0).to_string()
    }
}

pub fn from_epoch_seconds(seconds: f64) -> Result<OffsetDateTime, DeserializeError> {
    let invalid = || DeserializeError::InvalidTimestamp {
        value: seconds.to_string(),
        format: TimestampFormat::EpochSeconds.as_str(),
    };
    if !seconds.is_finite() {
        return Err(invalid());
    }
    // `as` saturates, so huge inputs surface as an overflow here
    let millis = (seconds * 1000.0).round() as i128;
    let nanos = millis.checked_mul(1_000_000).ok_or_else(invalid)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| invalid())
}

fn truncate_to_millis(t: OffsetDateTime) -> OffsetDateTime {
    let t = t.to_offset(UtcOffset::UTC);
    t.replace_millisecond(t.millisecond()).unwrap_or(t)
}

/// Formats `t` as a string for the two textual formats.
pub fn format_text(t: OffsetDateTime, format: TimestampFormat) -> Result<String, SerializeError> {
    let t = truncate_to_millis(t);
    let formatted = match format {
        TimestampFormat::DateTime => t.format(&Rfc3339),
        TimestampFormat::HttpDate => t.format(HTTP_DATE),
        TimestampFormat::EpochSeconds => return Ok(epoch_seconds_literal(t)),
    };
    formatted.map_err(|e| SerializeError::Timestamp {
        format: format.as_str(),
        reason: e.to_string(),
    })
}

pub fn parse_text(value: &str, format: TimestampFormat) -> Result<OffsetDateTime, DeserializeError> {
    let invalid = || DeserializeError::InvalidTimestamp {
        value: value.to_owned(),
        format: format.as_str(),
    };
    match format {
        TimestampFormat::DateTime => OffsetDateTime::parse(value, &Rfc3339).map_err(|_| invalid()),
        TimestampFormat::HttpDate => PrimitiveDateTime::parse(value, HTTP_DATE)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|_| invalid()),
        TimestampFormat::EpochSeconds => value
            .parse::<f64>()
            .map_err(|_| invalid())
            .and_then(from_epoch_seconds),
    }
}
