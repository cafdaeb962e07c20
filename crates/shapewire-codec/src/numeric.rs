//! Integer narrowing with range errors, and float sentinels.

use crate::DeserializeError;

/// Fixed-width integer targets of a numeric read.
pub(crate) trait IntWidth: Copy + TryFrom<i128> + std::fmt::Display {
    const NAME: &'static str;
    const MIN: Self;
    const MAX: Self;
}

macro_rules! int_width {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl IntWidth for $ty {
            const NAME: &'static str = $name;
            const MIN: Self = <$ty>::MIN;
            const MAX: Self = <$ty>::MAX;
        }
    )*};
}

int_width!(i8 => "int8", i16 => "int16", i32 => "int32", i64 => "int64");

fn out_of_range<T: IntWidth>(value: impl ToString) -> DeserializeError {
    DeserializeError::OutOfRange {
        value: value.to_string(),
        target: T::NAME,
        min: T::MIN.to_string(),
        max: T::MAX.to_string(),
    }
}

pub(crate) fn narrow<T: IntWidth>(value: i128) -> Result<T, DeserializeError> {
    T::try_from(value).map_err(|_| out_of_range::<T>(value))
}

/// Parses an exact JSON integer literal into `T`, checking bounds.
pub(crate) fn parse_int<T: IntWidth>(literal: &str) -> Result<T, DeserializeError> {
    if literal.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return Err(DeserializeError::TypeMismatch {
            expected: "integer",
            found: "fractional number",
        });
    }
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DeserializeError::InvalidNumber(literal.to_owned()));
    }
    match literal.parse::<i128>() {
        Ok(v) => narrow::<T>(v),
        // more digits than i128 holds: out of range for every width
        Err(_) => Err(out_of_range::<T>(literal)),
    }
}

pub(crate) fn parse_float(literal: &str) -> Result<f64, DeserializeError> {
    literal
        .parse::<f64>()
        .map_err(|_| DeserializeError::InvalidNumber(literal.to_owned()))
}

/// `"NaN"`, `"Infinity"` and `"-Infinity"`, matched case-insensitively.
pub(crate) fn float_sentinel(s: &str) -> Option<f64> {
    if s.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else if s.eq_ignore_ascii_case("infinity") {
        Some(f64::INFINITY)
    } else if s.eq_ignore_ascii_case("-infinity") {
        Some(f64::NEG_INFINITY)
    } else {
        None
    }
}
