//! Conversion between numbers and the text the service stores.
//!
//! Every value written to a field travels as text. [`Value`] is the closed set
//! of things a field can be set to; [`Value::render`] is the single place that
//! turns one into field text and enforces the range and length limits.

use super::FieldValue;
use super::error::Error;
use core::fmt::Write;
use heapless::String;

/// Largest magnitude a float may have to be written.
pub const FLOAT_LIMIT: f32 = 999_999_000_000.0;
/// [`FLOAT_LIMIT`] for `f64` values, which are checked before any narrowing.
pub const DOUBLE_LIMIT: f64 = 999_999_000_000.0;
/// Digits after the decimal point when rendering a float.
pub const FLOAT_PRECISION: usize = 5;

/// Text of an `i32`: up to 10 digits and a sign.
pub type IntText = String<11>;
/// Text of an `i64`: up to 19 digits and a sign.
pub type LongText = String<20>;
/// Text of an in-range float: sign, 12 integer digits, point, 5 decimals.
pub type FloatText = String<20>;

/// A value that can be written to a channel field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// A 32-bit integer
    Int(i32),
    /// A 64-bit integer
    Long(i64),
    /// A float, rendered with five decimals
    Float(f32),
    /// A double, range-checked at full precision and rendered with five decimals
    Double(f64),
    /// Text, at most 255 bytes
    Text(&'a str),
}

impl Value<'_> {
    /// Renders the value as field text.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a float outside ±999,999,000,000 or text longer
    /// than 255 bytes.
    pub fn render(&self) -> Result<FieldValue, Error> {
        let mut text = FieldValue::new();
        match *self {
            Value::Int(value) => text.push_str(&format_int(value)),
            Value::Long(value) => text.push_str(&format_long(value)),
            Value::Float(value) => text.push_str(&format_float(value)?),
            Value::Double(value) => text.push_str(&format_double(value)?),
            Value::Text(value) => text.push_str(value),
        }
        .map_err(|_| Error::OutOfRange)?;
        Ok(text)
    }
}

macro_rules! value_from {
    ($variant:ident: $($t:ty),+) => {
        $(
            impl From<$t> for Value<'_> {
                fn from(value: $t) -> Self {
                    Value::$variant(value.into())
                }
            }
        )+
    };
}

value_from!(Int: i8, i16, i32, u8, u16);
value_from!(Long: i64, u32);
value_from!(Float: f32);

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Text(value)
    }
}

impl<'a, const N: usize> From<&'a String<N>> for Value<'a> {
    fn from(value: &'a String<N>) -> Self {
        Value::Text(value.as_str())
    }
}

/// Base-10 text of an `i32`.
pub fn format_int(value: i32) -> IntText {
    let mut text = IntText::new();
    // Always fits: "-2147483648" is 11 bytes.
    let _ = write!(text, "{}", value);
    text
}

/// Base-10 text of an `i64`.
pub fn format_long(value: i64) -> LongText {
    let mut text = LongText::new();
    // Always fits: "-9223372036854775808" is 20 bytes.
    let _ = write!(text, "{}", value);
    text
}

/// Fixed five-decimal text of a float.
///
/// Infinities and NaN are rendered as `inf`, `-inf` and `NaN`.
///
/// # Errors
///
/// [`Error::OutOfRange`] when the value is finite and its magnitude exceeds
/// [`FLOAT_LIMIT`].
pub fn format_float(value: f32) -> Result<FloatText, Error> {
    if !value.is_infinite() && (value > FLOAT_LIMIT || value < -FLOAT_LIMIT) {
        return Err(Error::OutOfRange);
    }
    let mut text = FloatText::new();
    write!(text, "{:.*}", FLOAT_PRECISION, value).map_err(|_| Error::OutOfRange)?;
    Ok(text)
}

/// Fixed five-decimal text of a double.
///
/// # Errors
///
/// [`Error::OutOfRange`] when the value is finite and its magnitude exceeds
/// [`DOUBLE_LIMIT`].
pub fn format_double(value: f64) -> Result<FloatText, Error> {
    if !value.is_infinite() && (value > DOUBLE_LIMIT || value < -DOUBLE_LIMIT) {
        return Err(Error::OutOfRange);
    }
    let mut text = FloatText::new();
    write!(text, "{:.*}", FLOAT_PRECISION, value).map_err(|_| Error::OutOfRange)?;
    Ok(text)
}

/// Parses the leading integer of `text`, `0` when there is none.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit, so `"12.7"` gives `12`. Overflow saturates.
pub fn parse_long(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Parses the leading integer of `text` into an `i32`, saturating.
pub fn parse_int(text: &str) -> i32 {
    parse_long(text).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Parses the leading decimal number of `text`, `0.0` when there is none.
///
/// `inf`, `infinity` and `nan` are accepted in any case. A leading `-` that
/// parses to an infinity always yields negative infinity, since some decimal
/// parsers lose the sign there.
pub fn parse_float(text: &str) -> f32 {
    let text = text.trim();
    let prefix = &text[..numeric_prefix_len(text)];

    let mut value = prefix
        .parse::<f32>()
        .or_else(|_| text.parse::<f32>())
        .unwrap_or(0.0);
    if value.is_infinite() && text.starts_with('-') {
        value = f32::NEG_INFINITY;
    }
    value
}

/// Length of the longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}
