//! Value literal grammar for `--literal` and `--direct`
//!
//! A literal is either a bare number or an `offset:value` pair. Integers use
//! automatic base detection from the prefix (`0x`, `0o`, `0b`); anything that
//! is not a valid integer is retried as a floating point number.
//!
//! ```text
//! 0x10      -> Scalar(Int(16))
//! 3.5       -> Scalar(Float(3.5))
//! 4:0x10    -> Pair { offset: 4, value: Int(16) }
//! ```

use std::fmt;

use thiserror::Error;

/// Error produced when a token does not follow the literal grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralParseError {
    /// Token is empty (or only whitespace)
    #[error("empty value")]
    Empty,
    /// Token is neither an integer nor a floating point number
    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),
    /// Integer does not fit in 64 bits
    #[error("integer literal '{0}' is out of range")]
    OutOfRange(String),
    /// An offset-qualified literal was expected
    #[error("expected offset:value, got '{0}'")]
    MissingSeparator(String),
    /// Offset half of a pair is not a whole number
    #[error("offset in '{0}' must be a whole number")]
    InvalidOffset(String),
}

/// A single numeric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
}

impl Number {
    /// Integer value, if this number is an integer
    pub fn as_int(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(_) => None,
        }
    }

    /// Value as a float (integers are converted)
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A parsed command line literal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    /// Bare value
    Scalar(Number),
    /// Value qualified with a byte offset
    Pair {
        /// Byte offset the value applies to
        offset: i64,
        /// The value
        value: Number,
    },
}

impl LiteralValue {
    /// The numeric value, ignoring any offset
    pub fn value(&self) -> Number {
        match *self {
            LiteralValue::Scalar(value) => value,
            LiteralValue::Pair { value, .. } => value,
        }
    }

    /// The offset, for offset-qualified literals
    pub fn offset(&self) -> Option<i64> {
        match *self {
            LiteralValue::Scalar(_) => None,
            LiteralValue::Pair { offset, .. } => Some(offset),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Scalar(value) => write!(f, "{}", value),
            LiteralValue::Pair { offset, value } => write!(f, "{}:{}", offset, value),
        }
    }
}

/// Parse a literal: a bare integer or float, or an `offset:value` integer pair
///
/// Only the first two `:`-separated parts of a pair are used. An integer
/// literal too large for 64 bits is an error, not a float.
pub fn parse_literal(token: &str) -> Result<LiteralValue, LiteralParseError> {
    if let Some((offset, value)) = split_pair(token) {
        return Ok(LiteralValue::Pair {
            offset: parse_int_auto(offset)?,
            value: Number::Int(parse_int_auto(value)?),
        });
    }

    match parse_int_auto(token) {
        Ok(value) => Ok(LiteralValue::Scalar(Number::Int(value))),
        Err(e @ (LiteralParseError::Empty | LiteralParseError::OutOfRange(_))) => Err(e),
        Err(_) => parse_float(token).map(|v| LiteralValue::Scalar(Number::Float(v))),
    }
}

/// Parse an offset-qualified literal `offset:value`
///
/// Both halves are parsed as integers first. If either half is not an
/// integer, both halves are parsed as floats instead; the offset must then
/// still be a whole number. A half that overflows 64 bits is an error.
pub fn parse_direct(token: &str) -> Result<LiteralValue, LiteralParseError> {
    let (offset, value) =
        split_pair(token).ok_or_else(|| LiteralParseError::MissingSeparator(token.to_string()))?;

    match (parse_int_auto(offset), parse_int_auto(value)) {
        (Ok(offset), Ok(value)) => {
            return Ok(LiteralValue::Pair {
                offset,
                value: Number::Int(value),
            })
        }
        (Err(e @ LiteralParseError::OutOfRange(_)), _)
        | (_, Err(e @ LiteralParseError::OutOfRange(_))) => return Err(e),
        _ => {}
    }

    let offset_f = parse_float(offset)?;
    let value = parse_float(value)?;
    Ok(LiteralValue::Pair {
        offset: whole_offset(offset_f, token)?,
        value: Number::Float(value),
    })
}

/// Parse an integer, detecting the base from its prefix
///
/// Accepts an optional sign, a `0x`/`0o`/`0b` prefix (any case) and single
/// underscores between digits. Decimal literals may not start with `0`
/// unless every digit is `0`.
pub fn parse_int_auto(token: &str) -> Result<i64, LiteralParseError> {
    let invalid = || LiteralParseError::InvalidNumber(token.to_string());

    let text = token.trim();
    if text.is_empty() {
        return Err(LiteralParseError::Empty);
    }

    let (negative, body) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits, prefixed) = match body.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &body[2..], true),
        [b'0', b'o' | b'O', ..] => (8, &body[2..], true),
        [b'0', b'b' | b'B', ..] => (2, &body[2..], true),
        _ => (10, body, false),
    };

    // After a prefix a single leading underscore is allowed ("0x_ff")
    let digits = if prefixed {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };

    let cleaned = strip_separators(digits, radix).ok_or_else(invalid)?;

    let leading_zero = cleaned.len() > 1 && cleaned.starts_with('0');
    if radix == 10 && leading_zero && cleaned.bytes().any(|b| b != b'0') {
        return Err(invalid());
    }

    let magnitude = u64::from_str_radix(&cleaned, radix)
        .map_err(|_| LiteralParseError::OutOfRange(token.to_string()))?;

    let value = if negative {
        -(i128::from(magnitude))
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value).map_err(|_| LiteralParseError::OutOfRange(token.to_string()))
}

/// Parse a floating point literal
pub fn parse_float(token: &str) -> Result<f64, LiteralParseError> {
    let text = token.trim();
    if text.is_empty() {
        return Err(LiteralParseError::Empty);
    }
    text.parse::<f64>()
        .map_err(|_| LiteralParseError::InvalidNumber(token.to_string()))
}

/// Split `a:b[:...]` into its first two parts
fn split_pair(token: &str) -> Option<(&str, &str)> {
    let (first, rest) = token.split_once(':')?;
    let second = rest.split_once(':').map_or(rest, |(second, _)| second);
    Some((first, second))
}

/// Remove digit group separators, validating every digit against the radix
fn strip_separators(digits: &str, radix: u32) -> Option<String> {
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return None;
    }
    if digits.contains("__") {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.chars().all(|c| c.is_digit(radix)) {
        Some(cleaned)
    } else {
        None
    }
}

fn whole_offset(offset: f64, token: &str) -> Result<i64, LiteralParseError> {
    let in_range = offset >= i64::MIN as f64 && offset < i64::MAX as f64;
    if offset.is_finite() && offset.fract() == 0.0 && in_range {
        Ok(offset as i64)
    } else {
        Err(LiteralParseError::InvalidOffset(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefixes() {
        assert_eq!(parse_int_auto("0x10").unwrap(), 16);
        assert_eq!(parse_int_auto("0XfF").unwrap(), 255);
        assert_eq!(parse_int_auto("0o17").unwrap(), 15);
        assert_eq!(parse_int_auto("0b101").unwrap(), 5);
        assert_eq!(parse_int_auto("42").unwrap(), 42);
        assert_eq!(parse_int_auto("-0x10").unwrap(), -16);
        assert_eq!(parse_int_auto("+7").unwrap(), 7);
        assert_eq!(parse_int_auto("  12 ").unwrap(), 12);
        assert_eq!(parse_int_auto("0").unwrap(), 0);
        assert_eq!(parse_int_auto("000").unwrap(), 0);
    }

    #[test]
    fn test_parse_int_underscores() {
        assert_eq!(parse_int_auto("1_000").unwrap(), 1000);
        assert_eq!(parse_int_auto("0x_ff").unwrap(), 255);
        assert!(parse_int_auto("1__0").is_err());
        assert!(parse_int_auto("_1").is_err());
        assert!(parse_int_auto("1_").is_err());
    }

    #[test]
    fn test_parse_int_rejects() {
        assert!(parse_int_auto("010").is_err());
        assert!(parse_int_auto("0x").is_err());
        assert!(parse_int_auto("0b102").is_err());
        assert!(parse_int_auto("1.5").is_err());
        assert!(parse_int_auto("--1").is_err());
        assert_eq!(parse_int_auto(""), Err(LiteralParseError::Empty));
        assert!(matches!(
            parse_int_auto("0x1_0000_0000_0000_0000"),
            Err(LiteralParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_int_limits() {
        assert_eq!(parse_int_auto("-0x8000000000000000").unwrap(), i64::MIN);
        assert_eq!(parse_int_auto("0x7fffffffffffffff").unwrap(), i64::MAX);
        assert!(parse_int_auto("0x8000000000000000").is_err());
    }

    #[test]
    fn test_literal_scalar() {
        assert_eq!(
            parse_literal("0x10").unwrap(),
            LiteralValue::Scalar(Number::Int(16))
        );
        assert_eq!(
            parse_literal("3.5").unwrap(),
            LiteralValue::Scalar(Number::Float(3.5))
        );
        // Not a valid integer literal, but a valid float
        assert_eq!(
            parse_literal("010").unwrap(),
            LiteralValue::Scalar(Number::Float(10.0))
        );
        assert_eq!(
            parse_literal("1e3").unwrap(),
            LiteralValue::Scalar(Number::Float(1000.0))
        );
    }

    #[test]
    fn test_literal_pair() {
        assert_eq!(
            parse_literal("4:0x10").unwrap(),
            LiteralValue::Pair {
                offset: 4,
                value: Number::Int(16)
            }
        );
        // Only the first two parts count
        assert_eq!(
            parse_literal("1:2:3").unwrap(),
            LiteralValue::Pair {
                offset: 1,
                value: Number::Int(2)
            }
        );
        assert!(parse_literal("1:2.5").is_err());
        assert!(parse_literal(":5").is_err());
    }

    #[test]
    fn test_literal_rejects() {
        assert!(matches!(
            parse_literal("abc"),
            Err(LiteralParseError::InvalidNumber(_))
        ));
        assert_eq!(parse_literal(" "), Err(LiteralParseError::Empty));
    }

    #[test]
    fn test_direct_integer_pair() {
        assert_eq!(
            parse_direct("1:0xe0").unwrap(),
            LiteralValue::Pair {
                offset: 1,
                value: Number::Int(0xE0)
            }
        );
    }

    #[test]
    fn test_direct_float_fallback() {
        // Integer parse of the value fails, so both halves become floats
        assert_eq!(
            parse_direct("4:3.3").unwrap(),
            LiteralValue::Pair {
                offset: 4,
                value: Number::Float(3.3)
            }
        );
        // A hex offset cannot be parsed as a float
        assert!(parse_direct("0x4:3.3").is_err());
        assert!(matches!(
            parse_direct("1.5:2.0"),
            Err(LiteralParseError::InvalidOffset(_))
        ));
    }

    #[test]
    fn test_oversized_integers_are_not_floats() {
        assert_eq!(
            parse_literal("99999999999999999999"),
            Err(LiteralParseError::OutOfRange(
                "99999999999999999999".to_string()
            ))
        );
        assert!(matches!(
            parse_literal("0x1_0000_0000_0000_0000"),
            Err(LiteralParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_direct("1:0x1_0000_0000_0000_0000"),
            Err(LiteralParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_direct("99999999999999999999:1.5"),
            Err(LiteralParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_direct_requires_separator() {
        assert_eq!(
            parse_direct("0x10"),
            Err(LiteralParseError::MissingSeparator("0x10".to_string()))
        );
    }

    #[test]
    fn test_literal_accessors() {
        let pair = parse_literal("8:0xf0").unwrap();
        assert_eq!(pair.offset(), Some(8));
        assert_eq!(pair.value().as_int(), Some(0xF0));
        assert_eq!(pair.to_string(), "8:240");

        let scalar = parse_literal("3.3").unwrap();
        assert_eq!(scalar.offset(), None);
        assert_eq!(scalar.value().as_int(), None);
        assert!((scalar.value().as_f64() - 3.3).abs() < f64::EPSILON);
    }
}
