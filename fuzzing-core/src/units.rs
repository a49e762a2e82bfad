//! Human-readable size and duration parsing
//!
//! Pool files express disk, memory and cycle time as short strings such as
//! `"120g"` or `"1h"`. Sizes use base-1024 multipliers (`k`, `m`, `g`, `t`)
//! over bytes; durations use `s`, `m`, `h`, `d`, `w` over seconds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PoolError, Result};

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;
pub const TIB: u64 = 1024 * GIB;

/// A size or duration as written in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl Quantity {
    /// Parse as a size in bytes divided by `divisor`
    pub fn to_size(&self, divisor: u64) -> Result<u64> {
        match self {
            Quantity::Integer(n) => {
                scale(Magnitude::Whole(*n), 1, divisor, "size", &n.to_string())
            }
            Quantity::Float(n) => {
                scale(Magnitude::Fraction(*n), 1, divisor, "size", &n.to_string())
            }
            Quantity::Text(s) => parse_size(s, divisor),
        }
    }

    /// Parse as a duration in seconds
    pub fn to_seconds(&self) -> Result<u64> {
        match self {
            Quantity::Integer(n) => Ok(*n),
            Quantity::Float(n) => {
                scale(Magnitude::Fraction(*n), 1, 1, "duration", &n.to_string())
            }
            Quantity::Text(s) => parse_time(s),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Integer(n) => write!(f, "{}", n),
            Quantity::Float(n) => write!(f, "{}", n),
            Quantity::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Quantity::Text(s.to_string())
    }
}

impl From<u64> for Quantity {
    fn from(n: u64) -> Self {
        Quantity::Integer(n)
    }
}

/// Parse a size like `"4g"` into `4 * 1024^3 / divisor`
///
/// The magnitude may be fractional (`"1.5g"`), the suffix is case-insensitive
/// and may be followed by `b` (`"4gb"`). The result is rounded down.
///
/// # Errors
/// Returns [`PoolError::UnknownUnit`] for a suffix outside `k`, `m`, `g`, `t`
/// and [`PoolError::InvalidQuantity`] for anything else that does not parse
/// or a zero divisor.
pub fn parse_size(value: &str, divisor: u64) -> Result<u64> {
    let normalized = value.trim().to_ascii_lowercase();
    let (magnitude, unit) = split_magnitude(&normalized, "size", value)?;
    let unit = unit.strip_suffix('b').unwrap_or(unit);

    let multiplier = match unit {
        "" => 1,
        "k" => KIB,
        "m" => MIB,
        "g" => GIB,
        "t" => TIB,
        other => {
            return Err(PoolError::UnknownUnit {
                kind: "size",
                unit: other.to_string(),
                value: value.to_string(),
            });
        }
    };

    scale(magnitude, multiplier, divisor, "size", value)
}

/// Parse a duration like `"1h"` into seconds
///
/// A bare number is already in seconds.
pub fn parse_time(value: &str) -> Result<u64> {
    let normalized = value.trim().to_ascii_lowercase();
    let (magnitude, unit) = split_magnitude(&normalized, "duration", value)?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        other => {
            return Err(PoolError::UnknownUnit {
                kind: "duration",
                unit: other.to_string(),
                value: value.to_string(),
            });
        }
    };

    scale(magnitude, multiplier, 1, "duration", value)
}

/// Numeric part of a quantity
#[derive(Debug, Clone, Copy, PartialEq)]
enum Magnitude {
    Whole(u64),
    Fraction(f64),
}

/// Split `"12.5g"` into `(Fraction(12.5), "g")`
fn split_magnitude<'a>(
    normalized: &'a str,
    kind: &'static str,
    original: &str,
) -> Result<(Magnitude, &'a str)> {
    let invalid = || PoolError::InvalidQuantity {
        kind,
        value: original.to_string(),
    };

    let end = normalized
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(normalized.len());
    let (digits, unit) = normalized.split_at(end);

    if digits.is_empty() || digits == "." {
        return Err(invalid());
    }
    let magnitude = if digits.contains('.') {
        Magnitude::Fraction(digits.parse().map_err(|_| invalid())?)
    } else {
        Magnitude::Whole(digits.parse().map_err(|_| invalid())?)
    };

    Ok((magnitude, unit.trim_start()))
}

/// `magnitude * multiplier / divisor`, rounded down
///
/// Fails instead of saturating when the product does not fit in a `u64`.
fn scale(
    magnitude: Magnitude,
    multiplier: u64,
    divisor: u64,
    kind: &'static str,
    value: &str,
) -> Result<u64> {
    let invalid = || PoolError::InvalidQuantity {
        kind,
        value: value.to_string(),
    };
    if divisor == 0 {
        return Err(invalid());
    }

    match magnitude {
        Magnitude::Whole(whole) => whole
            .checked_mul(multiplier)
            .map(|total| total / divisor)
            .ok_or_else(invalid),
        Magnitude::Fraction(fraction) => {
            if !fraction.is_finite() || fraction < 0.0 {
                return Err(invalid());
            }
            let total = (fraction * multiplier as f64 / divisor as f64).floor();
            // u64::MAX as f64 rounds up to 2^64, which is already out of range
            if total >= u64::MAX as f64 {
                return Err(invalid());
            }
            Ok(total as u64)
        }
    }
}
