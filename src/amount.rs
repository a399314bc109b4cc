use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Error, Result};

/// Fixed-point scale: 7 decimal places, the ledger's native resolution.
pub const SCALE: i64 = 10_000_000;

/// An exact 7-decimal fixed-point amount, stored as a signed stroop count.
///
/// All money math in the engine goes through this type; binary floating
/// point never touches amounts or fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

/// A proportional rate (e.g. a per-contribution fee of `0.001`), stored
/// 1e7-scaled like [`Amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rate(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_stroops(stroops: i64) -> Self {
        Amount(stroops)
    }

    pub fn stroops(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(Error::MathOverflow)
    }

    pub fn checked_sub(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(Error::MathOverflow)
    }

    /// Multiplies by a rate, rounding half away from zero at the 7th
    /// decimal place.
    pub fn apply_rate(self, rate: Rate) -> Result<Amount> {
        let prod = self.0 as i128 * rate.0 as i128;
        let half = SCALE as i128 / 2;
        let rounded = if prod >= 0 {
            (prod + half) / SCALE as i128
        } else {
            (prod - half) / SCALE as i128
        };
        i64::try_from(rounded)
            .map(Amount)
            .map_err(|_| Error::MathOverflow)
    }
}

impl Rate {
    pub const ZERO: Rate = Rate(0);

    pub fn from_raw(raw: i64) -> Self {
        Rate(raw)
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

/// Parses a decimal string with at most 7 fraction digits into a scaled
/// integer. Rejects anything else; no rounding happens on input.
fn parse_fixed(s: &str) -> Result<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::InvalidAmount);
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
        || frac_part.len() > 7
    {
        return Err(Error::InvalidAmount);
    }

    let int_val: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| Error::InvalidAmount)?
    };

    let mut frac_val: i64 = 0;
    if !frac_part.is_empty() {
        let mut padded = String::from(frac_part);
        while padded.len() < 7 {
            padded.push('0');
        }
        frac_val = padded.parse().map_err(|_| Error::InvalidAmount)?;
    }

    let raw = int_val
        .checked_mul(SCALE)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or(Error::MathOverflow)?;

    Ok(if negative { -raw } else { raw })
}

fn format_fixed(raw: i64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let abs = raw.unsigned_abs();
    let sign = if raw < 0 { "-" } else { "" };
    write!(f, "{}{}.{:07}", sign, abs / SCALE as u64, abs % SCALE as u64)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_fixed(self.0, f)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_fixed(self.0, f)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_fixed(s).map(Amount)
    }
}

impl FromStr for Rate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_fixed(s).map(Rate)
    }
}

// Amounts and rates travel as decimal strings on the request surface and in
// emitted bundles, exactly as the ledger expects them.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
