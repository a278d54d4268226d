use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Decimal precision of an asset: raw quantities are scaled by `10^n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DecimalNumber(u8);

impl DecimalNumber {
    /// Largest precision whose scale factor still fits in a `u64`.
    pub const MAX: u8 = 19;

    pub const ZERO: Self = Self(0);

    pub fn new(value: u8) -> Result<Self, TypeError> {
        if value > Self::MAX {
            return Err(TypeError::DecimalOutOfRange {
                actual: value,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// `10^n` as a raw multiplier.
    pub const fn scale(self) -> u64 {
        10u64.pow(self.0 as u32)
    }
}

impl TryFrom<u8> for DecimalNumber {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DecimalNumber> for u8 {
    fn from(value: DecimalNumber) -> Self {
        value.0
    }
}

impl fmt::Display for DecimalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw, fixed-point asset amount.
///
/// All ledger arithmetic happens on the raw integer; the decimal precision
/// is only applied when converting from or to a human-readable form.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Sum a sequence of quantities, returning `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(items: I) -> Option<Self> {
        items
            .into_iter()
            .try_fold(Self::ZERO, |acc, q| acc.checked_add(q))
    }

    /// Convert whole units into a raw quantity at the given precision.
    pub fn from_units(units: u64, decimals: DecimalNumber) -> Result<Self, TypeError> {
        units
            .checked_mul(decimals.scale())
            .map(Self)
            .ok_or(TypeError::QuantityOverflow)
    }

    /// Parse a decimal string such as `"100.5"` at the given precision.
    ///
    /// More fractional digits than the precision allows is an error, so no
    /// value is ever silently truncated.
    pub fn parse_decimal(text: &str, decimals: DecimalNumber) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidQuantity(text.to_string());
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit())
            || fraction.len() > decimals.get() as usize
        {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let mut raw = Self::from_units(whole, decimals)?.0;
        if !fraction.is_empty() {
            let padding = decimals.get() as u32 - fraction.len() as u32;
            let fraction: u64 = fraction.parse().map_err(|_| invalid())?;
            raw = raw
                .checked_add(fraction * 10u64.pow(padding))
                .ok_or(TypeError::QuantityOverflow)?;
        }
        Ok(Self(raw))
    }

    /// Render the raw amount as a decimal string at the given precision.
    pub fn display(self, decimals: DecimalNumber) -> String {
        if decimals.get() == 0 {
            return self.0.to_string();
        }
        let scale = decimals.scale();
        format!(
            "{}.{:0width$}",
            self.0 / scale,
            self.0 % scale,
            width = decimals.get() as usize
        )
    }
}

impl From<u64> for Quantity {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({})", self.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
