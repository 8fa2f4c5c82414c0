//! Raw ledger amounts.
//!
//! Balances and voting weights are carried in raw units (the smallest ledger
//! unit) as `u128`, the ledger's native width. Every sum is checked, so a
//! total is either exact or an error. On the wire amounts are decimal strings.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::RepwatchError;

/// An exact, non-negative amount in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawAmount(u128);

impl RawAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Add `other`, reporting overflow as an error instead of wrapping.
    pub fn try_add(self, other: Self) -> Result<Self, RepwatchError> {
        self.checked_add(other).ok_or(RepwatchError::AmountOverflow {
            lhs: self.0,
            rhs: other.0,
        })
    }

    /// Exact sum of an iterator of amounts.
    pub fn try_sum<I>(amounts: I) -> Result<Self, RepwatchError>
    where
        I: IntoIterator<Item = RawAmount>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.try_add(amount))
    }

    /// Share of `total` as a percentage, for display.
    ///
    /// Returns 0 when `total` is zero. Threshold decisions must use
    /// [`RawAmount::is_at_least_percent`], which is exact.
    pub fn percent_of(&self, total: RawAmount) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        self.0 as f64 / total.0 as f64 * 100.0
    }

    /// Whether `self / total * 100 >= percent`, decided without rounding.
    ///
    /// Both sides are cross-multiplied into 256 bits. A zero `total` yields a
    /// share of 0, which only meets a threshold of 0.
    pub fn is_at_least_percent(&self, total: RawAmount, percent: u128) -> bool {
        if total.is_zero() {
            return percent == 0;
        }
        widening_mul(self.0, 100) >= widening_mul(percent, total.0)
    }
}

/// Full 256-bit product of two `u128` values as `(high, low)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let low = (ll & MASK) | (mid << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (high, low)
}

impl FromStr for RawAmount {
    type Err = RepwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RepwatchError::InvalidAmount(s.to_string()));
        }
        trimmed
            .parse::<u128>()
            .map(Self)
            .map_err(|_| RepwatchError::InvalidAmount(s.to_string()))
    }
}

impl From<u128> for RawAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RawAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawVisitor;

        impl Visitor<'_> for RawVisitor {
            type Value = RawAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a raw amount as a decimal string or unsigned integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawAmount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawAmount, E> {
                Ok(RawAmount(u128::from(v)))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<RawAmount, E> {
                Ok(RawAmount(v))
            }
        }

        deserializer.deserialize_any(RawVisitor)
    }
}
