//! # Money Module
//!
//! Provides the `Money` type used for order amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing a partner's earnings over hundreds of deliveries drifts.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is stored and summed in minor units.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use crowdship_core::money::Money;
//!
//! let fare = Money::from_cents(1550); // $15.50
//! let total = fare + Money::from_major_minor(4, 50);
//! assert_eq!(total.cents(), 2000);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

/// A monetary value in the smallest currency unit (cents).
///
/// Serialized as a bare integer, so `Money::from_cents(2000)` is stored as
/// `2000`.
///
/// Deserializing also accepts a decimal number of whole units (`24.5`),
/// the format older app versions stored. It is rounded to the nearest cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use crowdship_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(20, 0).cents(), 2000);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the absolute cents part (0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// For logs and debugging; the mobile shell formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer number of cents or a decimal amount")
    }

    fn visit_i64<E: de::Error>(self, cents: i64) -> Result<Money, E> {
        Ok(Money(cents))
    }

    fn visit_u64<E: de::Error>(self, cents: u64) -> Result<Money, E> {
        i64::try_from(cents)
            .map(Money)
            .map_err(|_| E::custom(format!("amount out of range: {}", cents)))
    }

    fn visit_f64<E: de::Error>(self, units: f64) -> Result<Money, E> {
        let cents = (units * 100.0).round();
        if !cents.is_finite() || cents.abs() > i64::MAX as f64 {
            return Err(E::custom(format!("amount out of range: {}", units)));
        }
        Ok(Money(cents as i64))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2000).to_string(), "$20.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_cents(150), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 400);
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_cents(1550)).unwrap();
        assert_eq!(json, "1550");
    }

    #[test]
    fn test_deserialize_cents_and_legacy_decimals() {
        let cents: Money = serde_json::from_str("2450").unwrap();
        assert_eq!(cents.cents(), 2450);

        let legacy: Money = serde_json::from_str("24.5").unwrap();
        assert_eq!(legacy.cents(), 2450);

        let rounded: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(rounded.cents(), 1999);

        assert!(serde_json::from_str::<Money>("\"24.50\"").is_err());
        assert_eq!(serde_json::to_string(&legacy).unwrap(), "2450");
    }
}
