//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    15.50 * 2 + 3.50 = 34.5000000001?  ❌ depends on the operands        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1550 * 2 + 350 = 3450 cents → "34.50"                               │
//! │    Order totals are exact sums, rounding happens once on input          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimal text coming from clients (`"15.50"`, `"3.5"`, `"1.005"`) is parsed
//! with [`Money::parse`], which rounds half-up to two decimal places. Every
//! amount after that point is an integer number of cents, so an order total
//! is always exactly the rounded sum of its line subtotals.
//!
//! ## Usage
//! ```rust
//! use mesa_core::money::Money;
//!
//! let price = Money::parse("15.50").unwrap();
//! let line = price.multiply_quantity(2);
//! let total = line + Money::from_cents(350);
//! assert_eq!(total.to_decimal_string(), "34.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic never needs an overflow-prone unsigned cast
/// - **Single field tuple struct**: serialises as the bare integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let price = Money::from_cents(1550); // 15.50
    /// assert_eq!(price.cents(), 1550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1550);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 3100);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`Money::multiply_quantity`], `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Parses a non-negative decimal amount, rounding half-up to cents.
    ///
    /// ## Rounding
    /// ```text
    /// "15.5"   → 1550
    /// "1.005"  → 101    (third decimal ≥ 5 rounds up)
    /// "1.0049" → 100
    /// "12"     → 1200
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// assert_eq!(Money::parse("3.50").unwrap().cents(), 350);
    /// assert_eq!(Money::parse("1.005").unwrap().cents(), 101);
    /// assert!(Money::parse("-1").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let text = input.trim();
        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid("must be a non-negative decimal number"));
        }

        let major: i64 = whole
            .parse()
            .map_err(|_| invalid("amount is too large"))?;

        let mut digits = fraction.chars().filter_map(|c| c.to_digit(10));
        let tenths = digits.next().unwrap_or(0) as i64;
        let hundredths = digits.next().unwrap_or(0) as i64;
        let round_up = digits.next().map(|d| d >= 5).unwrap_or(false);

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(cents))
    }

    /// Formats the amount with exactly two decimals (`"34.50"`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_amounts() {
        assert_eq!(Money::parse("15.50").unwrap().cents(), 1550);
        assert_eq!(Money::parse("15.5").unwrap().cents(), 1550);
        assert_eq!(Money::parse("12").unwrap().cents(), 1200);
        assert_eq!(Money::parse("0").unwrap().cents(), 0);
        assert_eq!(Money::parse(" 3.50 ").unwrap().cents(), 350);
    }

    #[test]
    fn test_parse_rounds_half_up() {
        assert_eq!(Money::parse("1.005").unwrap().cents(), 101);
        assert_eq!(Money::parse("1.0049").unwrap().cents(), 100);
        assert_eq!(Money::parse("2.675").unwrap().cents(), 268);
        assert_eq!(Money::parse("9.999").unwrap().cents(), 1000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("-1.00").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse(".50").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3450).to_string(), "34.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1550);
        let b = Money::from_cents(350);

        assert_eq!((a * 2 + b).cents(), 3450);
        assert_eq!((a - b).cents(), 1200);

        let total: Money = vec![a.multiply_quantity(2), b].into_iter().sum();
        assert_eq!(total.to_decimal_string(), "34.50");
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_cents(1550);
        assert_eq!(price.checked_multiply_quantity(2), Some(Money::from_cents(3100)));
        assert_eq!(
            price.checked_add(Money::from_cents(350)),
            Some(Money::from_cents(1900))
        );

        let huge = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(huge.checked_multiply_quantity(2), None);
        assert_eq!(huge.checked_add(huge), None);
    }

    #[test]
    fn test_serializes_as_bare_cents() {
        let json = serde_json::to_string(&Money::from_cents(1550)).unwrap();
        assert_eq!(json, "1550");
    }
}
