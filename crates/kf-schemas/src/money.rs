//! Fixed-point money type.
//!
//! All monetary amounts use a 1e-6 (micros) fixed-point representation
//! stored as `i64`. 1 USD = `Money::from_micros(1_000_000)`.
//!
//! Percentages are applied in integer arithmetic, so an uplift such as
//! "8% of the hardware subtotal" is exact to the micro and never rounded to
//! cents. Cent rounding happens only through [`Money::round_cents`], which
//! quote totals call explicitly.
//!
//! On the wire a `Money` is a plain JSON number in currency units
//! (`1220.5`), matching the persisted quote shape.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Micros per currency unit.
pub const MICROS_SCALE: i64 = 1_000_000;

const MICROS_PER_CENT: i64 = MICROS_SCALE / 100;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_micros(raw: i64) -> Self {
        Money(raw)
    }

    /// Whole currency units (e.g. `Money::units(800)` is $800.00).
    #[inline]
    pub const fn units(units: i64) -> Self {
        Money(units * MICROS_SCALE)
    }

    #[inline]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Parse a float amount in currency units. Returns `None` for NaN,
    /// infinities and values outside the representable range.
    pub fn from_f64(v: f64) -> Option<Money> {
        if !v.is_finite() {
            return None;
        }
        let scaled = (v * MICROS_SCALE as f64).round();
        if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
            return None;
        }
        Some(Money(scaled as i64))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / MICROS_SCALE as f64
    }

    /// `pct` percent of this amount, truncated toward zero at micro precision.
    pub fn percent(self, pct: i64) -> Money {
        Money(((self.0 as i128 * pct as i128) / 100) as i64)
    }

    /// Unit amount times an integer quantity (saturating).
    pub fn times(self, qty: u32) -> Money {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// `None` on overflow.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Round half away from zero to whole cents.
    pub fn round_cents(self) -> Money {
        let half = MICROS_PER_CENT / 2;
        let cents = if self.0 >= 0 {
            self.0.saturating_add(half) / MICROS_PER_CENT
        } else {
            self.0.saturating_sub(half) / MICROS_PER_CENT
        };
        Money(cents * MICROS_PER_CENT)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

// Operators saturate at the i64 bounds; use `checked_add`/`checked_sub`
// where an out-of-range amount must be reported instead.

impl Add for Money {
    type Output = Money;
    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;
    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;
    #[inline]
    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

/// Two-decimal rendering (`1220.00`, `-50.00`).
impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cents = self.round_cents().0 / MICROS_PER_CENT;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(deserializer)?;
        Money::from_f64(v)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_scale_to_micros() {
        assert_eq!(Money::units(800).micros(), 800_000_000);
    }

    #[test]
    fn percent_is_exact_for_whole_amounts() {
        assert_eq!(Money::units(1000).percent(8), Money::units(80));
        assert_eq!(Money::units(800).percent(15), Money::units(120));
    }

    #[test]
    fn percent_keeps_sub_cent_precision() {
        // 12% of 10.01 = 1.2012
        let m = Money::from_micros(10_010_000).percent(12);
        assert_eq!(m.micros(), 1_201_200);
    }

    #[test]
    fn round_cents_half_away_from_zero() {
        assert_eq!(
            Money::from_micros(1_005_000).round_cents(),
            Money::from_micros(1_010_000)
        );
        assert_eq!(
            Money::from_micros(1_004_999).round_cents(),
            Money::from_micros(1_000_000)
        );
        assert_eq!(
            Money::from_micros(-1_005_000).round_cents(),
            Money::from_micros(-1_010_000)
        );
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Money::units(1220).to_string(), "1220.00");
        assert_eq!(Money::units(-50).to_string(), "-50.00");
        assert_eq!(Money::from_micros(1_201_200).to_string(), "1.20");
    }

    #[test]
    fn from_f64_rejects_non_finite() {
        assert_eq!(Money::from_f64(f64::NAN), None);
        assert_eq!(Money::from_f64(f64::INFINITY), None);
        assert_eq!(Money::from_f64(19.99), Some(Money::from_micros(19_990_000)));
    }

    #[test]
    fn serde_uses_currency_units() {
        let json = serde_json::to_string(&Money::units(1220)).unwrap();
        assert_eq!(json, "1220.0");
        let back: Money = serde_json::from_str("1220").unwrap();
        assert_eq!(back, Money::units(1220));
    }

    #[test]
    fn checked_ops_report_overflow() {
        let big = Money::from_micros(i64::MAX - 1);
        assert_eq!(big.checked_add(Money::from_micros(2)), None);
        assert_eq!(Money::from_micros(i64::MIN).checked_sub(Money::from_micros(1)), None);
        assert_eq!(
            Money::units(2).checked_sub(Money::units(3)),
            Some(Money::units(-1))
        );
    }

    #[test]
    fn operators_saturate() {
        let big = Money::from_micros(i64::MAX - 1);
        assert_eq!(big + Money::units(1), Money::from_micros(i64::MAX));
        assert_eq!(-Money::from_micros(i64::MIN), Money::from_micros(i64::MAX));
        let mut m = big;
        m += big;
        assert_eq!(m, Money::from_micros(i64::MAX));
        // rounding at the bound does not overflow
        let _ = Money::from_micros(i64::MAX).round_cents();
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [Money::units(1), Money::units(2), Money::units(3)]
            .iter()
            .sum();
        assert_eq!(total, Money::units(6));
    }
}
