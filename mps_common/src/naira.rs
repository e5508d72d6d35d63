use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const NAIRA_CURRENCY_CODE: &str = "NGN";
pub const KOBO_PER_NAIRA: i64 = 100;

//--------------------------------------       Naira        ----------------------------------------------------------
/// A monetary amount in kobo (1/100 Naira). Stored as a signed integer so that ledger arithmetic is exact.
/// Paystack amounts are expressed in kobo, so values round-trip to the gateway without conversion.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Naira(i64);

op!(binary Naira, Add, add);
op!(binary Naira, Sub, sub);
op!(inplace Naira, AddAssign, add_assign);
op!(inplace Naira, SubAssign, sub_assign);
op!(unary Naira, Neg, neg);

impl Mul<i64> for Naira {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Naira {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in kobo: {0}")]
pub struct NairaConversionError(String);

impl From<i64> for Naira {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Naira {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Naira {}

impl TryFrom<u64> for Naira {
    type Error = NairaConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(NairaConversionError(format!("Value {value} is too large to convert to Naira")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Naira {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let kobo = self.0.abs();
        write!(f, "{sign}₦{}.{:02}", kobo / KOBO_PER_NAIRA, kobo % KOBO_PER_NAIRA)
    }
}

impl Naira {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_naira(naira: i64) -> Self {
        Self(naira * KOBO_PER_NAIRA)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic_is_exact() {
        let a = Naira::from_naira(150);
        let b = Naira::from(50);
        assert_eq!((a + b).value(), 15_050);
        assert_eq!((a - b).value(), 14_950);
        assert_eq!((b * 3).value(), 150);
        let total: Naira = [a, b, b].into_iter().sum();
        assert_eq!(total.value(), 15_100);
    }

    #[test]
    fn display_formats_kobo_as_decimal_naira() {
        assert_eq!(Naira::from(250_075).to_string(), "₦2500.75");
        assert_eq!(Naira::from(5).to_string(), "₦0.05");
        assert_eq!(Naira::from(-199).to_string(), "-₦1.99");
    }

    #[test]
    fn u64_conversion_rejects_overflow() {
        assert!(Naira::try_from(u64::MAX).is_err());
        assert_eq!(Naira::try_from(42u64).unwrap(), Naira::from(42));
    }
}
