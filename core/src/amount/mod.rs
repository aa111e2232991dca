//! # Amount Module: Exact MOB Arithmetic
//!
//! Every amount the staging pipeline touches is a [`MonetaryAmount`]: a
//! non-negative, arbitrary-precision count of picoMOB. There is no floating
//! point anywhere in this module, and there is no fixed-width integer that
//! could overflow when a fee is added to a large spend.
//!
//! ```text
//! codec.rs       "1,234.5" display strings <-> picoMOB integers
//! validation.rs  can this account afford amount + fee?
//! ```

pub mod codec;
pub mod validation;

use std::fmt;
use std::ops::Add;

use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use codec::{
    format_minor_units_to_decimal, format_mob, parse_decimal_to_minor_units, AmountError,
    FormatIssue,
};
pub use validation::{validate_spend, InsufficientFunds};

// ---------------------------------------------------------------------------
// MonetaryAmount
// ---------------------------------------------------------------------------

/// An exact amount of picoMOB (10^-12 MOB).
///
/// Backed by [`BigUint`], so sums never wrap and comparisons are exact no
/// matter how large the figures the daemon hands back. `Display` renders the
/// grouped decimal MOB form (`1,000.000000000000`); the wire form used by
/// serde is the plain minor-unit digit string (`"1000000000000000"`).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonetaryAmount(BigUint);

impl MonetaryAmount {
    /// Zero picoMOB.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Wraps a count of minor units.
    pub fn from_minor_units(units: impl Into<BigUint>) -> Self {
        Self(units.into())
    }

    /// Parses a plain base-10 digit string of minor units, as the daemon
    /// sends them. No separators, no signs.
    pub fn from_minor_units_str(digits: &str) -> Result<Self, AmountError> {
        if digits.is_empty() {
            return Err(AmountError::invalid(digits, FormatIssue::Empty));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(AmountError::invalid(
                digits,
                FormatIssue::UnexpectedCharacter(bad),
            ));
        }
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| AmountError::invalid(digits, FormatIssue::NoDigits))
    }

    /// Returns `true` for zero picoMOB.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The minor-unit count as a plain digit string.
    pub fn to_minor_units_string(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// `self - other`, or `None` if the result would be negative.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(&other.0).map(Self)
    }
}

impl From<u64> for MonetaryAmount {
    fn from(units: u64) -> Self {
        Self(BigUint::from(units))
    }
}

impl From<u128> for MonetaryAmount {
    fn from(units: u128) -> Self {
        Self(BigUint::from(units))
    }
}

impl From<BigUint> for MonetaryAmount {
    fn from(units: BigUint) -> Self {
        Self(units)
    }
}

impl Add for &MonetaryAmount {
    type Output = MonetaryAmount;

    fn add(self, rhs: &MonetaryAmount) -> MonetaryAmount {
        MonetaryAmount(&self.0 + &rhs.0)
    }
}

impl Add for MonetaryAmount {
    type Output = MonetaryAmount;

    fn add(self, rhs: MonetaryAmount) -> MonetaryAmount {
        MonetaryAmount(self.0 + rhs.0)
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minor_units_to_decimal(self))
    }
}

impl Serialize for MonetaryAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_minor_units_string())
    }
}

impl<'de> Deserialize<'de> for MonetaryAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let digits = String::deserialize(deserializer)?;
        Self::from_minor_units_str(&digits).map_err(serde::de::Error::custom)
    }
}
