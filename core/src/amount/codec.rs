//! Conversion between MOB decimal strings and exact picoMOB integers.
//!
//! Parsing accepts `<integer>[.<fraction>]` with at most 12 fractional
//! digits and nothing else: no signs, no whitespace, no group separators.
//! Formatting always produces exactly 12 fractional digits and groups the
//! integer part with commas once it reaches four digits. Grouped strings
//! are for display only and do not parse.

use thiserror::Error;

use super::MonetaryAmount;
use crate::config::{
    CURRENCY_TICKER, DECIMAL_SEPARATOR, GROUP_SEPARATOR, MINOR_UNIT_DECIMALS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A string that is not a well-formed MOB amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The input could not be read as a non-negative decimal amount.
    #[error("invalid amount format {input:?}: {issue}")]
    InvalidAmountFormat {
        /// The rejected input, verbatim.
        input: String,
        /// What was wrong with it.
        issue: FormatIssue,
    },
}

impl AmountError {
    pub(crate) fn invalid(input: &str, issue: FormatIssue) -> Self {
        AmountError::InvalidAmountFormat {
            input: input.to_string(),
            issue,
        }
    }

    /// The specific problem with the input.
    pub fn issue(&self) -> FormatIssue {
        match self {
            AmountError::InvalidAmountFormat { issue, .. } => *issue,
        }
    }
}

/// Why an amount string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatIssue {
    /// Nothing to parse.
    #[error("empty input")]
    Empty,
    /// A character other than an ASCII digit or the decimal separator.
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    /// More than one decimal separator.
    #[error("more than one decimal separator")]
    MultipleSeparators,
    /// Only a separator, no digits on either side.
    #[error("no digits")]
    NoDigits,
    /// The fraction is finer than a picoMOB.
    #[error("{got} fractional digits, at most {max} allowed")]
    TooManyFractionDigits {
        /// Fractional digits supplied.
        got: usize,
        /// Fractional digits supported.
        max: usize,
    },
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a MOB decimal string into picoMOB.
///
/// The fraction is right-padded to 12 digits, the separator is dropped, and
/// the remaining digit string is read as an integer. Either side of the
/// separator may be empty (`".5"`, `"5."`) but not both.
///
/// ```
/// use mobwallet_core::amount::parse_decimal_to_minor_units;
///
/// let fee = parse_decimal_to_minor_units("0.010000000000").unwrap();
/// assert_eq!(fee.to_minor_units_string(), "10000000000");
/// ```
///
/// # Errors
///
/// [`AmountError::InvalidAmountFormat`] for anything that is not plain
/// digits with at most one separator, and for fractions longer than 12
/// digits. Excess precision is never truncated.
pub fn parse_decimal_to_minor_units(input: &str) -> Result<MonetaryAmount, AmountError> {
    if input.is_empty() {
        return Err(AmountError::invalid(input, FormatIssue::Empty));
    }
    if let Some(bad) = input
        .chars()
        .find(|c| !c.is_ascii_digit() && *c != DECIMAL_SEPARATOR)
    {
        return Err(AmountError::invalid(
            input,
            FormatIssue::UnexpectedCharacter(bad),
        ));
    }

    let (whole, fraction) = input.split_once(DECIMAL_SEPARATOR).unwrap_or((input, ""));
    if fraction.contains(DECIMAL_SEPARATOR) {
        return Err(AmountError::invalid(input, FormatIssue::MultipleSeparators));
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::invalid(input, FormatIssue::NoDigits));
    }
    if fraction.len() > MINOR_UNIT_DECIMALS {
        return Err(AmountError::invalid(
            input,
            FormatIssue::TooManyFractionDigits {
                got: fraction.len(),
                max: MINOR_UNIT_DECIMALS,
            },
        ));
    }

    let mut digits = String::with_capacity(whole.len() + MINOR_UNIT_DECIMALS);
    digits.push_str(if whole.is_empty() { "0" } else { whole });
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(MINOR_UNIT_DECIMALS - fraction.len()));

    MonetaryAmount::from_minor_units_str(&digits)
        .map_err(|_| AmountError::invalid(input, FormatIssue::NoDigits))
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Formats picoMOB as `<integer>.<12-digit fraction>`, grouping the integer
/// part with commas when it has four or more digits.
///
/// ```
/// use mobwallet_core::amount::{format_minor_units_to_decimal, MonetaryAmount};
///
/// let amount = MonetaryAmount::from(500u64);
/// assert_eq!(format_minor_units_to_decimal(&amount), "0.000000000500");
/// ```
pub fn format_minor_units_to_decimal(amount: &MonetaryAmount) -> String {
    let digits = amount.to_minor_units_string();
    let padded = format!("{:0>width$}", digits, width = MINOR_UNIT_DECIMALS + 1);
    let (whole, fraction) = padded.split_at(padded.len() - MINOR_UNIT_DECIMALS);
    format!("{}{}{}", group_digits(whole), DECIMAL_SEPARATOR, fraction)
}

/// [`format_minor_units_to_decimal`] followed by the currency ticker.
pub fn format_mob(amount: &MonetaryAmount) -> String {
    format!("{} {}", format_minor_units_to_decimal(amount), CURRENCY_TICKER)
}

fn group_digits(whole: &str) -> String {
    let len = whole.len();
    if len < 4 {
        return whole.to_string();
    }
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}
