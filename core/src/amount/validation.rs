//! Affordability check for a spend plus its fee.

use thiserror::Error;

use super::MonetaryAmount;

/// The account cannot cover the spend plus fee.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient funds: required {required} MOB, available {available} MOB")]
pub struct InsufficientFunds {
    /// `candidate + fee`.
    pub required: MonetaryAmount,
    /// The balance the spend was checked against.
    pub available: MonetaryAmount,
}

/// Succeeds iff `candidate + fee <= available`.
///
/// Pure and exact: the sum is computed in arbitrary precision, so there is
/// no overflow to reason about.
pub fn validate_spend(
    candidate: &MonetaryAmount,
    fee: &MonetaryAmount,
    available: &MonetaryAmount,
) -> Result<(), InsufficientFunds> {
    let required = candidate + fee;
    if &required > available {
        return Err(InsufficientFunds {
            required,
            available: available.clone(),
        });
    }
    Ok(())
}
