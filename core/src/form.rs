//! Field-level validation for the send and gift forms.
//!
//! Forms hold exactly what the user typed. `validate` either produces an
//! intent ready for [`TransactionStager::request`](crate::staging::TransactionStager::request)
//! or a [`FormErrors`] with one message per offending field, worded the way
//! the wallet shows them under each input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::Accounts;
use crate::amount::{parse_decimal_to_minor_units, validate_spend, MonetaryAmount};
use crate::config::DEFAULT_FEE;
use crate::staging::{GiftIntent, SendIntent};

pub const RECIPIENT_REQUIRED: &str = "A Public Address is required to send MOB.";
pub const AMOUNT_REQUIRED: &str = "A positive, non-zero amount is required to send MOB.";
pub const RESERVE_FEE: &str = "Please reserve 0.01 MOB for transaction fee.";
pub const INVALID_FEE: &str = "Invalid fee amount.";
pub const GIFT_CODE_REQUIRED: &str = "You need a valid gift code to open a gift.";
pub const UNKNOWN_SENDER: &str = "Select an account to send from.";

/// Per-field error text. At least one field is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<String>,
    pub fee: Option<String>,
    pub code: Option<String>,
}

impl FormErrors {
    fn is_empty(&self) -> bool {
        self.messages().next().is_none()
    }

    /// Messages in display order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        [
            &self.sender,
            &self.recipient,
            &self.amount,
            &self.fee,
            &self.code,
        ]
        .into_iter()
        .filter_map(|m| m.as_deref())
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.messages() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

// ---------------------------------------------------------------------------
// Send
// ---------------------------------------------------------------------------

/// The send form's raw inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendForm {
    /// Address of the paying account. Empty selects the primary account.
    pub sender: String,
    /// Amount in MOB, e.g. `"1.5"`.
    pub amount: String,
    /// Fee in MOB.
    pub fee: String,
    /// Recipient public address.
    pub recipient: String,
}

impl Default for SendForm {
    fn default() -> Self {
        Self {
            sender: String::new(),
            amount: String::new(),
            fee: DEFAULT_FEE.to_string(),
            recipient: String::new(),
        }
    }
}

impl SendForm {
    /// A form with the default fee.
    pub fn new(amount: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            recipient: recipient.into(),
            ..Self::default()
        }
    }

    /// Picks the paying account.
    pub fn from_account(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Overrides the fee.
    pub fn with_fee(mut self, fee: impl Into<String>) -> Self {
        self.fee = fee.into();
        self
    }

    /// Checks every field and builds the intent.
    pub fn validate(&self, accounts: &Accounts) -> Result<SendIntent, FormErrors> {
        let mut errors = FormErrors::default();

        let account = if self.sender.trim().is_empty() {
            Some(accounts.primary())
        } else {
            accounts.find(self.sender.trim())
        };
        if account.is_none() {
            errors.sender = Some(UNKNOWN_SENDER.to_string());
        }

        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            errors.recipient = Some(RECIPIENT_REQUIRED.to_string());
        }

        let amount = match parse_decimal_to_minor_units(self.amount.trim()) {
            Ok(amount) if !amount.is_zero() => Some(amount),
            _ => {
                errors.amount = Some(AMOUNT_REQUIRED.to_string());
                None
            }
        };

        let fee = match parse_decimal_to_minor_units(self.fee.trim()) {
            Ok(fee) => Some(fee),
            Err(_) => {
                errors.fee = Some(INVALID_FEE.to_string());
                None
            }
        };

        if let (Some(account), Some(amount), Some(fee)) = (account, &amount, &fee) {
            if validate_spend(amount, fee, &account.balance).is_err() {
                errors.amount = Some(RESERVE_FEE.to_string());
            }
        }

        match (account, amount, fee) {
            (Some(account), Some(amount), Some(fee)) if errors.is_empty() => Ok(SendIntent::new(
                account.address.clone(),
                amount,
                fee,
                recipient,
            )),
            _ => Err(errors),
        }
    }
}

/// The largest amount the account can send after reserving `fee`, or zero.
pub fn max_sendable(balance: &MonetaryAmount, fee: &MonetaryAmount) -> MonetaryAmount {
    balance.checked_sub(fee).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Gift
// ---------------------------------------------------------------------------

/// The gift form's raw inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftForm {
    /// Account receiving the gift. Empty selects the primary account.
    pub redeemer: String,
    /// Gift code as pasted.
    pub code: String,
}

impl GiftForm {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            redeemer: String::new(),
            code: code.into(),
        }
    }

    pub fn validate(&self, accounts: &Accounts) -> Result<GiftIntent, FormErrors> {
        let mut errors = FormErrors::default();

        let account = if self.redeemer.trim().is_empty() {
            Some(accounts.primary())
        } else {
            accounts.find(self.redeemer.trim())
        };
        if account.is_none() {
            errors.sender = Some(UNKNOWN_SENDER.to_string());
        }

        let code = self.code.trim();
        if code.is_empty() {
            errors.code = Some(GIFT_CODE_REQUIRED.to_string());
        }

        match account {
            Some(account) if errors.is_empty() => {
                Ok(GiftIntent::new(account.address.clone(), code))
            }
            _ => Err(errors),
        }
    }
}
