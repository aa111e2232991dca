//! Local rejections returned by the staging state machine.
//!
//! None of these involve the daemon. Daemon failures never surface as a
//! `StagingError`; they become [`StagingState::Failed`] instead.

use std::fmt;

use thiserror::Error;

use super::types::StagingState;
use crate::amount::InsufficientFunds;

/// The user action a rejected transition was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `request()`
    Request,
    /// `confirm()`
    Confirm,
    /// `cancel()`
    Cancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Request => write!(f, "request"),
            Action::Confirm => write!(f, "confirm"),
            Action::Cancel => write!(f, "cancel"),
        }
    }
}

/// Why a transition was refused. The state is unchanged and no
/// notification was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    /// The action is not valid in the current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// State at the time of the call.
        state: StagingState,
        /// What was attempted.
        action: Action,
    },

    /// Amount plus fee exceeds the sender's balance.
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),

    /// Sends must move a positive amount.
    #[error("a positive, non-zero amount is required")]
    NonPositiveAmount,

    /// Sends are refused until the wallet catches up with the ledger.
    #[error("wallet is not synced with the ledger")]
    NotSynced,

    /// Sends need a recipient.
    #[error("recipient address is required")]
    EmptyRecipient,

    /// Gifts need a code.
    #[error("gift code is required")]
    EmptyGiftCode,

    /// The intent names an account that is not in the session.
    #[error("unknown account {0}")]
    UnknownAccount(String),

    /// The owning surface is gone; nothing may be staged on its behalf.
    #[error("owning surface has been torn down")]
    Detached,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_state_and_action() {
        let err = StagingError::InvalidTransition {
            state: StagingState::Idle,
            action: Action::Confirm,
        };
        assert_eq!(err.to_string(), "cannot confirm while idle");
    }
}
