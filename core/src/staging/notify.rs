//! User-facing notifications and the wording the two flows use.

use serde::{Deserialize, Serialize};

use super::proposal::TransactionProposal;
use super::types::{FailureReason, IntentKind};
use crate::amount::format_minor_units_to_decimal;
use crate::config::CURRENCY_TICKER;

/// How a notification should be styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Neutral progress information.
    Info,
    /// The intent settled.
    Success,
    /// The user backed out.
    Warning,
    /// The intent failed.
    Error,
}

/// Fire-and-forget notification sink (a snackbar, a toast, a terminal).
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user.
    fn notify(&self, message: &str, severity: Severity);
}

// ---------------------------------------------------------------------------
// Wording
// ---------------------------------------------------------------------------

/// Gift settled.
pub const GIFT_RECEIVED: &str = "Gift Received! Your balance will update shortly.";
/// Send canceled from the confirmation dialog.
pub const TRANSACTION_CANCELED: &str = "Transaction Canceled";
/// Gift canceled from the confirmation dialog.
pub const GIFT_CANCELED: &str = "Gift Canceled";
/// Gift submission hit an already-spent input.
pub const GIFT_ALREADY_CLAIMED: &str = "This gift has already been claimed!";
/// Send submission hit an already-spent input.
pub const FUNDS_ALREADY_SPENT: &str =
    "These funds have already been spent. Please rebuild the transaction.";
/// Daemon built no payment proposal.
pub const COULD_NOT_BUILD: &str = "Could not build transaction.";
/// Daemon found no gift for the code.
pub const GIFT_NOT_FOUND: &str = "Could not find gift with code.";

/// Success text for a settled intent.
pub fn settled_message(kind: IntentKind, proposal: &TransactionProposal) -> String {
    match kind {
        IntentKind::Send => format!(
            "Successfully sent {} {}!",
            format_minor_units_to_decimal(proposal.total_value()),
            CURRENCY_TICKER
        ),
        IntentKind::Gift => GIFT_RECEIVED.to_string(),
    }
}

/// Warning text for a canceled intent.
pub fn canceled_message(kind: IntentKind) -> &'static str {
    match kind {
        IntentKind::Send => TRANSACTION_CANCELED,
        IntentKind::Gift => GIFT_CANCELED,
    }
}

/// Sanitized error text for a failed intent. The raw daemon message only
/// appears for [`FailureReason::TransportFailure`].
pub fn failure_message(kind: IntentKind, reason: &FailureReason) -> String {
    match (reason, kind) {
        (FailureReason::AlreadyClaimedOrSpent, IntentKind::Gift) => GIFT_ALREADY_CLAIMED.to_string(),
        (FailureReason::AlreadyClaimedOrSpent, IntentKind::Send) => FUNDS_ALREADY_SPENT.to_string(),
        (FailureReason::ProposalUnavailable, IntentKind::Send) => COULD_NOT_BUILD.to_string(),
        (FailureReason::ProposalUnavailable, IntentKind::Gift) => GIFT_NOT_FOUND.to_string(),
        (FailureReason::TransportFailure(msg), _) => msg.clone(),
    }
}
