//! The daemon as the staging pipeline sees it.

use async_trait::async_trait;
use thiserror::Error;

use super::proposal::{ProposalDraft, TransactionProposal};
use super::types::FailureReason;
use crate::amount::MonetaryAmount;

/// A daemon-side failure, carrying the daemon's own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Wraps a daemon or transport error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The raw message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Builds, opens, and submits transactions. Implemented by the RPC client
/// in the binary and by scripted fakes in tests.
#[async_trait]
pub trait ProposalProvider: Send + Sync {
    /// Asks the daemon to build a payment. `Ok(None)` means the daemon
    /// answered without a proposal.
    async fn build_transaction(
        &self,
        amount: &MonetaryAmount,
        fee: &MonetaryAmount,
        recipient: &str,
    ) -> Result<Option<ProposalDraft>, ProviderError>;

    /// Asks the daemon to open a gift code. `Ok(None)` means no gift with
    /// that code exists.
    async fn open_gift_code(&self, code: &str) -> Result<Option<ProposalDraft>, ProviderError>;

    /// Submits a confirmed proposal to the network.
    async fn submit_transaction(&self, proposal: &TransactionProposal) -> Result<(), ProviderError>;
}

/// The validation error the daemon reports when a transaction spends an
/// input the ledger already consumed, as it appears inside the full message
/// (`... TransactionValidation(ContainsSpentKeyImage) ...`). Matched
/// case-sensitively as a whole token; free-text phrases such as
/// "already spent" are not treated as a double spend.
///
/// This is the one place that depends on daemon error wording. If the daemon
/// changes it, submissions degrade to [`FailureReason::TransportFailure`]
/// with the raw message.
pub const SPENT_KEY_IMAGE: &str = "ContainsSpentKeyImage";

/// Maps a `submit_transaction` failure to the reason stored in
/// [`StagingState::Failed`](super::StagingState::Failed).
pub fn classify_submit_error(err: &ProviderError) -> FailureReason {
    let is_spent_key_image = err
        .message()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == SPENT_KEY_IMAGE);
    if is_spent_key_image {
        FailureReason::AlreadyClaimedOrSpent
    } else {
        FailureReason::TransportFailure(err.message().to_string())
    }
}
