//! Value types shared by the staging state machine and its callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amount::MonetaryAmount;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// Identifier for one user transaction intent. Fresh per `request()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentId(Uuid);

impl IntentId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payment the user filled in on the send form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendIntent {
    /// Address of the account paying.
    pub sender: String,
    /// Amount to send, in picoMOB.
    pub amount: MonetaryAmount,
    /// Fee the user agreed to, in picoMOB.
    pub fee: MonetaryAmount,
    /// Recipient public address.
    pub recipient: String,
}

impl SendIntent {
    /// Creates a send intent.
    pub fn new(
        sender: impl Into<String>,
        amount: impl Into<MonetaryAmount>,
        fee: impl Into<MonetaryAmount>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            amount: amount.into(),
            fee: fee.into(),
            recipient: recipient.into(),
        }
    }
}

/// A gift code the user wants to redeem into one of their accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftIntent {
    /// Address of the account receiving the gift.
    pub redeemer: String,
    /// The b58 gift code.
    pub code: String,
}

impl GiftIntent {
    /// Creates a gift intent.
    pub fn new(redeemer: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            redeemer: redeemer.into(),
            code: code.into(),
        }
    }
}

/// What the user asked the wallet to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Pay someone.
    Send(SendIntent),
    /// Claim a gift code.
    ConsumeGift(GiftIntent),
}

impl Intent {
    /// Which flow this intent belongs to.
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Send(_) => IntentKind::Send,
            Intent::ConsumeGift(_) => IntentKind::Gift,
        }
    }

    /// The local account the intent acts on.
    pub fn account(&self) -> &str {
        match self {
            Intent::Send(send) => &send.sender,
            Intent::ConsumeGift(gift) => &gift.redeemer,
        }
    }
}

impl From<SendIntent> for Intent {
    fn from(intent: SendIntent) -> Self {
        Intent::Send(intent)
    }
}

impl From<GiftIntent> for Intent {
    fn from(intent: GiftIntent) -> Self {
        Intent::ConsumeGift(intent)
    }
}

/// The two flows that share the staging pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    /// Send payment.
    Send,
    /// Consume gift code.
    Gift,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentKind::Send => write!(f, "send"),
            IntentKind::Gift => write!(f, "gift"),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Why an intent ended in [`StagingState::Failed`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The daemon returned no proposal, or one missing confirmation figures.
    ProposalUnavailable,
    /// Submission referenced an input that is already spent: the gift was
    /// claimed by someone else, or the proposal went stale.
    AlreadyClaimedOrSpent,
    /// Any other daemon or transport error, verbatim.
    TransportFailure(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ProposalUnavailable => write!(f, "proposal unavailable"),
            FailureReason::AlreadyClaimedOrSpent => write!(f, "already claimed or spent"),
            FailureReason::TransportFailure(msg) => write!(f, "transport failure: {}", msg),
        }
    }
}

/// Observable lifecycle of the current intent.
///
/// ```text
/// Idle ──request──▶ AwaitingProposal ──ok──▶ Confirming ──confirm──▶ Submitting ──ok──▶ Settled
///                          │                     │                       │
///                          └──err──▶ Failed ◀────┼───────────err─────────┘
///                                                └──cancel──▶ Idle
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagingState {
    /// No intent in flight.
    Idle,
    /// Waiting on `build_transaction` / `open_gift_code`.
    AwaitingProposal,
    /// A proposal is staged; the user must confirm or cancel.
    Confirming,
    /// Waiting on `submit_transaction`. Cannot be canceled.
    Submitting,
    /// Submitted successfully. Terminal.
    Settled,
    /// Ended in failure. Terminal.
    Failed(FailureReason),
}

impl StagingState {
    /// `true` for [`Settled`](Self::Settled) and [`Failed`](Self::Failed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StagingState::Settled | StagingState::Failed(_))
    }

    /// Whether a new `request()` is accepted from this state.
    pub fn accepts_request(&self) -> bool {
        matches!(self, StagingState::Idle) || self.is_terminal()
    }
}

impl fmt::Display for StagingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingState::Idle => write!(f, "idle"),
            StagingState::AwaitingProposal => write!(f, "awaiting proposal"),
            StagingState::Confirming => write!(f, "confirming"),
            StagingState::Submitting => write!(f, "submitting"),
            StagingState::Settled => write!(f, "settled"),
            StagingState::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Result of a transition that crossed a suspension point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The transition was applied; this is the new state.
    Applied(StagingState),
    /// The owning surface was torn down while the provider call was
    /// pending. Nothing was written and nobody was notified.
    Suppressed,
}
