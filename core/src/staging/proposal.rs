//! Transaction proposals: the daemon's loose wire shape, the validated
//! domain type, and the figures the confirmation dialog shows.
//!
//! The daemon answers with a [`ProposalDraft`] whose fields may each be
//! missing. The state machine only ever stores a [`TransactionProposal`],
//! which cannot exist without all of its figures, and exposes it to the UI
//! as a [`StagedProposal`]. There is no half-populated middle ground.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::IntentKind;
use crate::amount::MonetaryAmount;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Opaque daemon handle for a built transaction. Passed back verbatim on
/// submission; never inspected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalToken(serde_json::Value);

impl ProposalToken {
    /// Wraps the daemon's raw proposal value.
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    /// The raw value, for handing back to the daemon.
    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Draft (wire shape)
// ---------------------------------------------------------------------------

/// A proposal as the daemon returns it. Any field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    /// Fee the transaction pays.
    #[serde(default)]
    pub fee: Option<MonetaryAmount>,
    /// Value the transaction moves.
    #[serde(default)]
    pub total_value: Option<MonetaryAmount>,
    /// Address receiving the value.
    #[serde(default)]
    pub receiver: Option<String>,
    /// The daemon's handle.
    #[serde(default)]
    pub token: Option<ProposalToken>,
}

impl ProposalDraft {
    /// A draft with every field present.
    pub fn complete(
        fee: impl Into<MonetaryAmount>,
        total_value: impl Into<MonetaryAmount>,
        receiver: impl Into<String>,
        token: ProposalToken,
    ) -> Self {
        Self {
            fee: Some(fee.into()),
            total_value: Some(total_value.into()),
            receiver: Some(receiver.into()),
            token: Some(token),
        }
    }

    /// Fills in the receiver when the daemon left it out. Gift proposals
    /// pay the redeeming account, which the daemon does not echo back.
    pub fn with_default_receiver(mut self, receiver: &str) -> Self {
        if self.receiver.is_none() {
            self.receiver = Some(receiver.to_string());
        }
        self
    }
}

/// A draft that is missing a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed proposal: missing {missing}")]
pub struct MalformedProposal {
    /// Name of the first missing field.
    pub missing: &'static str,
}

// ---------------------------------------------------------------------------
// TransactionProposal
// ---------------------------------------------------------------------------

/// A fully populated proposal awaiting confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProposal {
    fee: MonetaryAmount,
    total_value: MonetaryAmount,
    receiver: String,
    token: ProposalToken,
}

impl TransactionProposal {
    /// Fee the transaction pays.
    pub fn fee(&self) -> &MonetaryAmount {
        &self.fee
    }

    /// Value moving to the receiver. For gifts this is what the redeemer
    /// gets, which need not match anything the user typed.
    pub fn total_value(&self) -> &MonetaryAmount {
        &self.total_value
    }

    /// Address receiving `total_value`.
    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    /// The daemon's handle.
    pub fn token(&self) -> &ProposalToken {
        &self.token
    }

    /// `total_value + fee`.
    pub fn total_sent(&self) -> MonetaryAmount {
        &self.total_value + &self.fee
    }
}

impl TryFrom<ProposalDraft> for TransactionProposal {
    type Error = MalformedProposal;

    fn try_from(draft: ProposalDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            fee: draft.fee.ok_or(MalformedProposal { missing: "fee" })?,
            total_value: draft
                .total_value
                .ok_or(MalformedProposal { missing: "total_value" })?,
            receiver: draft
                .receiver
                .ok_or(MalformedProposal { missing: "receiver" })?,
            token: draft.token.ok_or(MalformedProposal { missing: "token" })?,
        })
    }
}

/// What the UI sees of the staged proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StagedProposal {
    /// Nothing staged.
    #[default]
    NoProposal,
    /// A proposal awaiting confirmation or being submitted.
    Proposal(TransactionProposal),
}

impl StagedProposal {
    /// The proposal, if one is staged.
    pub fn as_proposal(&self) -> Option<&TransactionProposal> {
        match self {
            StagedProposal::NoProposal => None,
            StagedProposal::Proposal(p) => Some(p),
        }
    }

    /// `true` when nothing is staged.
    pub fn is_empty(&self) -> bool {
        matches!(self, StagedProposal::NoProposal)
    }
}

// ---------------------------------------------------------------------------
// ConfirmationSummary
// ---------------------------------------------------------------------------

/// Figures for the "please check and confirm" dialog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSummary {
    /// Which flow the dialog belongs to.
    pub kind: IntentKind,
    /// Value moving to the receiver.
    pub total_value: MonetaryAmount,
    /// Network fee.
    pub fee: MonetaryAmount,
    /// `total_value + fee`.
    pub total_sent: MonetaryAmount,
    /// Receiver address hint.
    pub receiver: String,
    /// The account's balance the figures were computed from.
    pub balance: MonetaryAmount,
    /// Send only: balance left after `total_sent` leaves. `None` if the
    /// proposal exceeds the balance.
    pub remaining_balance: Option<MonetaryAmount>,
    /// Gift only: balance after `total_value` arrives.
    pub increased_balance: Option<MonetaryAmount>,
}

impl ConfirmationSummary {
    /// Computes the dialog figures for a staged proposal.
    pub fn new(kind: IntentKind, proposal: &TransactionProposal, balance: &MonetaryAmount) -> Self {
        let total_sent = proposal.total_sent();
        let (remaining_balance, increased_balance) = match kind {
            IntentKind::Send => (balance.checked_sub(&total_sent), None),
            IntentKind::Gift => (None, Some(balance + proposal.total_value())),
        };
        Self {
            kind,
            total_value: proposal.total_value().clone(),
            fee: proposal.fee().clone(),
            total_sent,
            receiver: proposal.receiver().to_string(),
            balance: balance.clone(),
            remaining_balance,
            increased_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pico(units: u64) -> MonetaryAmount {
        MonetaryAmount::from(units)
    }

    fn token() -> ProposalToken {
        ProposalToken::new(serde_json::json!({ "tx": "abc" }))
    }

    #[test]
    fn complete_draft_validates() {
        let draft = ProposalDraft::complete(10u64, 500u64, "addrA", token());
        let proposal = TransactionProposal::try_from(draft).unwrap();
        assert_eq!(proposal.fee(), &pico(10));
        assert_eq!(proposal.total_value(), &pico(500));
        assert_eq!(proposal.receiver(), "addrA");
        assert_eq!(proposal.total_sent(), pico(510));
    }

    #[test]
    fn any_missing_field_is_malformed() {
        let full = ProposalDraft::complete(10u64, 500u64, "addrA", token());

        let mut d = full.clone();
        d.fee = None;
        assert_eq!(TransactionProposal::try_from(d).unwrap_err().missing, "fee");

        let mut d = full.clone();
        d.total_value = None;
        assert_eq!(
            TransactionProposal::try_from(d).unwrap_err().missing,
            "total_value"
        );

        let mut d = full.clone();
        d.token = None;
        assert_eq!(TransactionProposal::try_from(d).unwrap_err().missing, "token");

        assert!(TransactionProposal::try_from(ProposalDraft::default()).is_err());
    }

    #[test]
    fn default_receiver_only_fills_gaps() {
        let mut draft = ProposalDraft::complete(1u64, 2u64, "theirs", token());
        draft = draft.with_default_receiver("mine");
        assert_eq!(draft.receiver.as_deref(), Some("theirs"));

        draft.receiver = None;
        draft = draft.with_default_receiver("mine");
        assert_eq!(draft.receiver.as_deref(), Some("mine"));
    }

    #[test]
    fn draft_deserializes_from_partial_json() {
        let draft: ProposalDraft =
            serde_json::from_value(serde_json::json!({ "fee": "10", "token": { "id": 1 } }))
                .unwrap();
        assert_eq!(draft.fee, Some(pico(10)));
        assert!(draft.total_value.is_none());
        assert!(draft.receiver.is_none());
    }

    #[test]
    fn send_summary_subtracts_total_sent() {
        let proposal =
            TransactionProposal::try_from(ProposalDraft::complete(10u64, 500u64, "addrA", token()))
                .unwrap();
        let summary = ConfirmationSummary::new(IntentKind::Send, &proposal, &pico(2_000));
        assert_eq!(summary.total_sent, pico(510));
        assert_eq!(summary.remaining_balance, Some(pico(1_490)));
        assert!(summary.increased_balance.is_none());

        let short = ConfirmationSummary::new(IntentKind::Send, &proposal, &pico(100));
        assert!(short.remaining_balance.is_none());
    }

    #[test]
    fn gift_summary_adds_total_value() {
        let proposal =
            TransactionProposal::try_from(ProposalDraft::complete(10u64, 500u64, "me", token()))
                .unwrap();
        let summary = ConfirmationSummary::new(IntentKind::Gift, &proposal, &pico(1_000));
        assert_eq!(summary.increased_balance, Some(pico(1_500)));
        assert!(summary.remaining_balance.is_none());
    }
}
