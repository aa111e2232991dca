//! # Staging Module
//!
//! Drives a user's send or gift intent from request to settlement:
//!
//! 1. **Request**: local checks, then the daemon builds a proposal
//! 2. **Confirm**: the user reviews the proposal figures
//! 3. **Submit**: the confirmed proposal goes to the network
//!
//! ```text
//! types.rs     intents, states, failure reasons
//! proposal.rs  daemon drafts, validated proposals, dialog figures
//! provider.rs  the daemon seam and submit-error classification
//! notify.rs    notification sink and wording
//! error.rs     local rejections
//! machine.rs   TransactionStager
//! ```

pub mod error;
pub mod machine;
pub mod notify;
pub mod proposal;
pub mod provider;
pub mod types;

pub use error::{Action, StagingError};
pub use machine::TransactionStager;
pub use notify::{Notifier, Severity};
pub use proposal::{
    ConfirmationSummary, MalformedProposal, ProposalDraft, ProposalToken, StagedProposal,
    TransactionProposal,
};
pub use provider::{classify_submit_error, ProposalProvider, ProviderError};
pub use types::{
    FailureReason, GiftIntent, Intent, IntentId, IntentKind, Outcome, SendIntent, StagingState,
};
