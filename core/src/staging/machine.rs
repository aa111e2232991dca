//! The staging state machine.
//!
//! One [`TransactionStager`] serves one surface (the send form or the gift
//! form) and carries at most one intent at a time. State lives behind a
//! mutex that is never held across an `.await`, so the UI can read
//! [`state()`](TransactionStager::state) while a daemon call is pending, and
//! any action issued during that window is refused by the state checks
//! rather than queued.
//!
//! Every transition that resumes after a daemon call first checks the
//! surface's [`MountedRef`]. If the surface is gone the result is dropped on
//! the floor: no state write, no notification.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::error::{Action, StagingError};
use super::notify::{canceled_message, failure_message, settled_message, Notifier, Severity};
use super::proposal::{ConfirmationSummary, StagedProposal, TransactionProposal};
use super::provider::{classify_submit_error, ProposalProvider};
use super::types::{FailureReason, Intent, IntentId, IntentKind, Outcome, StagingState};
use crate::account::Accounts;
use crate::amount::validate_spend;
use crate::guard::MountedRef;
use crate::ledger::LedgerStatus;

// ---------------------------------------------------------------------------
// Internal stage
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Pending {
    id: IntentId,
    intent: Intent,
}

#[derive(Clone, Debug)]
struct Staged {
    id: IntentId,
    intent: Intent,
    proposal: TransactionProposal,
}

/// [`StagingState`] plus the data each state owns. The proposal only exists
/// inside `Confirming` and `Submitting`.
#[derive(Debug)]
enum Stage {
    Idle,
    AwaitingProposal(Pending),
    Confirming(Staged),
    Submitting(Staged),
    Settled,
    Failed(FailureReason),
}

impl Stage {
    fn state(&self) -> StagingState {
        match self {
            Stage::Idle => StagingState::Idle,
            Stage::AwaitingProposal(_) => StagingState::AwaitingProposal,
            Stage::Confirming(_) => StagingState::Confirming,
            Stage::Submitting(_) => StagingState::Submitting,
            Stage::Settled => StagingState::Settled,
            Stage::Failed(reason) => StagingState::Failed(reason.clone()),
        }
    }

    fn staged(&self) -> Option<&Staged> {
        match self {
            Stage::Confirming(s) | Stage::Submitting(s) => Some(s),
            _ => None,
        }
    }

    fn intent(&self) -> Option<&Intent> {
        match self {
            Stage::AwaitingProposal(p) => Some(&p.intent),
            Stage::Confirming(s) | Stage::Submitting(s) => Some(&s.intent),
            _ => None,
        }
    }
}

struct Inner {
    stage: Stage,
    accounts: Accounts,
    ledger: LedgerStatus,
    submit_error: Option<String>,
}

impl Inner {
    fn set_stage(&mut self, next: Stage) {
        debug!(from = %self.stage.state(), to = %next.state(), "staging transition");
        self.stage = next;
    }

    /// Local checks that must pass before the daemon is contacted.
    fn check_intent(&self, intent: &Intent) -> Result<(), StagingError> {
        match intent {
            Intent::Send(send) => {
                if send.recipient.trim().is_empty() {
                    return Err(StagingError::EmptyRecipient);
                }
                if send.amount.is_zero() {
                    return Err(StagingError::NonPositiveAmount);
                }
                if !self.ledger.is_synced() {
                    return Err(StagingError::NotSynced);
                }
                let account = self
                    .accounts
                    .find(&send.sender)
                    .ok_or_else(|| StagingError::UnknownAccount(send.sender.clone()))?;
                validate_spend(&send.amount, &send.fee, &account.balance)?;
            }
            Intent::ConsumeGift(gift) => {
                if gift.code.trim().is_empty() {
                    return Err(StagingError::EmptyGiftCode);
                }
                if self.accounts.find(&gift.redeemer).is_none() {
                    return Err(StagingError::UnknownAccount(gift.redeemer.clone()));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TransactionStager
// ---------------------------------------------------------------------------

/// Owns the lifecycle of one pending transaction intent.
pub struct TransactionStager {
    provider: Arc<dyn ProposalProvider>,
    notifier: Arc<dyn Notifier>,
    mounted: MountedRef,
    inner: Mutex<Inner>,
}

impl TransactionStager {
    /// Creates an idle stager for the surface behind `mounted`.
    pub fn new(
        provider: Arc<dyn ProposalProvider>,
        notifier: Arc<dyn Notifier>,
        mounted: MountedRef,
        accounts: Accounts,
        ledger: LedgerStatus,
    ) -> Self {
        Self {
            provider,
            notifier,
            mounted,
            inner: Mutex::new(Inner {
                stage: Stage::Idle,
                accounts,
                ledger,
                submit_error: None,
            }),
        }
    }

    /// Starts a new intent and asks the daemon for a proposal.
    ///
    /// Accepted from `Idle`, `Settled`, or `Failed`. Local problems
    /// (insufficient funds, unsynced wallet, empty fields) are returned as
    /// errors before anything is sent to the daemon. Daemon problems are
    /// never errors: they land the intent in `Failed` and notify once.
    pub async fn request(&self, intent: impl Into<Intent>) -> Result<Outcome, StagingError> {
        let intent = intent.into();
        if !self.mounted.is_mounted() {
            return Err(StagingError::Detached);
        }

        let id = {
            let mut inner = self.inner.lock();
            let state = inner.stage.state();
            if !state.accepts_request() {
                return Err(StagingError::InvalidTransition {
                    state,
                    action: Action::Request,
                });
            }
            inner.check_intent(&intent)?;

            let id = IntentId::generate();
            inner.submit_error = None;
            inner.set_stage(Stage::AwaitingProposal(Pending {
                id,
                intent: intent.clone(),
            }));
            id
        };
        info!(intent_id = %id, kind = %intent.kind(), "requesting proposal");

        let reply = match &intent {
            Intent::Send(send) => {
                self.provider
                    .build_transaction(&send.amount, &send.fee, &send.recipient)
                    .await
            }
            Intent::ConsumeGift(gift) => self
                .provider
                .open_gift_code(&gift.code)
                .await
                .map(|draft| draft.map(|d| d.with_default_receiver(&gift.redeemer))),
        };

        if !self.mounted.is_mounted() {
            warn!(intent_id = %id, "surface torn down while awaiting proposal, dropping result");
            return Ok(Outcome::Suppressed);
        }

        let proposal = match reply {
            Ok(Some(draft)) => TransactionProposal::try_from(draft).map_err(|e| {
                warn!(intent_id = %id, error = %e, "daemon returned a malformed proposal");
                FailureReason::ProposalUnavailable
            }),
            Ok(None) => Err(FailureReason::ProposalUnavailable),
            Err(e) => Err(FailureReason::TransportFailure(e.message().to_string())),
        };

        match proposal {
            Ok(proposal) => {
                info!(
                    intent_id = %id,
                    total_value = %proposal.total_value(),
                    fee = %proposal.fee(),
                    "proposal staged for confirmation"
                );
                self.inner
                    .lock()
                    .set_stage(Stage::Confirming(Staged { id, intent, proposal }));
                Ok(Outcome::Applied(StagingState::Confirming))
            }
            Err(reason) => Ok(self.fail(id, intent.kind(), reason)),
        }
    }

    /// Submits the staged proposal. Only valid in `Confirming`.
    ///
    /// Once this returns past the state check the submission cannot be
    /// abandoned locally; callers must drive the future to completion.
    ///
    /// The mount check and the move to `Submitting` happen under one lock.
    /// A caller that unmounts and then reads [`state()`](Self::state) either
    /// sees `Submitting` or can rely on no submission being started.
    pub async fn confirm(&self) -> Result<Outcome, StagingError> {
        let staged = {
            let mut inner = self.inner.lock();
            if !self.mounted.is_mounted() {
                return Err(StagingError::Detached);
            }
            let staged = match &inner.stage {
                Stage::Confirming(staged) => staged.clone(),
                other => {
                    return Err(StagingError::InvalidTransition {
                        state: other.state(),
                        action: Action::Confirm,
                    })
                }
            };
            inner.set_stage(Stage::Submitting(staged.clone()));
            staged
        };
        info!(intent_id = %staged.id, total_value = %staged.proposal.total_value(), "submitting");

        let result = self.provider.submit_transaction(&staged.proposal).await;

        if !self.mounted.is_mounted() {
            warn!(intent_id = %staged.id, "surface torn down during submission, dropping result");
            return Ok(Outcome::Suppressed);
        }

        let kind = staged.intent.kind();
        match result {
            Ok(()) => {
                {
                    let mut inner = self.inner.lock();
                    inner.submit_error = None;
                    inner.set_stage(Stage::Settled);
                }
                info!(intent_id = %staged.id, "intent settled");
                self.notifier
                    .notify(&settled_message(kind, &staged.proposal), Severity::Success);
                Ok(Outcome::Applied(StagingState::Settled))
            }
            Err(e) => {
                warn!(intent_id = %staged.id, error = %e, "submission failed");
                Ok(self.fail(staged.id, kind, classify_submit_error(&e)))
            }
        }
    }

    /// Discards the staged proposal and returns to `Idle`. Only valid in
    /// `Confirming`; a submission in flight cannot be canceled.
    pub fn cancel(&self) -> Result<(), StagingError> {
        if !self.mounted.is_mounted() {
            return Err(StagingError::Detached);
        }

        let staged = {
            let mut inner = self.inner.lock();
            let staged = match &inner.stage {
                Stage::Confirming(staged) => staged.clone(),
                other => {
                    return Err(StagingError::InvalidTransition {
                        state: other.state(),
                        action: Action::Cancel,
                    })
                }
            };
            inner.set_stage(Stage::Idle);
            staged
        };
        info!(intent_id = %staged.id, "intent canceled");
        self.notifier
            .notify(canceled_message(staged.intent.kind()), Severity::Warning);
        Ok(())
    }

    fn fail(&self, id: IntentId, kind: IntentKind, reason: FailureReason) -> Outcome {
        let message = failure_message(kind, &reason);
        {
            let mut inner = self.inner.lock();
            inner.submit_error = Some(message.clone());
            inner.set_stage(Stage::Failed(reason.clone()));
        }
        warn!(intent_id = %id, %reason, "intent failed");
        self.notifier.notify(&message, Severity::Error);
        Outcome::Applied(StagingState::Failed(reason))
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Current state.
    pub fn state(&self) -> StagingState {
        self.inner.lock().stage.state()
    }

    /// The staged proposal, present in `Confirming` and `Submitting`.
    pub fn proposal(&self) -> StagedProposal {
        match self.inner.lock().stage.staged() {
            Some(staged) => StagedProposal::Proposal(staged.proposal.clone()),
            None => StagedProposal::NoProposal,
        }
    }

    /// The intent in flight, if any.
    pub fn intent(&self) -> Option<Intent> {
        self.inner.lock().stage.intent().cloned()
    }

    /// Confirmation dialog figures against the acting account's current
    /// balance. `None` without a staged proposal.
    pub fn confirmation_summary(&self) -> Option<ConfirmationSummary> {
        let inner = self.inner.lock();
        let staged = inner.stage.staged()?;
        let account = inner.accounts.find(staged.intent.account())?;
        Some(ConfirmationSummary::new(
            staged.intent.kind(),
            &staged.proposal,
            &account.balance,
        ))
    }

    /// Form-level error text of the last failed intent. Cleared by the
    /// next `request()` and on settlement.
    pub fn submit_error(&self) -> Option<String> {
        self.inner.lock().submit_error.clone()
    }

    /// Snapshot of the session's accounts.
    pub fn accounts(&self) -> Accounts {
        self.inner.lock().accounts.clone()
    }

    /// Swaps in a new account snapshot (e.g. after a balance update).
    pub fn replace_accounts(&self, accounts: Accounts) {
        self.inner.lock().accounts = accounts;
    }

    /// Records a new ledger sync status.
    pub fn set_ledger_status(&self, ledger: LedgerStatus) {
        self.inner.lock().ledger = ledger;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::account::Account;
    use crate::amount::MonetaryAmount;
    use crate::guard::MountGuard;
    use crate::staging::notify::{COULD_NOT_BUILD, GIFT_ALREADY_CLAIMED, TRANSACTION_CANCELED};
    use crate::staging::proposal::{ProposalDraft, ProposalToken};
    use crate::staging::provider::ProviderError;
    use crate::staging::types::{GiftIntent, SendIntent};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    type Reply = Result<Option<ProposalDraft>, ProviderError>;

    #[derive(Default)]
    struct ScriptedProvider {
        proposals: Mutex<VecDeque<Reply>>,
        submissions: Mutex<VecDeque<Result<(), ProviderError>>>,
        build_calls: Mutex<Vec<(MonetaryAmount, MonetaryAmount, String)>>,
        gift_calls: Mutex<Vec<String>>,
        submit_calls: Mutex<usize>,
        /// Dropped inside the next proposal call, simulating teardown.
        teardown: Mutex<Option<MountGuard>>,
        /// Awaited inside the next proposal call.
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        /// Dropped inside the next submission.
        submit_teardown: Mutex<Option<MountGuard>>,
    }

    impl ScriptedProvider {
        fn with_proposal(reply: Reply) -> Self {
            let p = Self::default();
            p.proposals.lock().push_back(reply);
            p
        }

        fn then_submit(self, result: Result<(), ProviderError>) -> Self {
            self.submissions.lock().push_back(result);
            self
        }

        async fn next_proposal(&self) -> Reply {
            let gate = self.gate.lock().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            drop(self.teardown.lock().take());
            self.proposals
                .lock()
                .pop_front()
                .unwrap_or(Err(ProviderError::new("no scripted proposal")))
        }
    }

    #[async_trait]
    impl ProposalProvider for ScriptedProvider {
        async fn build_transaction(
            &self,
            amount: &MonetaryAmount,
            fee: &MonetaryAmount,
            recipient: &str,
        ) -> Reply {
            self.build_calls
                .lock()
                .push((amount.clone(), fee.clone(), recipient.to_string()));
            self.next_proposal().await
        }

        async fn open_gift_code(&self, code: &str) -> Reply {
            self.gift_calls.lock().push(code.to_string());
            self.next_proposal().await
        }

        async fn submit_transaction(&self, _proposal: &TransactionProposal) -> Result<(), ProviderError> {
            *self.submit_calls.lock() += 1;
            drop(self.submit_teardown.lock().take());
            self.submissions
                .lock()
                .pop_front()
                .unwrap_or(Err(ProviderError::new("no scripted submission")))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<(String, Severity)>>,
    }

    impl RecordingNotifier {
        fn seen(&self) -> Vec<(String, Severity)> {
            self.seen.lock().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, severity: Severity) {
            self.seen.lock().push((message.to_string(), severity));
        }
    }

    struct Harness {
        stager: TransactionStager,
        provider: Arc<ScriptedProvider>,
        notifier: Arc<RecordingNotifier>,
        _guard: Option<MountGuard>,
    }

    const ME: &str = "addrMe";

    fn proposal_draft(fee: u64, total: u64, receiver: &str) -> ProposalDraft {
        ProposalDraft::complete(
            fee,
            total,
            receiver,
            ProposalToken::new(serde_json::json!({ "tx_proposal": "opaque" })),
        )
    }

    fn harness_with_balance(provider: ScriptedProvider, balance: u64) -> Harness {
        let guard = MountGuard::new();
        let provider = Arc::new(provider);
        let notifier = Arc::new(RecordingNotifier::default());
        let accounts = Accounts::single(Account::new(
            ME,
            Some("main".into()),
            MonetaryAmount::from(balance),
        ));
        let stager = TransactionStager::new(
            provider.clone(),
            notifier.clone(),
            guard.handle(),
            accounts,
            LedgerStatus::new(100, 101),
        );
        Harness {
            stager,
            provider,
            notifier,
            _guard: Some(guard),
        }
    }

    fn harness(provider: ScriptedProvider) -> Harness {
        harness_with_balance(provider, 10_000)
    }

    fn send(amount: u64, fee: u64, to: &str) -> SendIntent {
        SendIntent::new(ME, amount, fee, to)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn happy_path_send_settles_once() {
        let h = harness(
            ScriptedProvider::with_proposal(Ok(Some(proposal_draft(10, 500, "addrA"))))
                .then_submit(Ok(())),
        );

        let outcome = h.stager.request(send(500, 10, "addrA")).await.unwrap();
        assert_eq!(outcome, Outcome::Applied(StagingState::Confirming));
        assert_eq!(h.stager.state(), StagingState::Confirming);

        let staged = h.stager.proposal();
        let proposal = staged.as_proposal().unwrap();
        assert_eq!(proposal.fee(), &MonetaryAmount::from(10u64));
        assert_eq!(proposal.total_value(), &MonetaryAmount::from(500u64));

        let outcome = h.stager.confirm().await.unwrap();
        assert_eq!(outcome, Outcome::Applied(StagingState::Settled));
        assert_eq!(h.stager.state(), StagingState::Settled);
        assert!(h.stager.proposal().is_empty());

        assert_eq!(
            h.notifier.seen(),
            vec![(
                "Successfully sent 0.000000000500 MOB!".to_string(),
                Severity::Success
            )]
        );
        assert_eq!(*h.provider.submit_calls.lock(), 1);
        assert_eq!(
            h.provider.build_calls.lock()[0],
            (
                MonetaryAmount::from(500u64),
                MonetaryAmount::from(10u64),
                "addrA".to_string()
            )
        );
    }

    #[tokio::test]
    async fn confirm_in_idle_is_rejected() {
        let h = harness(ScriptedProvider::default());
        let err = h.stager.confirm().await.unwrap_err();
        assert_eq!(
            err,
            StagingError::InvalidTransition {
                state: StagingState::Idle,
                action: Action::Confirm,
            }
        );
        assert_eq!(h.stager.state(), StagingState::Idle);
        assert!(h.notifier.seen().is_empty());
        assert_eq!(*h.provider.submit_calls.lock(), 0);
    }

    #[tokio::test]
    async fn cancel_clears_the_proposal() {
        let h = harness(ScriptedProvider::with_proposal(Ok(Some(proposal_draft(
            10, 500, "addrA",
        )))));

        h.stager.request(send(500, 10, "addrA")).await.unwrap();
        h.stager.cancel().unwrap();

        assert_eq!(h.stager.state(), StagingState::Idle);
        assert_eq!(h.stager.proposal(), StagedProposal::NoProposal);
        assert!(matches!(
            h.stager.confirm().await,
            Err(StagingError::InvalidTransition { .. })
        ));
        assert_eq!(
            h.notifier.seen(),
            vec![(TRANSACTION_CANCELED.to_string(), Severity::Warning)]
        );
        assert_eq!(*h.provider.submit_calls.lock(), 0);
    }

    #[tokio::test]
    async fn insufficient_funds_blocks_before_the_daemon() {
        let h = harness_with_balance(ScriptedProvider::default(), 1_009);

        let err = h.stager.request(send(1_000, 10, "addrA")).await.unwrap_err();
        assert!(matches!(err, StagingError::InsufficientFunds(_)));
        assert_eq!(h.stager.state(), StagingState::Idle);
        assert!(h.provider.build_calls.lock().is_empty());
        assert!(h.notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn unsynced_wallet_cannot_send() {
        let h = harness(ScriptedProvider::default());
        h.stager.set_ledger_status(LedgerStatus::new(100, 50));

        let err = h.stager.request(send(1, 1, "addrA")).await.unwrap_err();
        assert_eq!(err, StagingError::NotSynced);
        assert!(h.provider.build_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn local_field_checks() {
        let h = harness(ScriptedProvider::default());
        assert_eq!(
            h.stager.request(send(1, 1, "  ")).await.unwrap_err(),
            StagingError::EmptyRecipient
        );
        assert_eq!(
            h.stager.request(send(0, 1, "addrA")).await.unwrap_err(),
            StagingError::NonPositiveAmount
        );
        assert_eq!(
            h.stager
                .request(SendIntent::new("stranger", 1u64, 1u64, "addrA"))
                .await
                .unwrap_err(),
            StagingError::UnknownAccount("stranger".into())
        );
        assert_eq!(
            h.stager.request(GiftIntent::new(ME, "")).await.unwrap_err(),
            StagingError::EmptyGiftCode
        );
    }

    #[tokio::test]
    async fn build_failure_lands_in_failed_with_raw_message() {
        let h = harness(ScriptedProvider::with_proposal(Err(ProviderError::new(
            "invalid public address",
        ))));

        let outcome = h.stager.request(send(500, 10, "bogus")).await.unwrap();
        let reason = FailureReason::TransportFailure("invalid public address".into());
        assert_eq!(outcome, Outcome::Applied(StagingState::Failed(reason)));
        assert!(h.stager.proposal().is_empty());
        assert_eq!(h.stager.submit_error().as_deref(), Some("invalid public address"));
        assert_eq!(
            h.notifier.seen(),
            vec![("invalid public address".to_string(), Severity::Error)]
        );
    }

    #[tokio::test]
    async fn absent_or_malformed_proposal_is_unavailable() {
        let mut partial = proposal_draft(10, 500, "addrA");
        partial.fee = None;
        let provider = ScriptedProvider::with_proposal(Ok(None));
        provider.proposals.lock().push_back(Ok(Some(partial)));
        let h = harness(provider);

        for _ in 0..2 {
            let outcome = h.stager.request(send(500, 10, "addrA")).await.unwrap();
            assert_eq!(
                outcome,
                Outcome::Applied(StagingState::Failed(FailureReason::ProposalUnavailable))
            );
            assert!(h.stager.proposal().is_empty());
        }
        assert_eq!(
            h.notifier.seen(),
            vec![
                (COULD_NOT_BUILD.to_string(), Severity::Error),
                (COULD_NOT_BUILD.to_string(), Severity::Error),
            ]
        );
    }

    #[tokio::test]
    async fn double_spend_is_distinguished() {
        let h = harness(
            ScriptedProvider::with_proposal(Ok(Some(proposal_draft(10, 500, ME))))
                .then_submit(Err(ProviderError::new(
                    "rpc error: Transaction rejected: ContainsSpentKeyImage",
                ))),
        );

        h.stager.request(GiftIntent::new(ME, "giftcode")).await.unwrap();
        let outcome = h.stager.confirm().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Applied(StagingState::Failed(FailureReason::AlreadyClaimedOrSpent))
        );
        assert_eq!(
            h.notifier.seen(),
            vec![(GIFT_ALREADY_CLAIMED.to_string(), Severity::Error)]
        );
        assert_eq!(h.stager.submit_error().as_deref(), Some(GIFT_ALREADY_CLAIMED));
    }

    #[tokio::test]
    async fn teardown_during_await_suppresses_everything() {
        let provider = ScriptedProvider::with_proposal(Ok(Some(proposal_draft(10, 500, "addrA"))));
        let mut h = harness(provider);
        *h.provider.teardown.lock() = h._guard.take();

        let outcome = h.stager.request(send(500, 10, "addrA")).await.unwrap();
        assert_eq!(outcome, Outcome::Suppressed);
        assert_eq!(h.stager.state(), StagingState::AwaitingProposal);
        assert!(h.stager.proposal().is_empty());
        assert!(h.notifier.seen().is_empty());

        assert_eq!(h.stager.confirm().await.unwrap_err(), StagingError::Detached);
    }

    #[tokio::test]
    async fn teardown_during_submission_suppresses_the_result() {
        let spent = Err(ProviderError::new("Transaction rejected: ContainsSpentKeyImage"));
        for result in [Ok(()), spent] {
            let provider = ScriptedProvider::with_proposal(Ok(Some(proposal_draft(10, 500, "addrA"))))
                .then_submit(result);
            let mut h = harness(provider);
            h.stager.request(send(500, 10, "addrA")).await.unwrap();
            *h.provider.submit_teardown.lock() = h._guard.take();

            let outcome = h.stager.confirm().await.unwrap();
            assert_eq!(outcome, Outcome::Suppressed);
            assert_eq!(h.stager.state(), StagingState::Submitting);
            assert!(h.stager.submit_error().is_none());
            assert!(h.notifier.seen().is_empty());
            assert_eq!(*h.provider.submit_calls.lock(), 1);
        }
    }

    #[tokio::test]
    async fn confirm_after_teardown_never_submits() {
        let mut h = harness(ScriptedProvider::with_proposal(Ok(Some(proposal_draft(
            10, 500, "addrA",
        )))));
        h.stager.request(send(500, 10, "addrA")).await.unwrap();
        drop(h._guard.take());

        assert_eq!(h.stager.confirm().await.unwrap_err(), StagingError::Detached);
        assert_eq!(h.stager.state(), StagingState::Confirming);
        assert_eq!(*h.provider.submit_calls.lock(), 0);
        assert!(h.notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn actions_during_await_are_rejected() {
        let (release, gate) = oneshot::channel();
        let provider = ScriptedProvider::with_proposal(Ok(Some(proposal_draft(10, 500, "addrA"))));
        *provider.gate.lock() = Some(gate);
        let h = harness(provider);

        let observer = async {
            assert_eq!(h.stager.state(), StagingState::AwaitingProposal);
            assert!(matches!(
                h.stager.confirm().await,
                Err(StagingError::InvalidTransition {
                    state: StagingState::AwaitingProposal,
                    action: Action::Confirm,
                })
            ));
            assert!(h.stager.cancel().is_err());
            assert!(matches!(
                h.stager.request(send(1, 1, "addrB")).await,
                Err(StagingError::InvalidTransition {
                    action: Action::Request,
                    ..
                })
            ));
            release.send(()).unwrap();
        };

        let (outcome, ()) = tokio::join!(h.stager.request(send(500, 10, "addrA")), observer);
        assert_eq!(outcome.unwrap(), Outcome::Applied(StagingState::Confirming));
        assert_eq!(h.provider.build_calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn terminal_states_accept_a_fresh_request() {
        let provider = ScriptedProvider::with_proposal(Ok(None));
        provider
            .proposals
            .lock()
            .push_back(Ok(Some(proposal_draft(10, 500, "addrA"))));
        let h = harness(provider);

        h.stager.request(send(500, 10, "addrA")).await.unwrap();
        assert!(h.stager.state().is_terminal());
        assert!(h.stager.submit_error().is_some());

        let outcome = h.stager.request(send(500, 10, "addrA")).await.unwrap();
        assert_eq!(outcome, Outcome::Applied(StagingState::Confirming));
        assert!(h.stager.submit_error().is_none());
    }

    #[tokio::test]
    async fn gift_proposal_pays_the_redeemer() {
        let mut draft = proposal_draft(10, 2_000, "ignored");
        draft.receiver = None;
        let h = harness_with_balance(
            ScriptedProvider::with_proposal(Ok(Some(draft))).then_submit(Ok(())),
            1_000,
        );

        h.stager.request(GiftIntent::new(ME, "giftcode")).await.unwrap();
        assert_eq!(*h.provider.gift_calls.lock(), vec!["giftcode".to_string()]);

        let summary = h.stager.confirmation_summary().unwrap();
        assert_eq!(summary.kind, IntentKind::Gift);
        assert_eq!(summary.receiver, ME);
        assert_eq!(summary.increased_balance, Some(MonetaryAmount::from(3_000u64)));

        h.stager.confirm().await.unwrap();
        assert_eq!(h.notifier.seen().len(), 1);
        assert_eq!(h.notifier.seen()[0].1, Severity::Success);
    }

    #[tokio::test]
    async fn summary_tracks_replaced_accounts() {
        let h = harness(ScriptedProvider::with_proposal(Ok(Some(proposal_draft(
            10, 500, "addrA",
        )))));
        h.stager.request(send(500, 10, "addrA")).await.unwrap();

        let summary = h.stager.confirmation_summary().unwrap();
        assert_eq!(summary.remaining_balance, Some(MonetaryAmount::from(9_490u64)));

        h.stager.replace_accounts(Accounts::single(Account::new(
            ME,
            None,
            MonetaryAmount::from(600u64),
        )));
        let summary = h.stager.confirmation_summary().unwrap();
        assert_eq!(summary.remaining_balance, Some(MonetaryAmount::from(90u64)));
    }
}
