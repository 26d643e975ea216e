//! The transaction processing pipeline.
//!
//! Order of checks, cheapest and least stateful first:
//!
//! 1. risk scoring over recent activity (fail-open on lookup errors)
//! 2. fraud heuristics over the recent window (fail-open likewise)
//! 3. role-based limit ceilings
//! 4. the atomic mutation itself, which re-validates amount, ownership,
//!    status, and funds under the commit loop
//! 5. best-effort audit and activity recording
//!
//! Screening rejections are audited before being returned; a failed audit
//! write never changes the outcome.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use ledgerguard_screen::{FraudScreen, FraudVerdict, LimitEnforcer, RiskInput, RiskScorer};
use ledgerguard_store::{Applied, ApplyRequest, AtomicMutator, AuditLog, TransactionLedger, WalletStore};
use ledgerguard_types::{
    ActivityContext, AmountPolicy, AuditAction, AuditEvent, AuditSeverity, EngineConfig,
    IdempotencyKey, LedgerGuardError, Result, RiskAssessment, Role, TransactionKind,
    TransactionRecord, UserId, WalletId,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// One transaction submission.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub wallet_id: WalletId,
    pub user_id: UserId,
    pub role: Role,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub metadata: HashMap<String, String>,
    pub idempotency_key: Option<IdempotencyKey>,
    pub context: ActivityContext,
}

impl ProcessRequest {
    #[must_use]
    pub fn new(
        wallet_id: WalletId,
        user_id: UserId,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Self {
        Self {
            wallet_id,
            user_id,
            role: Role::User,
            kind,
            amount,
            description: None,
            metadata: HashMap::new(),
            idempotency_key: None,
            context: ActivityContext::default(),
        }
    }
}

/// A committed submission plus the assessment it passed under.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub applied: Applied,
    pub assessment: RiskAssessment,
}

/// Runs submissions through screening and into the mutator.
pub struct TransactionProcessor {
    store: Arc<WalletStore>,
    ledger: Arc<TransactionLedger>,
    mutator: Arc<AtomicMutator>,
    audit: Arc<AuditLog>,
    risk: RiskScorer,
    fraud: FraudScreen,
    limits: LimitEnforcer,
    amounts: AmountPolicy,
    risk_lookback_hours: i64,
}

impl TransactionProcessor {
    #[must_use]
    pub fn new(
        store: Arc<WalletStore>,
        ledger: Arc<TransactionLedger>,
        mutator: Arc<AtomicMutator>,
        audit: Arc<AuditLog>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            mutator,
            audit,
            risk: RiskScorer::new(config.risk.clone()),
            fraud: FraudScreen::new(config.fraud.clone()),
            limits: LimitEnforcer::new(config.limits.clone()),
            amounts: config.amounts,
            risk_lookback_hours: config.risk.withdrawal_lookback_hours,
        }
    }

    /// Process one submission end to end.
    ///
    /// # Errors
    /// Any screening or mutation error; the wallet is untouched unless
    /// `Ok` is returned.
    pub fn process(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        self.process_inner(request, None)
    }

    /// The shared screening pipeline. The guard calls this after its own
    /// checks, passing the integrity token to embed in the record.
    pub(crate) fn process_inner(
        &self,
        request: &ProcessRequest,
        integrity_hash: Option<String>,
    ) -> Result<ProcessOutcome> {
        // Amount bounds come before any screen: an out-of-bounds amount is
        // a validation error, not a limit or risk outcome.
        if !self.amounts.accepts(request.amount) {
            let err = LedgerGuardError::InvalidAmount {
                amount: request.amount,
                min: self.amounts.min,
                max: self.amounts.max,
            };
            self.audit_rejection(
                request,
                AuditAction::TransactionRejected,
                AuditSeverity::Info,
                &err,
            );
            return Err(err);
        }

        let assessment = self.assess_risk(request);
        if self.risk.blocks(&assessment) {
            let err = LedgerGuardError::SecurityBlocked {
                score: assessment.score,
                flags: assessment.flags.clone(),
            };
            self.audit_rejection(request, AuditAction::SecurityBlock, AuditSeverity::High, &err);
            return Err(err);
        }

        if let FraudVerdict::Flagged { reason } = self.screen_fraud(request) {
            let err = LedgerGuardError::FraudBlocked { reason };
            self.audit_rejection(request, AuditAction::FraudBlock, AuditSeverity::High, &err);
            return Err(err);
        }

        if let Err(err) = self.check_limits(request) {
            self.audit_rejection(
                request,
                AuditAction::TransactionRejected,
                AuditSeverity::Medium,
                &err,
            );
            return Err(err);
        }

        self.commit(request, integrity_hash, assessment)
    }

    /// Role-limit check alone, without mutating anything.
    ///
    /// # Errors
    /// `LimitExceeded`, or `Internal` if history is unreadable.
    pub fn check_limits(&self, request: &ProcessRequest) -> Result<()> {
        let cutoff = Utc::now() - Duration::days(31);
        let history = self.ledger.user_records_since(request.user_id, cutoff)?;
        self.limits
            .check(request.role, request.kind, request.amount, &history)
    }

    /// Run the mutation and the post-commit bookkeeping.
    fn commit(
        &self,
        request: &ProcessRequest,
        integrity_hash: Option<String>,
        assessment: RiskAssessment,
    ) -> Result<ProcessOutcome> {
        let apply = ApplyRequest {
            wallet_id: request.wallet_id,
            user_id: request.user_id,
            kind: request.kind,
            amount: request.amount,
            description: request.description.clone(),
            metadata: request.metadata.clone(),
            idempotency_key: request.idempotency_key.clone(),
            integrity_hash,
        };

        match self.mutator.apply(&apply) {
            Ok(applied) => {
                self.store.record_activity(request.user_id, &request.context);
                self.audit.record(
                    AuditEvent::new(
                        AuditAction::TransactionCompleted,
                        AuditSeverity::Info,
                        Some(applied.record.id.to_string()),
                        Some(request.user_id),
                        format!("{} of {} applied", request.kind, request.amount),
                    )
                    .with_meta("wallet", request.wallet_id.to_string())
                    .with_meta("balance", applied.new_balance.to_string())
                    .with_meta("risk_score", assessment.score.to_string()),
                );
                info!(
                    wallet = %request.wallet_id,
                    txn = %applied.record.id,
                    kind = %request.kind,
                    "transaction completed"
                );
                Ok(ProcessOutcome { applied, assessment })
            }
            Err(err) => {
                self.audit_rejection(
                    request,
                    AuditAction::TransactionRejected,
                    AuditSeverity::Info,
                    &err,
                );
                Err(err)
            }
        }
    }

    /// Risk inputs come from the ledger and activity store; if the window
    /// lookup errors the assessment degrades to the flagged fallback
    /// instead of rejecting the request.
    fn assess_risk(&self, request: &ProcessRequest) -> RiskAssessment {
        let cutoff = Utc::now() - Duration::hours(self.risk_lookback_hours);
        let recent_withdrawals = match self.ledger.user_kind_count_since(
            request.user_id,
            TransactionKind::Withdrawal,
            cutoff,
        ) {
            Ok(count) => count,
            Err(err) => {
                warn!(user = %request.user_id, %err, "risk window lookup failed, failing open");
                return RiskAssessment::error_fallback();
            }
        };
        let activity = self.store.activity(request.user_id);

        self.risk.assess(&RiskInput {
            kind: request.kind,
            amount: request.amount,
            recent_withdrawals,
            activity: activity.as_ref(),
            context: &request.context,
        })
    }

    fn screen_fraud(&self, request: &ProcessRequest) -> FraudVerdict {
        let cutoff = Utc::now() - Duration::hours(self.fraud.window_hours());
        match self.ledger.user_records_since(request.user_id, cutoff) {
            Ok(window) => self.fraud.evaluate(request.amount, &window),
            Err(err) => {
                warn!(user = %request.user_id, %err, "fraud window lookup failed, failing open");
                FraudVerdict::Clear
            }
        }
    }

    pub(crate) fn audit_rejection(
        &self,
        request: &ProcessRequest,
        action: AuditAction,
        severity: AuditSeverity,
        err: &LedgerGuardError,
    ) {
        self.audit.record(
            AuditEvent::new(
                action,
                severity,
                Some(request.wallet_id.to_string()),
                Some(request.user_id),
                err.to_string(),
            )
            .with_meta("kind", request.kind.to_string())
            .with_meta("amount", request.amount.to_string()),
        );
    }

    /// Recent window of a user's completed records, for the guard's rate
    /// limit.
    pub(crate) fn user_window(
        &self,
        user_id: UserId,
        window: chrono::Duration,
    ) -> Result<Vec<TransactionRecord>> {
        self.ledger.user_records_since(user_id, Utc::now() - window)
    }

    pub(crate) fn store(&self) -> &Arc<WalletStore> {
        &self.store
    }

    pub(crate) fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }
}
