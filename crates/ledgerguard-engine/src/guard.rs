//! The transaction guard — the hardened submission path.
//!
//! Layered checks in escalating severity, each audited when it fires:
//!
//! 1. ownership (High) — the caller must be the wallet's recorded owner
//! 2. sliding-window rate limit (Medium)
//! 3. suspicious activity (High) — amount above the step-up ceiling, or a
//!    location fingerprint that contradicts recent recorded activity
//! 4. integrity (Critical) — a keyed MAC is generated, self-verified, and
//!    embedded in the committed record
//!
//! A request that clears the guard still runs the full screening pipeline
//! (risk, fraud, limits) before the mutation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use ledgerguard_types::{
    AuditAction, AuditSeverity, GuardConfig, LedgerGuardError, Result, TransactionRecord,
};
use tracing::warn;

use crate::integrity::IntegritySigner;
use crate::processor::{ProcessOutcome, ProcessRequest, TransactionProcessor};

/// Metadata key under which the guard stores the MAC input timestamp.
pub const INTEGRITY_TS_KEY: &str = "integrity_ts";

/// Guards the submission path with ownership, rate, suspicion, and
/// integrity checks.
pub struct TransactionGuard {
    processor: Arc<TransactionProcessor>,
    signer: IntegritySigner,
    config: GuardConfig,
}

impl TransactionGuard {
    #[must_use]
    pub fn new(processor: Arc<TransactionProcessor>, config: GuardConfig) -> Self {
        let signer = IntegritySigner::new(config.secret.clone());
        Self {
            processor,
            signer,
            config,
        }
    }

    /// Run the guarded pipeline end to end.
    ///
    /// # Errors
    /// `Unauthorized`, `RateLimitExceeded`, `SuspiciousActivity`,
    /// `IntegrityFailure`, or anything the screening pipeline and mutation
    /// can raise.
    pub fn verify_and_process(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        self.check_ownership(request)?;
        self.check_rate_limit(request)?;
        self.check_suspicious_activity(request)?;

        let timestamp_ms = Utc::now().timestamp_millis();
        let token = self.signer.generate(
            request.wallet_id,
            request.user_id,
            request.amount,
            timestamp_ms,
        )?;
        // Self-check before committing anything with the token attached.
        if let Err(err) = self.signer.verify(
            request.wallet_id,
            request.user_id,
            request.amount,
            timestamp_ms,
            &token,
        ) {
            warn!(wallet = %request.wallet_id, "integrity self-check failed");
            self.processor.audit_rejection(
                request,
                AuditAction::IntegrityFailure,
                AuditSeverity::Critical,
                &err,
            );
            return Err(err);
        }

        let mut guarded = request.clone();
        guarded
            .metadata
            .insert(INTEGRITY_TS_KEY.to_string(), timestamp_ms.to_string());
        self.processor.process_inner(&guarded, Some(token))
    }

    /// Re-verify the embedded MAC of a committed record.
    ///
    /// # Errors
    /// `IntegrityFailure` if the record carries no token, the MAC input
    /// timestamp is missing, or the tag does not match the record's fields.
    pub fn verify_record(&self, record: &TransactionRecord) -> Result<()> {
        let token = record
            .integrity_hash
            .as_deref()
            .ok_or(LedgerGuardError::IntegrityFailure)?;
        let timestamp_ms: i64 = record
            .metadata
            .get(INTEGRITY_TS_KEY)
            .and_then(|ts| ts.parse().ok())
            .ok_or(LedgerGuardError::IntegrityFailure)?;
        self.signer.verify(
            record.wallet_id,
            record.user_id,
            record.amount,
            timestamp_ms,
            token,
        )
    }

    fn check_ownership(&self, request: &ProcessRequest) -> Result<()> {
        let wallet = self.processor.store().get(request.wallet_id)?;
        if wallet.user_id != request.user_id {
            let err = LedgerGuardError::Unauthorized;
            self.processor.audit_rejection(
                request,
                AuditAction::OwnershipViolation,
                AuditSeverity::High,
                &err,
            );
            return Err(err);
        }
        Ok(())
    }

    fn check_rate_limit(&self, request: &ProcessRequest) -> Result<()> {
        let window = Duration::seconds(i64::try_from(self.config.rate_window_secs).unwrap_or(i64::MAX));
        let recent = self.processor.user_window(request.user_id, window)?;
        if recent.len() >= self.config.rate_cap {
            let err = LedgerGuardError::RateLimitExceeded {
                count: recent.len(),
                window_secs: self.config.rate_window_secs,
            };
            self.processor.audit_rejection(
                request,
                AuditAction::RateLimitExceeded,
                AuditSeverity::Medium,
                &err,
            );
            return Err(err);
        }
        Ok(())
    }

    fn check_suspicious_activity(&self, request: &ProcessRequest) -> Result<()> {
        if request.amount > self.config.suspicious_amount_ceiling {
            let err = LedgerGuardError::SuspiciousActivity {
                reason: format!(
                    "amount {} exceeds the verification ceiling {}",
                    request.amount, self.config.suspicious_amount_ceiling
                ),
            };
            self.processor.audit_rejection(
                request,
                AuditAction::SuspiciousAmount,
                AuditSeverity::High,
                &err,
            );
            return Err(err);
        }

        if let Some(activity) = self.processor.store().activity(request.user_id) {
            if let (Some(recorded), Some(supplied)) =
                (activity.last_location.as_deref(), request.context.location.as_deref())
            {
                if recorded != supplied {
                    let err = LedgerGuardError::SuspiciousActivity {
                        reason: format!(
                            "location {supplied} does not match recent activity in {recorded}"
                        ),
                    };
                    self.processor.audit_rejection(
                        request,
                        AuditAction::LocationMismatch,
                        AuditSeverity::High,
                        &err,
                    );
                    return Err(err);
                }
            }
        }

        Ok(())
    }
}
