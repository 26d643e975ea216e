//! The atomic mutator — the only write path for balances.
//!
//! Every money movement is one optimistically-concurrent transaction:
//! read a wallet snapshot, recompute the balance, build the immutable
//! record, then conditionally write back against the snapshot version.
//! A detected concurrent commit retries the whole cycle as an explicit
//! bounded loop with exponential backoff; exhaustion surfaces
//! [`LedgerGuardError::Contention`], distinct from any business-rule
//! failure.
//!
//! Guarantees: all-or-nothing — balance and ledger record land together or
//! not at all — and per-wallet serialization: a second concurrent writer
//! always observes the first writer's committed balance before computing
//! its own. The ledger append follows the balance commit, so a reader
//! racing a writer can briefly see the new balance before its record;
//! balance equals the signed ledger sum once in-flight mutations settle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use ledgerguard_types::{
    AmountPolicy, IdempotencyKey, LedgerGuardError, Result, RetryConfig, TransactionId,
    TransactionKind, TransactionRecord, TransactionStatus, UserId, WalletId,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::idempotency::IdempotencyRegistry;
use crate::ledger::TransactionLedger;
use crate::store::WalletStore;

/// A requested balance mutation.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub wallet_id: WalletId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub metadata: HashMap<String, String>,
    pub idempotency_key: Option<IdempotencyKey>,
    /// Integrity tag supplied by the guard path, embedded into the record.
    pub integrity_hash: Option<String>,
}

/// The result of a committed mutation.
#[derive(Debug, Clone)]
pub struct Applied {
    pub new_balance: Decimal,
    pub record: TransactionRecord,
}

/// Applies validated mutations against the wallet store and ledger.
pub struct AtomicMutator {
    store: Arc<WalletStore>,
    ledger: Arc<TransactionLedger>,
    idempotency: Mutex<IdempotencyRegistry>,
    amounts: AmountPolicy,
    retry: RetryConfig,
}

impl AtomicMutator {
    #[must_use]
    pub fn new(
        store: Arc<WalletStore>,
        ledger: Arc<TransactionLedger>,
        amounts: AmountPolicy,
        retry: RetryConfig,
        idempotency_cache_size: usize,
    ) -> Self {
        Self {
            store,
            ledger,
            idempotency: Mutex::new(IdempotencyRegistry::new(idempotency_cache_size)),
            amounts,
            retry,
        }
    }

    /// Apply a mutation: validate, recompute, append, and conditionally
    /// commit — retried on contention up to the configured ceiling.
    ///
    /// # Errors
    /// `WalletNotFound`, `Unauthorized`, `WalletInactive`, `InvalidAmount`,
    /// `InsufficientFunds`, `DuplicateSubmission`, `Contention`.
    pub fn apply(&self, request: &ApplyRequest) -> Result<Applied> {
        if let Some(key) = &request.idempotency_key {
            self.idempotency
                .lock()
                .expect("idempotency lock poisoned")
                .claim(request.wallet_id, key)?;
        }

        let outcome = self.apply_inner(request);

        if let Some(key) = &request.idempotency_key {
            let mut registry = self.idempotency.lock().expect("idempotency lock poisoned");
            match &outcome {
                Ok(applied) => registry.complete(request.wallet_id, key, applied.record.id),
                // A rejected mutation releases the key so a corrected
                // resubmission can reuse it.
                Err(_) => registry.release(request.wallet_id, key),
            }
        }

        outcome
    }

    fn apply_inner(&self, request: &ApplyRequest) -> Result<Applied> {
        if !self.amounts.accepts(request.amount) {
            return Err(LedgerGuardError::InvalidAmount {
                amount: request.amount,
                min: self.amounts.min,
                max: self.amounts.max,
            });
        }

        let transaction_id = TransactionId::new();

        for attempt in 1..=self.retry.max_attempts {
            let snapshot = self.store.get(request.wallet_id)?;

            if snapshot.user_id != request.user_id {
                return Err(LedgerGuardError::Unauthorized);
            }
            if !snapshot.is_active() {
                return Err(LedgerGuardError::WalletInactive {
                    status: snapshot.status.to_string(),
                });
            }

            let new_balance = if request.kind.is_debit() {
                if snapshot.balance < request.amount {
                    return Err(LedgerGuardError::InsufficientFunds {
                        needed: request.amount,
                        available: snapshot.balance,
                    });
                }
                snapshot.balance - request.amount
            } else {
                snapshot.balance + request.amount
            };

            let mut updated = snapshot.clone();
            updated.balance = new_balance;

            match self.store.compare_and_update(snapshot.version, updated) {
                Ok(committed) => {
                    let record = TransactionRecord {
                        id: transaction_id,
                        wallet_id: request.wallet_id,
                        user_id: request.user_id,
                        kind: request.kind,
                        amount: request.amount,
                        description: request.description.clone(),
                        metadata: request.metadata.clone(),
                        integrity_hash: request.integrity_hash.clone(),
                        status: TransactionStatus::Completed,
                        idempotency_key: request.idempotency_key.clone(),
                        created_at: Utc::now(),
                    };
                    self.ledger.append(record.clone());
                    debug!(
                        wallet = %request.wallet_id,
                        txn = %record.id,
                        kind = %request.kind,
                        balance = %committed.balance,
                        attempt,
                        "mutation committed"
                    );
                    return Ok(Applied {
                        new_balance: committed.balance,
                        record,
                    });
                }
                Err(LedgerGuardError::Contention { .. }) => {
                    debug!(
                        wallet = %request.wallet_id,
                        attempt,
                        "concurrent commit detected, retrying"
                    );
                    if attempt < self.retry.max_attempts {
                        let backoff = self.retry.backoff_base_ms << (attempt - 1);
                        std::thread::sleep(Duration::from_millis(backoff));
                    }
                }
                Err(other) => return Err(other),
            }
        }

        warn!(
            wallet = %request.wallet_id,
            attempts = self.retry.max_attempts,
            "optimistic commit retries exhausted"
        );
        Err(LedgerGuardError::Contention {
            attempts: self.retry.max_attempts,
        })
    }

    /// Access the ledger this mutator appends to.
    #[must_use]
    pub fn ledger(&self) -> &Arc<TransactionLedger> {
        &self.ledger
    }
}
