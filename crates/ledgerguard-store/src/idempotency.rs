//! Submission idempotency registry — makes client retries safe.
//!
//! A caller that times out cannot know whether its mutation was applied. By
//! resubmitting with the same [`IdempotencyKey`], the mutator deduplicates
//! against this registry: an already-applied key returns the original
//! transaction id instead of applying the movement twice.
//!
//! The registry maintains a bounded FIFO-evicting map so memory usage stays
//! predictable in long-running processes.

use std::collections::{HashMap, VecDeque};

use ledgerguard_types::{IdempotencyKey, LedgerGuardError, Result, TransactionId, WalletId};

/// State of a claimed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimState {
    /// A mutation with this key is currently being applied.
    InFlight,
    /// The mutation committed as this transaction.
    Applied(TransactionId),
}

/// Bounded map of (wallet, key) → submission state with FIFO eviction.
pub struct IdempotencyRegistry {
    claims: HashMap<(WalletId, IdempotencyKey), ClaimState>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<(WalletId, IdempotencyKey)>,
    max_size: usize,
}

impl IdempotencyRegistry {
    /// Create a new registry with the given maximum size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "IdempotencyRegistry max_size must be > 0");
        Self {
            claims: HashMap::with_capacity(max_size.min(1024)),
            order: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Claim a key before applying the mutation.
    ///
    /// # Errors
    /// - `DuplicateSubmission` with the original transaction id if the key
    ///   was already applied;
    /// - `Contention` if another submission with the same key is currently
    ///   in flight (its outcome is not yet known).
    pub fn claim(&mut self, wallet_id: WalletId, key: &IdempotencyKey) -> Result<()> {
        let map_key = (wallet_id, key.clone());
        match self.claims.get(&map_key) {
            Some(ClaimState::Applied(original)) => Err(LedgerGuardError::DuplicateSubmission {
                original: *original,
            }),
            Some(ClaimState::InFlight) => Err(LedgerGuardError::Contention { attempts: 0 }),
            None => {
                // Evict oldest settled claims if at capacity.
                if self.claims.len() >= self.max_size {
                    if let Some(oldest) = self.order.pop_front() {
                        self.claims.remove(&oldest);
                    }
                }
                self.claims.insert(map_key.clone(), ClaimState::InFlight);
                self.order.push_back(map_key);
                Ok(())
            }
        }
    }

    /// Finalize a claim after the mutation committed.
    ///
    /// A claim that was FIFO-evicted while in flight stays evicted: writing
    /// it back would have no `order` slot and could never be evicted again,
    /// letting the map grow past `max_size` under churn.
    pub fn complete(&mut self, wallet_id: WalletId, key: &IdempotencyKey, txn: TransactionId) {
        if let Some(state) = self.claims.get_mut(&(wallet_id, key.clone())) {
            *state = ClaimState::Applied(txn);
        }
    }

    /// Release a claim after the mutation was rejected, so a corrected
    /// resubmission with the same key can proceed.
    pub fn release(&mut self, wallet_id: WalletId, key: &IdempotencyKey) {
        let map_key = (wallet_id, key.clone());
        if self.claims.get(&map_key) == Some(&ClaimState::InFlight) {
            self.claims.remove(&map_key);
            self.order.retain(|k| *k != map_key);
        }
    }

    /// The committed transaction id for a key, if it was applied.
    #[must_use]
    pub fn applied_as(&self, wallet_id: WalletId, key: &IdempotencyKey) -> Option<TransactionId> {
        match self.claims.get(&(wallet_id, key.clone())) {
            Some(ClaimState::Applied(id)) => Some(*id),
            _ => None,
        }
    }

    /// Number of tracked claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claims are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
