//! Append-only transaction ledger.
//!
//! Records are keyed by `(WalletId, TransactionId)` in a `BTreeMap`, so a
//! wallet's history is one contiguous key range and — because transaction
//! ids are UUIDv7 — already in creation order. Records are never edited or
//! removed; the wallet document holds only the current balance and version.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use ledgerguard_types::{
    LedgerGuardError, Result, TransactionFilter, TransactionId, TransactionKind,
    TransactionRecord, TransactionStatus, UserId, WalletId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Append-only ledger of transaction records.
pub struct TransactionLedger {
    /// Primary table, ordered by (wallet, time-ordered transaction id).
    records: RwLock<BTreeMap<(WalletId, TransactionId), TransactionRecord>>,
    /// Secondary index: records per user across all their wallets.
    by_user: RwLock<HashMap<UserId, Vec<(WalletId, TransactionId)>>>,
}

impl TransactionLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            by_user: RwLock::new(HashMap::new()),
        }
    }

    /// Append a record. Appending is unconditional — validation happened
    /// upstream in the mutator, and the ledger never rejects history.
    pub fn append(&self, record: TransactionRecord) {
        let key = (record.wallet_id, record.id);
        self.by_user
            .write()
            .expect("ledger index lock poisoned")
            .entry(record.user_id)
            .or_default()
            .push(key);
        self.records
            .write()
            .expect("ledger lock poisoned")
            .insert(key, record);
    }

    /// A wallet's full history, newest first. Finite, stably ordered:
    /// two reads with no intervening writes return identical sequences.
    #[must_use]
    pub fn wallet_history(&self, wallet_id: WalletId) -> Vec<TransactionRecord> {
        self.wallet_history_filtered(wallet_id, &TransactionFilter::default())
    }

    /// A wallet's history, newest first, restricted by `filter`.
    #[must_use]
    pub fn wallet_history_filtered(
        &self,
        wallet_id: WalletId,
        filter: &TransactionFilter,
    ) -> Vec<TransactionRecord> {
        let records = self.records.read().expect("ledger lock poisoned");
        let lo = (wallet_id, TransactionId(Uuid::nil()));
        let hi = (wallet_id, TransactionId(Uuid::max()));

        let iter = records
            .range(lo..=hi)
            .rev()
            .map(|(_, r)| r)
            .filter(|r| filter.kind.is_none_or(|k| r.kind == k))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.since.is_none_or(|cutoff| r.created_at >= cutoff))
            .cloned();

        match filter.limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    /// All of a user's completed records at or after `cutoff`, across
    /// wallets. Feeds the rolling-window checks (fraud velocity, limits,
    /// recent-withdrawal risk signal, guard rate limit).
    ///
    /// Fallible, unlike the wallet-history reads: the screens built on
    /// these windows fail open, so a broken lookup must be catchable
    /// rather than a panic.
    ///
    /// # Errors
    /// `Internal` if the ledger is unreadable.
    pub fn user_records_since(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TransactionRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerGuardError::Internal("ledger lock poisoned".to_string()))?;
        let index = self
            .by_user
            .read()
            .map_err(|_| LedgerGuardError::Internal("ledger index lock poisoned".to_string()))?;

        Ok(index
            .get(&user_id)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| records.get(key))
                    .filter(|r| r.status == TransactionStatus::Completed)
                    .filter(|r| r.created_at >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Count of a user's completed records of one kind since `cutoff`.
    ///
    /// # Errors
    /// `Internal` if the ledger is unreadable.
    pub fn user_kind_count_since(
        &self,
        user_id: UserId,
        kind: TransactionKind,
        cutoff: DateTime<Utc>,
    ) -> Result<usize> {
        Ok(self
            .user_records_since(user_id, cutoff)?
            .iter()
            .filter(|r| r.kind == kind)
            .count())
    }

    /// Signed sum of a wallet's completed records — the conservation check:
    /// this must always equal the wallet's stored balance.
    #[must_use]
    pub fn signed_sum(&self, wallet_id: WalletId) -> Decimal {
        let records = self.records.read().expect("ledger lock poisoned");
        let lo = (wallet_id, TransactionId(Uuid::nil()));
        let hi = (wallet_id, TransactionId(Uuid::max()));
        records
            .range(lo..=hi)
            .map(|(_, r)| r)
            .filter(|r| r.status == TransactionStatus::Completed)
            .map(TransactionRecord::signed_amount)
            .sum()
    }

    /// Total number of records in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().expect("ledger lock poisoned").len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Duration;

    use super::*;

    fn record(
        wallet_id: WalletId,
        user_id: UserId,
        kind: TransactionKind,
        amount: Decimal,
    ) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            wallet_id,
            user_id,
            kind,
            amount,
            description: None,
            metadata: HashMap::new(),
            integrity_hash: None,
            status: TransactionStatus::Completed,
            idempotency_key: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn history_is_newest_first() {
        let ledger = TransactionLedger::new();
        let wallet = WalletId::new();
        let user = UserId::new();

        let first = record(wallet, user, TransactionKind::Deposit, Decimal::new(10, 0));
        let second = record(wallet, user, TransactionKind::Deposit, Decimal::new(20, 0));
        ledger.append(first.clone());
        ledger.append(second.clone());

        let history = ledger.wallet_history(wallet);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }

    #[test]
    fn history_is_stable_across_reads() {
        let ledger = TransactionLedger::new();
        let wallet = WalletId::new();
        let user = UserId::new();
        for i in 1..=5 {
            ledger.append(record(
                wallet,
                user,
                TransactionKind::Deposit,
                Decimal::new(i, 0),
            ));
        }

        let a = ledger.wallet_history(wallet);
        let b = ledger.wallet_history(wallet);
        let ids_a: Vec<_> = a.iter().map(|r| r.id).collect();
        let ids_b: Vec<_> = b.iter().map(|r| r.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn history_isolated_per_wallet() {
        let ledger = TransactionLedger::new();
        let user = UserId::new();
        let w1 = WalletId::new();
        let w2 = WalletId::new();
        ledger.append(record(w1, user, TransactionKind::Deposit, Decimal::ONE));
        ledger.append(record(w2, user, TransactionKind::Deposit, Decimal::TWO));

        assert_eq!(ledger.wallet_history(w1).len(), 1);
        assert_eq!(ledger.wallet_history(w2).len(), 1);
        assert_eq!(ledger.wallet_history(w1)[0].amount, Decimal::ONE);
    }

    #[test]
    fn filter_by_kind_and_limit() {
        let ledger = TransactionLedger::new();
        let wallet = WalletId::new();
        let user = UserId::new();
        for _ in 0..3 {
            ledger.append(record(wallet, user, TransactionKind::Deposit, Decimal::TEN));
        }
        for _ in 0..2 {
            ledger.append(record(
                wallet,
                user,
                TransactionKind::Withdrawal,
                Decimal::ONE,
            ));
        }

        let filter = TransactionFilter {
            kind: Some(TransactionKind::Deposit),
            ..TransactionFilter::default()
        };
        assert_eq!(ledger.wallet_history_filtered(wallet, &filter).len(), 3);

        let filter = TransactionFilter {
            limit: Some(2),
            ..TransactionFilter::default()
        };
        assert_eq!(ledger.wallet_history_filtered(wallet, &filter).len(), 2);
    }

    #[test]
    fn signed_sum_matches_deposits_minus_debits() {
        let ledger = TransactionLedger::new();
        let wallet = WalletId::new();
        let user = UserId::new();
        ledger.append(record(
            wallet,
            user,
            TransactionKind::Deposit,
            Decimal::new(100, 0),
        ));
        ledger.append(record(
            wallet,
            user,
            TransactionKind::Withdrawal,
            Decimal::new(30, 0),
        ));
        ledger.append(record(
            wallet,
            user,
            TransactionKind::Transfer,
            Decimal::new(20, 0),
        ));

        assert_eq!(ledger.signed_sum(wallet), Decimal::new(50, 0));
    }

    #[test]
    fn failed_records_excluded_from_signed_sum() {
        let ledger = TransactionLedger::new();
        let wallet = WalletId::new();
        let user = UserId::new();
        ledger.append(record(
            wallet,
            user,
            TransactionKind::Deposit,
            Decimal::new(100, 0),
        ));
        let mut failed = record(wallet, user, TransactionKind::Deposit, Decimal::new(99, 0));
        failed.status = TransactionStatus::Failed;
        ledger.append(failed);

        assert_eq!(ledger.signed_sum(wallet), Decimal::new(100, 0));
    }

    #[test]
    fn user_window_queries_span_wallets() {
        let ledger = TransactionLedger::new();
        let user = UserId::new();
        let w1 = WalletId::new();
        let w2 = WalletId::new();
        ledger.append(record(w1, user, TransactionKind::Withdrawal, Decimal::TEN));
        ledger.append(record(w2, user, TransactionKind::Withdrawal, Decimal::TEN));
        ledger.append(record(w2, user, TransactionKind::Deposit, Decimal::TEN));

        let cutoff = Utc::now() - Duration::hours(24);
        assert_eq!(ledger.user_records_since(user, cutoff).unwrap().len(), 3);
        assert_eq!(
            ledger
                .user_kind_count_since(user, TransactionKind::Withdrawal, cutoff)
                .unwrap(),
            2
        );
    }

    #[test]
    fn window_cutoff_excludes_old_records() {
        let ledger = TransactionLedger::new();
        let user = UserId::new();
        let wallet = WalletId::new();
        let mut old = record(wallet, user, TransactionKind::Deposit, Decimal::ONE);
        old.created_at = Utc::now() - Duration::hours(48);
        ledger.append(old);
        ledger.append(record(wallet, user, TransactionKind::Deposit, Decimal::ONE));

        let cutoff = Utc::now() - Duration::hours(24);
        assert_eq!(ledger.user_records_since(user, cutoff).unwrap().len(), 1);
    }
}
