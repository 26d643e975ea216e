//! Wallet store — the versioned document primitive.
//!
//! The store is the source of truth for wallet state. Writes go through
//! [`WalletStore::compare_and_update`], a single-attempt conditional write:
//! the commit succeeds only if the stored version still equals the snapshot
//! the caller read. The bounded retry loop around it lives in the mutator —
//! no component outside this plane writes balances directly.
//!
//! Lock scopes are short and never held across anything that could wait.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use ledgerguard_types::{
    ActivityContext, BankAccountRef, Currency, LedgerGuardError, Result, UserActivity, UserId,
    Wallet, WalletId, WalletStatus,
};

/// Thread-safe store of wallet documents with optimistic concurrency.
pub struct WalletStore {
    /// Wallet documents by id.
    wallets: RwLock<HashMap<WalletId, Wallet>>,
    /// Uniqueness index: one wallet per (user, currency).
    by_user_currency: RwLock<HashMap<(UserId, Currency), WalletId>>,
    /// Last recorded login fingerprints per user.
    activity: RwLock<HashMap<UserId, UserActivity>>,
}

impl WalletStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wallets: RwLock::new(HashMap::new()),
            by_user_currency: RwLock::new(HashMap::new()),
            activity: RwLock::new(HashMap::new()),
        }
    }

    /// Create a wallet for a (user, currency) pair.
    ///
    /// The first wallet a user creates becomes their primary wallet.
    ///
    /// # Errors
    /// Returns `DuplicateWallet` if the user already has a wallet in this
    /// currency.
    pub fn create_wallet(
        &self,
        user_id: UserId,
        currency: impl Into<Currency>,
        country: impl Into<String>,
    ) -> Result<Wallet> {
        let currency = currency.into();
        let mut wallets = self.wallets.write().expect("wallet lock poisoned");
        let mut index = self
            .by_user_currency
            .write()
            .expect("wallet index lock poisoned");

        if index.contains_key(&(user_id, currency.clone())) {
            return Err(LedgerGuardError::DuplicateWallet { currency });
        }

        let mut wallet = Wallet::new(user_id, currency.clone(), country);
        // First wallet for this user becomes primary.
        let has_existing = index.keys().any(|(uid, _)| *uid == user_id);
        wallet.is_primary = !has_existing;

        index.insert((user_id, currency), wallet.id);
        wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    /// Read a snapshot of a wallet. The snapshot carries the version that
    /// a subsequent [`Self::compare_and_update`] must match.
    pub fn get(&self, wallet_id: WalletId) -> Result<Wallet> {
        self.wallets
            .read()
            .expect("wallet lock poisoned")
            .get(&wallet_id)
            .cloned()
            .ok_or(LedgerGuardError::WalletNotFound(wallet_id))
    }

    /// Look up a user's wallet in a given currency.
    ///
    /// The index guard is released before the wallet map is read; writers
    /// take `wallets` before `by_user_currency`, so holding both here in
    /// the opposite order could deadlock.
    #[must_use]
    pub fn find_by_currency(&self, user_id: UserId, currency: &str) -> Option<Wallet> {
        let id = {
            let index = self
                .by_user_currency
                .read()
                .expect("wallet index lock poisoned");
            index.get(&(user_id, currency.to_string())).copied()
        }?;
        self.wallets
            .read()
            .expect("wallet lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Conditionally commit an updated wallet document.
    ///
    /// The write succeeds only if the stored version still equals
    /// `expected_version` (the version of the snapshot the update was
    /// computed from). On success the version is bumped and `updated_at`
    /// refreshed.
    ///
    /// # Errors
    /// - `WalletNotFound` if the wallet vanished;
    /// - `Contention` if another writer committed since the snapshot.
    pub fn compare_and_update(&self, expected_version: u64, updated: Wallet) -> Result<Wallet> {
        let mut wallets = self.wallets.write().expect("wallet lock poisoned");
        let current = wallets
            .get_mut(&updated.id)
            .ok_or(LedgerGuardError::WalletNotFound(updated.id))?;

        if current.version != expected_version {
            return Err(LedgerGuardError::Contention { attempts: 1 });
        }

        let mut committed = updated;
        committed.version = expected_version + 1;
        committed.updated_at = Utc::now();
        *current = committed.clone();
        Ok(committed)
    }

    /// Change a wallet's status (block / close / reactivate).
    pub fn set_status(&self, wallet_id: WalletId, status: WalletStatus) -> Result<Wallet> {
        let mut wallets = self.wallets.write().expect("wallet lock poisoned");
        let wallet = wallets
            .get_mut(&wallet_id)
            .ok_or(LedgerGuardError::WalletNotFound(wallet_id))?;
        wallet.status = status;
        wallet.version += 1;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    /// Attach a linked bank-account descriptor.
    pub fn link_bank_account(&self, wallet_id: WalletId, account: BankAccountRef) -> Result<Wallet> {
        let mut wallets = self.wallets.write().expect("wallet lock poisoned");
        let wallet = wallets
            .get_mut(&wallet_id)
            .ok_or(LedgerGuardError::WalletNotFound(wallet_id))?;
        wallet.bank_account = Some(account);
        wallet.version += 1;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    /// Delete a wallet.
    ///
    /// # Errors
    /// - `Unauthorized` if the caller is not the owner;
    /// - `PrimaryWalletUndeletable` for primary wallets, independent of balance;
    /// - `WalletNotEmpty` while the balance is above zero.
    pub fn delete_wallet(&self, wallet_id: WalletId, user_id: UserId) -> Result<()> {
        let mut wallets = self.wallets.write().expect("wallet lock poisoned");
        let mut index = self
            .by_user_currency
            .write()
            .expect("wallet index lock poisoned");

        let wallet = wallets
            .get(&wallet_id)
            .ok_or(LedgerGuardError::WalletNotFound(wallet_id))?;

        if wallet.user_id != user_id {
            return Err(LedgerGuardError::Unauthorized);
        }
        if wallet.is_primary {
            return Err(LedgerGuardError::PrimaryWalletUndeletable);
        }
        if !wallet.balance.is_zero() {
            return Err(LedgerGuardError::WalletNotEmpty {
                balance: wallet.balance,
            });
        }

        index.remove(&(wallet.user_id, wallet.currency.clone()));
        wallets.remove(&wallet_id);
        Ok(())
    }

    /// All wallets owned by a user.
    #[must_use]
    pub fn user_wallets(&self, user_id: UserId) -> Vec<Wallet> {
        let wallets = self.wallets.read().expect("wallet lock poisoned");
        let mut owned: Vec<Wallet> = wallets
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|w| w.id);
        owned
    }

    /// Record the login fingerprints observed on a successful transaction.
    pub fn record_activity(&self, user_id: UserId, context: &ActivityContext) {
        let mut activity = self.activity.write().expect("activity lock poisoned");
        let entry = activity.entry(user_id).or_default();
        if context.location.is_some() {
            entry.last_location = context.location.clone();
        }
        if context.device.is_some() {
            entry.last_device = context.device.clone();
        }
        entry.last_transaction_at = Some(Utc::now());
    }

    /// The last recorded fingerprints for a user, if any.
    #[must_use]
    pub fn activity(&self, user_id: UserId) -> Option<UserActivity> {
        self.activity
            .read()
            .expect("activity lock poisoned")
            .get(&user_id)
            .cloned()
    }
}

impl Default for WalletStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn first_wallet_is_primary() {
        let store = WalletStore::new();
        let user = UserId::new();
        let w1 = store.create_wallet(user, "USD", "US").unwrap();
        let w2 = store.create_wallet(user, "EUR", "DE").unwrap();
        assert!(w1.is_primary);
        assert!(!w2.is_primary);
    }

    #[test]
    fn duplicate_currency_rejected() {
        let store = WalletStore::new();
        let user = UserId::new();
        store.create_wallet(user, "USD", "US").unwrap();
        let err = store.create_wallet(user, "USD", "US").unwrap_err();
        assert!(matches!(err, LedgerGuardError::DuplicateWallet { .. }));
    }

    #[test]
    fn same_currency_different_users_ok() {
        let store = WalletStore::new();
        store.create_wallet(UserId::new(), "USD", "US").unwrap();
        store.create_wallet(UserId::new(), "USD", "US").unwrap();
    }

    #[test]
    fn find_by_currency_returns_the_matching_wallet() {
        let store = WalletStore::new();
        let user = UserId::new();
        store.create_wallet(user, "USD", "US").unwrap();
        let eur = store.create_wallet(user, "EUR", "DE").unwrap();

        let found = store.find_by_currency(user, "EUR").unwrap();
        assert_eq!(found.id, eur.id);
        assert!(store.find_by_currency(user, "NGN").is_none());
        assert!(store.find_by_currency(UserId::new(), "EUR").is_none());
    }

    #[test]
    fn find_by_currency_misses_deleted_wallets() {
        let store = WalletStore::new();
        let user = UserId::new();
        store.create_wallet(user, "USD", "US").unwrap();
        let second = store.create_wallet(user, "EUR", "DE").unwrap();

        store.delete_wallet(second.id, user).unwrap();
        assert!(store.find_by_currency(user, "EUR").is_none());
    }

    #[test]
    fn compare_and_update_bumps_version() {
        let store = WalletStore::new();
        let wallet = store.create_wallet(UserId::new(), "USD", "US").unwrap();

        let mut updated = wallet.clone();
        updated.balance = Decimal::new(100, 0);
        let committed = store.compare_and_update(wallet.version, updated).unwrap();

        assert_eq!(committed.version, wallet.version + 1);
        assert_eq!(committed.balance, Decimal::new(100, 0));
        assert_eq!(store.get(wallet.id).unwrap().balance, Decimal::new(100, 0));
    }

    #[test]
    fn stale_version_write_is_contention() {
        let store = WalletStore::new();
        let wallet = store.create_wallet(UserId::new(), "USD", "US").unwrap();

        // First writer commits against the snapshot.
        let mut first = wallet.clone();
        first.balance = Decimal::new(50, 0);
        store.compare_and_update(wallet.version, first).unwrap();

        // Second writer still holds the old snapshot — must be rejected.
        let mut second = wallet.clone();
        second.balance = Decimal::new(75, 0);
        let err = store.compare_and_update(wallet.version, second).unwrap_err();
        assert!(matches!(err, LedgerGuardError::Contention { .. }));

        // The first writer's balance survived.
        assert_eq!(store.get(wallet.id).unwrap().balance, Decimal::new(50, 0));
    }

    #[test]
    fn primary_wallet_delete_rejected_even_at_zero_balance() {
        let store = WalletStore::new();
        let user = UserId::new();
        let primary = store.create_wallet(user, "USD", "US").unwrap();
        assert!(primary.balance.is_zero());

        let err = store.delete_wallet(primary.id, user).unwrap_err();
        assert!(matches!(err, LedgerGuardError::PrimaryWalletUndeletable));
    }

    #[test]
    fn non_empty_wallet_delete_rejected() {
        let store = WalletStore::new();
        let user = UserId::new();
        store.create_wallet(user, "USD", "US").unwrap();
        let second = store.create_wallet(user, "EUR", "DE").unwrap();

        let mut funded = second.clone();
        funded.balance = Decimal::new(10, 0);
        store.compare_and_update(second.version, funded).unwrap();

        let err = store.delete_wallet(second.id, user).unwrap_err();
        assert!(matches!(err, LedgerGuardError::WalletNotEmpty { .. }));
    }

    #[test]
    fn empty_secondary_wallet_delete_ok() {
        let store = WalletStore::new();
        let user = UserId::new();
        store.create_wallet(user, "USD", "US").unwrap();
        let second = store.create_wallet(user, "EUR", "DE").unwrap();

        store.delete_wallet(second.id, user).unwrap();
        assert!(matches!(
            store.get(second.id).unwrap_err(),
            LedgerGuardError::WalletNotFound(_)
        ));
        // The currency slot is free again.
        store.create_wallet(user, "EUR", "DE").unwrap();
    }

    #[test]
    fn delete_by_non_owner_rejected() {
        let store = WalletStore::new();
        let owner = UserId::new();
        store.create_wallet(owner, "USD", "US").unwrap();
        let second = store.create_wallet(owner, "EUR", "DE").unwrap();

        let err = store.delete_wallet(second.id, UserId::new()).unwrap_err();
        assert!(matches!(err, LedgerGuardError::Unauthorized));
    }

    #[test]
    fn activity_fingerprints_are_recorded() {
        let store = WalletStore::new();
        let user = UserId::new();
        assert!(store.activity(user).is_none());

        store.record_activity(
            user,
            &ActivityContext {
                location: Some("DE-Berlin".to_string()),
                device: Some("pixel-9".to_string()),
            },
        );

        let activity = store.activity(user).unwrap();
        assert_eq!(activity.last_location.as_deref(), Some("DE-Berlin"));
        assert_eq!(activity.last_device.as_deref(), Some("pixel-9"));
        assert!(activity.last_transaction_at.is_some());
    }

    #[test]
    fn partial_context_keeps_previous_fingerprint() {
        let store = WalletStore::new();
        let user = UserId::new();
        store.record_activity(
            user,
            &ActivityContext {
                location: Some("NG-Lagos".to_string()),
                device: Some("iphone-15".to_string()),
            },
        );
        store.record_activity(
            user,
            &ActivityContext {
                location: None,
                device: Some("iphone-15".to_string()),
            },
        );
        let activity = store.activity(user).unwrap();
        assert_eq!(activity.last_location.as_deref(), Some("NG-Lagos"));
    }
}
