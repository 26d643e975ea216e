//! Keyed transaction integrity tokens.
//!
//! A token is `HMAC-SHA256(secret, wallet|user|amount|timestamp|nonce)`,
//! encoded as `"{nonce_hex}:{tag_hex}"`. The keyed construction means a
//! token cannot be forged or recomputed without the server-side secret —
//! a plain hash over public fields would verify any tampered transaction
//! that recomputed it.
//!
//! Verification is constant-time via the MAC's own comparison.

use hmac::{Hmac, Mac};
use ledgerguard_types::{LedgerGuardError, Result, UserId, WalletId};
use rand::RngCore;
use rust_decimal::Decimal;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 16;

/// Signs and verifies transaction integrity tokens with an injected secret.
#[derive(Clone)]
pub struct IntegritySigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for IntegritySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the secret, even in debug output.
        f.debug_struct("IntegritySigner").finish_non_exhaustive()
    }
}

impl IntegritySigner {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Produce a `"{nonce}:{tag}"` token binding the transaction fields.
    ///
    /// # Errors
    /// `Internal` if the MAC cannot be keyed.
    pub fn generate(
        &self,
        wallet_id: WalletId,
        user_id: UserId,
        amount: Decimal,
        timestamp_ms: i64,
    ) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        let nonce_hex = hex::encode(nonce);

        let tag = self.tag(wallet_id, user_id, amount, timestamp_ms, &nonce_hex)?;
        Ok(format!("{nonce_hex}:{}", hex::encode(tag)))
    }

    /// Verify a token against the transaction fields it should bind.
    ///
    /// # Errors
    /// `IntegrityFailure` on any mismatch or malformed token.
    pub fn verify(
        &self,
        wallet_id: WalletId,
        user_id: UserId,
        amount: Decimal,
        timestamp_ms: i64,
        token: &str,
    ) -> Result<()> {
        let (nonce_hex, tag_hex) = token
            .split_once(':')
            .ok_or(LedgerGuardError::IntegrityFailure)?;
        if nonce_hex.len() != NONCE_LEN * 2 {
            return Err(LedgerGuardError::IntegrityFailure);
        }
        let tag = hex::decode(tag_hex).map_err(|_| LedgerGuardError::IntegrityFailure)?;

        let mut mac = self.keyed_mac()?;
        mac.update(Self::message(wallet_id, user_id, amount, timestamp_ms, nonce_hex).as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| LedgerGuardError::IntegrityFailure)
    }

    fn tag(
        &self,
        wallet_id: WalletId,
        user_id: UserId,
        amount: Decimal,
        timestamp_ms: i64,
        nonce_hex: &str,
    ) -> Result<Vec<u8>> {
        let mut mac = self.keyed_mac()?;
        mac.update(Self::message(wallet_id, user_id, amount, timestamp_ms, nonce_hex).as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn keyed_mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| LedgerGuardError::Internal("integrity MAC key rejected".to_string()))
    }

    fn message(
        wallet_id: WalletId,
        user_id: UserId,
        amount: Decimal,
        timestamp_ms: i64,
        nonce_hex: &str,
    ) -> String {
        format!("{wallet_id}|{user_id}|{amount}|{timestamp_ms}|{nonce_hex}")
    }
}
