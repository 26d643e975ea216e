//! Configuration for the LedgerGuard engine.
//!
//! Every component receives its configuration by construction — there is no
//! module-level secret or policy state. This keeps the risk scorer, fraud
//! heuristic, and limit enforcer unit-testable against synthetic histories.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, LimitPolicy};

/// Accepted amount bounds for any single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPolicy {
    /// Strict lower bound (inclusive).
    pub min: Decimal,
    /// Strict upper bound (inclusive).
    pub max: Decimal,
}

impl AmountPolicy {
    /// Whether an amount is positive and inside bounds.
    #[must_use]
    pub fn accepts(&self, amount: Decimal) -> bool {
        amount.is_sign_positive() && !amount.is_zero() && amount >= self.min && amount <= self.max
    }
}

impl Default for AmountPolicy {
    fn default() -> Self {
        Self {
            min: constants::MIN_TRANSACTION_AMOUNT,
            max: constants::MAX_TRANSACTION_AMOUNT,
        }
    }
}

/// Risk scorer weights and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub high_value_threshold: Decimal,
    pub weight_high_value: u8,
    pub weight_multiple_withdrawals: u8,
    pub weight_location_changed: u8,
    pub weight_device_changed: u8,
    /// Lookback for the multiple-withdrawals signal, in hours.
    pub withdrawal_lookback_hours: i64,
    /// More recent withdrawals than this triggers the signal.
    pub max_recent_withdrawals: usize,
    /// Hard cap on the accumulated score.
    pub score_cap: u8,
    /// Scores strictly above this are rejected.
    pub block_threshold: u8,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: constants::HIGH_VALUE_THRESHOLD,
            weight_high_value: constants::RISK_WEIGHT_HIGH_VALUE,
            weight_multiple_withdrawals: constants::RISK_WEIGHT_MULTIPLE_WITHDRAWALS,
            weight_location_changed: constants::RISK_WEIGHT_LOCATION_CHANGED,
            weight_device_changed: constants::RISK_WEIGHT_DEVICE_CHANGED,
            withdrawal_lookback_hours: constants::RISK_WITHDRAWAL_LOOKBACK_HOURS,
            max_recent_withdrawals: constants::RISK_MAX_RECENT_WITHDRAWALS,
            score_cap: constants::RISK_SCORE_CAP,
            block_threshold: constants::RISK_BLOCK_THRESHOLD,
        }
    }
}

/// Fraud heuristic thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    /// Window over recent transactions, in hours.
    pub window_hours: i64,
    /// More in-window transactions than this is velocity abuse.
    pub max_velocity: usize,
    /// More than this many near-identical amounts is a suspicious pattern.
    pub pattern_min_count: usize,
    /// Amounts within this epsilon count as identical.
    pub amount_epsilon: Decimal,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            window_hours: constants::FRAUD_WINDOW_HOURS,
            max_velocity: constants::FRAUD_MAX_VELOCITY,
            pattern_min_count: constants::FRAUD_PATTERN_MIN_COUNT,
            amount_epsilon: constants::FRAUD_AMOUNT_EPSILON,
        }
    }
}

/// Transaction Guard thresholds and the integrity-hash secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Sliding rate-limit window, in seconds.
    pub rate_window_secs: u64,
    /// Maximum transactions per user inside the window.
    pub rate_cap: usize,
    /// Amounts above this are rejected pending step-up verification.
    pub suspicious_amount_ceiling: Decimal,
    /// Server-side secret mixed into the integrity MAC. Injected, never
    /// read from ambient state.
    pub secret: Vec<u8>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            rate_window_secs: constants::RATE_LIMIT_WINDOW_SECS,
            rate_cap: constants::RATE_LIMIT_MAX_TRANSACTIONS,
            suspicious_amount_ceiling: constants::SUSPICIOUS_AMOUNT_CEILING,
            secret: b"ledgerguard-dev-secret".to_vec(),
        }
    }
}

/// Bounded-retry policy for the optimistic commit loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Hard ceiling on commit attempts before surfacing `Contention`.
    pub max_attempts: u32,
    /// Base backoff in milliseconds; doubles on each retry.
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::MAX_COMMIT_ATTEMPTS,
            backoff_base_ms: constants::COMMIT_BACKOFF_BASE_MS,
        }
    }
}

/// Top-level engine configuration, passed explicitly into every component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub amounts: AmountPolicy,
    pub risk: RiskConfig,
    pub fraud: FraudConfig,
    pub guard: GuardConfig,
    pub retry: RetryConfig,
    pub limits: LimitPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_policy_accepts_in_bounds() {
        let p = AmountPolicy::default();
        assert!(p.accepts(Decimal::new(5000, 2))); // 50.00
        assert!(p.accepts(constants::MIN_TRANSACTION_AMOUNT));
        assert!(p.accepts(constants::MAX_TRANSACTION_AMOUNT));
    }

    #[test]
    fn amount_policy_rejects_out_of_bounds() {
        let p = AmountPolicy::default();
        assert!(!p.accepts(Decimal::ZERO));
        assert!(!p.accepts(Decimal::new(-100, 2)));
        assert!(!p.accepts(Decimal::new(1, 3))); // 0.001 below min
        assert!(!p.accepts(Decimal::new(1_000_001, 0)));
    }

    #[test]
    fn default_retry_is_bounded() {
        let r = RetryConfig::default();
        assert!(r.max_attempts >= 1);
        assert!(r.max_attempts <= 10);
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.risk.block_threshold, back.risk.block_threshold);
        assert_eq!(cfg.fraud.max_velocity, back.fraud.max_velocity);
        assert_eq!(cfg.guard.rate_cap, back.guard.rate_cap);
    }
}
