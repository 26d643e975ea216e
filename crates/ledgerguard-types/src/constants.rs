//! System-wide constants for the LedgerGuard engine.
//!
//! Monetary constants are built with `Decimal::from_parts` so they can live
//! in `const` context (`Decimal::new` is not const).

use rust_decimal::Decimal;

/// Minimum accepted transaction amount (0.01).
pub const MIN_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum accepted transaction amount (1,000,000).
pub const MAX_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Amount above which a transaction is considered high value (10,000).
pub const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Risk score weight for a high-value transaction.
pub const RISK_WEIGHT_HIGH_VALUE: u8 = 25;

/// Risk score weight for multiple recent withdrawals.
pub const RISK_WEIGHT_MULTIPLE_WITHDRAWALS: u8 = 15;

/// Risk score weight for a changed location fingerprint.
pub const RISK_WEIGHT_LOCATION_CHANGED: u8 = 5;

/// Risk score weight for a changed device fingerprint.
pub const RISK_WEIGHT_DEVICE_CHANGED: u8 = 5;

/// Risk scores are capped here so defaults can never block all traffic.
pub const RISK_SCORE_CAP: u8 = 100;

/// Requests scoring strictly above this are rejected with a security block.
pub const RISK_BLOCK_THRESHOLD: u8 = 90;

/// Lookback window for the multiple-withdrawals signal, in hours.
pub const RISK_WITHDRAWAL_LOOKBACK_HOURS: i64 = 24;

/// More recent withdrawals than this inside the lookback triggers the signal.
pub const RISK_MAX_RECENT_WITHDRAWALS: usize = 3;

/// Fraud heuristic window, in hours.
pub const FRAUD_WINDOW_HOURS: i64 = 24;

/// More transactions than this inside the fraud window is flagged as velocity abuse.
pub const FRAUD_MAX_VELOCITY: usize = 50;

/// More than this many near-identical amounts in-window is flagged as a pattern.
pub const FRAUD_PATTERN_MIN_COUNT: usize = 10;

/// Two amounts within this epsilon count as "the same" for pattern detection.
pub const FRAUD_AMOUNT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Guard sliding rate-limit window, in seconds (5 minutes).
pub const RATE_LIMIT_WINDOW_SECS: u64 = 300;

/// Maximum transactions per user inside the rate-limit window.
pub const RATE_LIMIT_MAX_TRANSACTIONS: usize = 10;

/// Amounts above this are rejected by the guard pending step-up verification.
pub const SUSPICIOUS_AMOUNT_CEILING: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Maximum optimistic-concurrency commit attempts before `Contention`.
pub const MAX_COMMIT_ATTEMPTS: u32 = 5;

/// Base backoff between commit retries, in milliseconds (doubles per attempt).
pub const COMMIT_BACKOFF_BASE_MS: u64 = 2;

/// Bounded idempotency registry size (number of keys to remember).
pub const IDEMPOTENCY_CACHE_SIZE: usize = 500_000;

/// Bounded audit log buffer size before FIFO eviction.
pub const AUDIT_LOG_CAPACITY: usize = 100_000;

/// Rolling daily window for limit enforcement, in hours.
pub const LIMIT_DAILY_WINDOW_HOURS: i64 = 24;

/// Rolling monthly window for limit enforcement, in days.
pub const LIMIT_MONTHLY_WINDOW_DAYS: i64 = 30;

// Role-based ceilings: each tier strictly higher than the one below.

pub const USER_PER_TRANSACTION_LIMIT: Decimal = Decimal::from_parts(5_000, 0, 0, false, 0);
pub const USER_DAILY_LIMIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
pub const USER_MONTHLY_LIMIT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

pub const ADMIN_PER_TRANSACTION_LIMIT: Decimal = Decimal::from_parts(20_000, 0, 0, false, 0);
pub const ADMIN_DAILY_LIMIT: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);
pub const ADMIN_MONTHLY_LIMIT: Decimal = Decimal::from_parts(500_000, 0, 0, false, 0);

pub const SUPER_ADMIN_PER_TRANSACTION_LIMIT: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);
pub const SUPER_ADMIN_DAILY_LIMIT: Decimal = Decimal::from_parts(200_000, 0, 0, false, 0);
pub const SUPER_ADMIN_MONTHLY_LIMIT: Decimal = Decimal::from_parts(2_000_000, 0, 0, false, 0);

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "LedgerGuard";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_bounds_sane() {
        assert!(MIN_TRANSACTION_AMOUNT > Decimal::ZERO);
        assert!(MIN_TRANSACTION_AMOUNT < MAX_TRANSACTION_AMOUNT);
        assert_eq!(MIN_TRANSACTION_AMOUNT, Decimal::new(1, 2));
        assert_eq!(MAX_TRANSACTION_AMOUNT, Decimal::new(1_000_000, 0));
    }

    #[test]
    fn risk_weights_fit_under_cap() {
        let total = RISK_WEIGHT_HIGH_VALUE
            + RISK_WEIGHT_MULTIPLE_WITHDRAWALS
            + RISK_WEIGHT_LOCATION_CHANGED
            + RISK_WEIGHT_DEVICE_CHANGED;
        assert!(total <= RISK_SCORE_CAP);
        assert!(RISK_BLOCK_THRESHOLD < RISK_SCORE_CAP);
    }

    #[test]
    fn fraud_epsilon_is_one_cent() {
        assert_eq!(FRAUD_AMOUNT_EPSILON, Decimal::new(1, 2));
    }
}
