//! Risk assessment types.
//!
//! A [`RiskAssessment`] is ephemeral — computed fresh per request from the
//! user's recent activity and never persisted as an entity. The scorer
//! accumulates independent weighted signals and caps the total, so that
//! environment defaults can never outright block all traffic.
//!
//! # Fail-open policy
//!
//! If the history lookup behind a score errors, the assessment degrades to
//! [`RiskAssessment::error_fallback`] — zero score plus an `ERROR_FALLBACK`
//! flag — rather than raising. Availability over safety is a deliberate,
//! flagged policy choice; a stricter deployment may want fail-closed with a
//! circuit breaker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single risk signal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFlag {
    /// Amount above the configured high-value threshold.
    HighValueTransaction,
    /// More than the allowed number of recent withdrawals in the lookback window.
    MultipleWithdrawals,
    /// Login/location fingerprint differs from the previous recorded one.
    LocationChanged,
    /// Device fingerprint differs from the previous recorded one.
    DeviceChanged,
    /// Internal lookup failed; the scorer failed open.
    ErrorFallback,
}

impl std::fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighValueTransaction => write!(f, "HIGH_VALUE_TRANSACTION"),
            Self::MultipleWithdrawals => write!(f, "MULTIPLE_WITHDRAWALS"),
            Self::LocationChanged => write!(f, "LOCATION_CHANGED"),
            Self::DeviceChanged => write!(f, "DEVICE_CHANGED"),
            Self::ErrorFallback => write!(f, "ERROR_FALLBACK"),
        }
    }
}

/// Result of scoring a single request: a capped 0–100 score plus the
/// triggered flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub flags: Vec<RiskFlag>,
}

impl RiskAssessment {
    /// A clean assessment: zero score, no flags.
    #[must_use]
    pub fn clean() -> Self {
        Self {
            score: 0,
            flags: Vec::new(),
        }
    }

    /// The fail-open degradation when a history lookup errors.
    #[must_use]
    pub fn error_fallback() -> Self {
        Self {
            score: 0,
            flags: vec![RiskFlag::ErrorFallback],
        }
    }

    #[must_use]
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Per-request login fingerprints supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityContext {
    /// Coarse location fingerprint (e.g., "NG-Lagos", "DE-Berlin").
    pub location: Option<String>,
    /// Device fingerprint.
    pub device: Option<String>,
}

/// The last recorded fingerprints for a user, maintained by the store and
/// compared against the current [`ActivityContext`] on each request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub last_location: Option<String>,
    pub last_device: Option<String>,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_assessment_not_flagged() {
        let a = RiskAssessment::clean();
        assert_eq!(a.score, 0);
        assert!(!a.is_flagged());
    }

    #[test]
    fn error_fallback_is_flagged_with_zero_score() {
        let a = RiskAssessment::error_fallback();
        assert_eq!(a.score, 0);
        assert_eq!(a.flags, vec![RiskFlag::ErrorFallback]);
        assert!(a.is_flagged());
    }

    #[test]
    fn flag_display_codes() {
        assert_eq!(
            RiskFlag::HighValueTransaction.to_string(),
            "HIGH_VALUE_TRANSACTION"
        );
        assert_eq!(RiskFlag::ErrorFallback.to_string(), "ERROR_FALLBACK");
    }

    #[test]
    fn assessment_serde_roundtrip() {
        let a = RiskAssessment {
            score: 45,
            flags: vec![RiskFlag::HighValueTransaction, RiskFlag::DeviceChanged],
        };
        let json = serde_json::to_string(&a).unwrap();
        let back: RiskAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
