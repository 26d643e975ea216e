//! # ledgerguard-screen
//!
//! Pre-mutation screening for the LedgerGuard engine: the weighted risk
//! scorer, the fraud heuristics, and the role-based limit enforcer.
//!
//! All three components are pure over caller-supplied inputs (history
//! slices, activity snapshots) and receive their thresholds by
//! construction. The transaction processor owns the fail-open policy:
//! when gathering the inputs for the risk scorer or fraud screen errors,
//! it degrades to a pass rather than raising.

pub mod fraud;
pub mod limits;
pub mod risk_scorer;

pub use fraud::{FraudScreen, FraudVerdict};
pub use limits::LimitEnforcer;
pub use risk_scorer::{RiskInput, RiskScorer};
