//! Role tiers and role-based transaction ceilings.
//!
//! Each role tier gets strictly higher daily / monthly / per-transaction
//! ceilings than the tier below it. Ceilings are configuration, injected
//! into the limit enforcer — there is no global policy state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Caller role tier, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

/// Which ceiling a limit rejection hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitScope {
    PerTransaction,
    Daily,
    Monthly,
}

impl std::fmt::Display for LimitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerTransaction => write!(f, "per-transaction"),
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Ceilings for one role tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLimits {
    pub per_transaction: Decimal,
    pub daily: Decimal,
    pub monthly: Decimal,
}

/// Role → ceilings mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    pub user: RoleLimits,
    pub admin: RoleLimits,
    pub super_admin: RoleLimits,
}

impl LimitPolicy {
    /// Ceilings for a given role.
    #[must_use]
    pub fn for_role(&self, role: Role) -> RoleLimits {
        match role {
            Role::User => self.user,
            Role::Admin => self.admin,
            Role::SuperAdmin => self.super_admin,
        }
    }
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            user: RoleLimits {
                per_transaction: constants::USER_PER_TRANSACTION_LIMIT,
                daily: constants::USER_DAILY_LIMIT,
                monthly: constants::USER_MONTHLY_LIMIT,
            },
            admin: RoleLimits {
                per_transaction: constants::ADMIN_PER_TRANSACTION_LIMIT,
                daily: constants::ADMIN_DAILY_LIMIT,
                monthly: constants::ADMIN_MONTHLY_LIMIT,
            },
            super_admin: RoleLimits {
                per_transaction: constants::SUPER_ADMIN_PER_TRANSACTION_LIMIT,
                daily: constants::SUPER_ADMIN_DAILY_LIMIT,
                monthly: constants::SUPER_ADMIN_MONTHLY_LIMIT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn default_policy_tiers_strictly_increase() {
        let p = LimitPolicy::default();
        assert!(p.user.per_transaction < p.admin.per_transaction);
        assert!(p.admin.per_transaction < p.super_admin.per_transaction);
        assert!(p.user.daily < p.admin.daily);
        assert!(p.admin.daily < p.super_admin.daily);
        assert!(p.user.monthly < p.admin.monthly);
        assert!(p.admin.monthly < p.super_admin.monthly);
    }

    #[test]
    fn daily_never_exceeds_monthly() {
        let p = LimitPolicy::default();
        for limits in [p.user, p.admin, p.super_admin] {
            assert!(limits.per_transaction <= limits.daily);
            assert!(limits.daily <= limits.monthly);
        }
    }

    #[test]
    fn for_role_selects_tier() {
        let p = LimitPolicy::default();
        assert_eq!(p.for_role(Role::User), p.user);
        assert_eq!(p.for_role(Role::SuperAdmin), p.super_admin);
    }
}
