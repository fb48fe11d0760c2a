//! Identity (user) record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use merx_auth::{Role, UserKind};
use merx_core::{DomainError, DomainResult, TenantId, UserId};

/// Outstanding password-reset token on a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity record.
///
/// # Invariants
/// - Email is stored lowercase and is unique across the system (enforced by
///   the user store).
/// - Users are never hard-deleted; deactivation flips `active`.
/// - Company users hold memberships in zero or more tenants; system admins
///   hold none and bypass membership checks instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub kind: UserKind,
    pub memberships: Vec<TenantId>,
    pub roles: Vec<Role>,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub reset_token: Option<ResetToken>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(
        email: &str,
        password_hash: String,
        kind: UserKind,
        memberships: Vec<TenantId>,
        roles: Vec<Role>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        Ok(Self {
            id: UserId::new(),
            email,
            password_hash,
            kind,
            memberships,
            roles,
            active: true,
            last_login_at: None,
            reset_token: None,
            created_at: now,
        })
    }

    pub fn is_member(&self, tenant_id: TenantId) -> bool {
        self.memberships.contains(&tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let u = UserRecord::new(
            "  Alice@Example.COM ",
            "hash".into(),
            UserKind::CompanyUser,
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(u.email, "alice@example.com");
    }

    #[test]
    fn invalid_email_rejected() {
        let err = UserRecord::new(
            "not-an-email",
            "hash".into(),
            UserKind::CompanyUser,
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
