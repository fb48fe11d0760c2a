//! Role records (custom, store-backed roles).
//!
//! Built-in roles live in the permission matrix and need no record; these
//! are subscriber-defined roles carrying explicit permission strings.

use serde::{Deserialize, Serialize};

use merx_auth::Permission;
use merx_core::{RoleId, TenantId};

/// Scope of a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Platform-wide role, owned by no tenant.
    System,
    /// Tenant-scoped role defined by a subscriber.
    Subscriber,
}

/// A stored role. `(tenant_id, key)` is unique, enforced by the role store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub key: String,
    pub scope: RoleScope,
    /// `None` for system roles; `Some` for subscriber roles.
    pub tenant_id: Option<TenantId>,
    pub permissions: Vec<Permission>,
    /// Assigned to newly invited users of the owning tenant by default.
    pub is_default: bool,
}

impl RoleRecord {
    pub fn subscriber(
        tenant_id: TenantId,
        key: &str,
        permissions: Vec<Permission>,
        is_default: bool,
    ) -> Self {
        Self {
            id: RoleId::new(),
            key: key.to_string(),
            scope: RoleScope::Subscriber,
            tenant_id: Some(tenant_id),
            permissions,
            is_default,
        }
    }
}
