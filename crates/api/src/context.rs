use merx_auth::{Role, UserKind};
use merx_core::{TenantId, UserId};
use merx_tenancy::Tenant;

/// Authenticated identity for a request, loaded fresh from the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    kind: UserKind,
    roles: Vec<Role>,
    memberships: Vec<TenantId>,
}

impl PrincipalContext {
    pub fn new(
        user_id: UserId,
        kind: UserKind,
        roles: Vec<Role>,
        memberships: Vec<TenantId>,
    ) -> Self {
        Self {
            user_id,
            kind,
            roles,
            memberships,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn kind(&self) -> UserKind {
        self.kind
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn memberships(&self) -> &[TenantId] {
        &self.memberships
    }
}

/// Resolved tenant for a request.
///
/// Carries the full record: the subscription and limit gates downstream need
/// the subscription block and ceilings, not just the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant: Tenant,
}

impl TenantContext {
    pub fn new(tenant: Tenant) -> Self {
        Self { tenant }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant.id
    }

    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }
}
