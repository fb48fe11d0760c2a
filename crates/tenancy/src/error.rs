//! Admission pipeline error taxonomy.
//!
//! Each stage of the pipeline fails with its own variant; they are never
//! collapsed into a generic "forbidden", because callers must be able to
//! tell "your trial expired" apart from "you lack the role for this".

use thiserror::Error;

use crate::gates::BoundedResource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Missing, malformed, expired or otherwise unverifiable credential,
    /// or the identity behind it is inactive.
    #[error("missing or invalid credential")]
    Unauthenticated,

    /// No strategy produced a tenant and the identity's memberships do not
    /// single one out. The pipeline never guesses.
    #[error("cannot uniquely resolve a tenant for this request")]
    AmbiguousTenant,

    /// A tenant was named (subdomain or header) but does not exist or is
    /// disabled.
    #[error("tenant not found")]
    TenantNotFound,

    /// The resolved tenant exists but the identity is not a member of it.
    #[error("identity is not a member of the resolved tenant")]
    TenantForbidden,

    /// The tenant's subscription does not admit writes.
    #[error("subscription is not active")]
    SubscriptionInactive,

    /// A creation would reach or pass the tenant's plan ceiling.
    #[error("plan limit reached for {resource}: {current} of {ceiling}")]
    LimitExceeded {
        resource: BoundedResource,
        current: u64,
        ceiling: u32,
    },

    /// The identity's roles do not grant the requested action.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl AdmissionError {
    /// Stable machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::Unauthenticated => "unauthenticated",
            AdmissionError::AmbiguousTenant => "ambiguous_tenant",
            AdmissionError::TenantNotFound => "tenant_not_found",
            AdmissionError::TenantForbidden => "tenant_forbidden",
            AdmissionError::SubscriptionInactive => "subscription_inactive",
            AdmissionError::LimitExceeded { .. } => "limit_exceeded",
            AdmissionError::PermissionDenied(_) => "permission_denied",
        }
    }
}
