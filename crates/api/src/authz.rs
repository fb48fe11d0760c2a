//! Stage 4 of the pipeline: permission evaluation at the handler boundary.
//!
//! Handlers call [`require`] before touching a store. The only I/O here is
//! loading the identity's custom role records for the resolved tenant; the
//! decision itself is the pure `merx_auth::evaluate`.

use merx_auth::{Action, Permission, evaluate};
use merx_tenancy::AdmissionError;

use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

/// Check that the principal may take `action` on `resource` within the
/// resolved tenant. Fails closed with `PermissionDenied`.
pub fn require(
    services: &AppServices,
    tenant: &TenantContext,
    principal: &PrincipalContext,
    resource: &str,
    action: Action,
) -> Result<(), AdmissionError> {
    // Custom subscriber roles carry explicit permission strings; union them
    // with the built-in matrix grants.
    let mut grants: Vec<Permission> = Vec::new();
    for role in principal.roles() {
        if let Some(record) = services.roles.find(Some(tenant.tenant_id()), role.as_str()) {
            grants.extend(record.permissions);
        }
    }

    if evaluate(principal.kind(), principal.roles(), &grants, resource, action) {
        Ok(())
    } else {
        Err(AdmissionError::PermissionDenied(format!(
            "{resource}.{action}"
        )))
    }
}
