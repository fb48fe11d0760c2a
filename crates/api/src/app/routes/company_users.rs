//! Company user management: invite, list, deactivate, role assignment.
//!
//! Users are never hard-deleted; deactivation flips `active` and the auth
//! middleware rejects the identity on its next request.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use merx_auth::{Action, Role, UserKind, hash_password};
use merx_core::UserId;
use merx_tenancy::{BoundedResource, UserRecord, ensure_capacity};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

const RESOURCE: &str = "users";

pub fn router() -> Router {
    Router::new()
        .route("/", post(invite_user).get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/deactivate", post(deactivate_user))
        .route("/:id/roles", post(assign_roles))
}

fn user_json(user: &UserRecord) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "kind": user.kind.to_string(),
        "roles": user.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "active": user.active,
        "last_login_at": user.last_login_at,
    })
}

pub async fn invite_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::InviteUserRequest>,
) -> axum::response::Response {
    // Seat ceiling: live member count, read per request. The limit gate
    // decides before permissions do.
    let current = services.users.count_members(tenant.tenant_id());
    if let Err(e) = ensure_capacity(tenant.tenant(), BoundedResource::Users, current) {
        return errors::admission_error_to_response(e);
    }

    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Create) {
        return errors::admission_error_to_response(e);
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("password hashing failed: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "could not process credentials",
            );
        }
    };

    let roles: Vec<Role> = body.roles.into_iter().map(Role::new).collect();
    let user = match UserRecord::new(
        &body.email,
        password_hash,
        UserKind::CompanyUser,
        vec![tenant.tenant_id()],
        roles,
        Utc::now(),
    ) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let snapshot = user_json(&user);
    if let Err(e) = services.users.insert(user) {
        return errors::domain_error_to_response(e);
    }

    dto::success(StatusCode::CREATED, "user invited", snapshot)
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    let members = services.users.list_members(tenant.tenant_id());
    let data: Vec<_> = members.iter().map(user_json).collect();
    dto::success(StatusCode::OK, "users", serde_json::Value::Array(data))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    match member_of(&services, &tenant, id) {
        Some(user) => dto::success(StatusCode::OK, "user", user_json(&user)),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
    }
}

pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Update) {
        return errors::admission_error_to_response(e);
    }

    let Some(mut user) = member_of(&services, &tenant, id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found");
    };

    user.active = false;
    let snapshot = user_json(&user);
    if let Err(e) = services.users.update(user) {
        return errors::domain_error_to_response(e);
    }

    dto::success(StatusCode::OK, "user deactivated", snapshot)
}

pub async fn assign_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<dto::AssignRolesRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Update) {
        return errors::admission_error_to_response(e);
    }

    let Some(mut user) = member_of(&services, &tenant, id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found");
    };

    user.roles = body.roles.into_iter().map(Role::new).collect();
    let snapshot = user_json(&user);
    if let Err(e) = services.users.update(user) {
        return errors::domain_error_to_response(e);
    }

    dto::success(StatusCode::OK, "roles updated", snapshot)
}

/// Load a user only if they hold a membership in the request's tenant;
/// cross-tenant ids behave exactly like unknown ids.
fn member_of(services: &AppServices, tenant: &TenantContext, id: Uuid) -> Option<UserRecord> {
    let user = services.users.get(UserId::from_uuid(id))?;
    user.is_member(tenant.tenant_id()).then_some(user)
}
