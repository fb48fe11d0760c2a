use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use merx_auth::Action;
use merx_tenancy::{BoundedResource, ensure_capacity};

use crate::app::records::LocationRecord;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

const RESOURCE: &str = "locations";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_location).get(list_locations))
        .route("/:id", get(get_location).delete(delete_location))
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateLocationRequest>,
) -> axum::response::Response {
    // Limit gate first, permissions second.
    let current = services.locations.count(tenant.tenant_id());
    if let Err(e) = ensure_capacity(tenant.tenant(), BoundedResource::Locations, current) {
        return errors::admission_error_to_response(e);
    }

    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Create) {
        return errors::admission_error_to_response(e);
    }

    if body.name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "name is required",
        );
    }

    let record = LocationRecord {
        id: Uuid::now_v7(),
        name: body.name.trim().to_string(),
        address: body.address,
        created_at: Utc::now(),
    };
    services
        .locations
        .upsert(tenant.tenant_id(), record.id, record.clone());

    dto::success(
        StatusCode::CREATED,
        "location created",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    let records = services.locations.list(tenant.tenant_id());
    dto::success(
        StatusCode::OK,
        "locations",
        serde_json::to_value(&records).unwrap_or_default(),
    )
}

pub async fn get_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    match services.locations.get(tenant.tenant_id(), &id) {
        Some(record) => dto::success(
            StatusCode::OK,
            "location",
            serde_json::to_value(&record).unwrap_or_default(),
        ),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "location not found"),
    }
}

pub async fn delete_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Delete) {
        return errors::admission_error_to_response(e);
    }

    if services.locations.remove(tenant.tenant_id(), &id) {
        dto::success(StatusCode::OK, "location deleted", serde_json::Value::Null)
    } else {
        errors::json_error(StatusCode::NOT_FOUND, "not_found", "location not found")
    }
}
