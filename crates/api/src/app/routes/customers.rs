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

use crate::app::records::CustomerRecord;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

const RESOURCE: &str = "customers";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
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

    let record = CustomerRecord {
        id: Uuid::now_v7(),
        name: body.name.trim().to_string(),
        email: body.email.map(|e| e.trim().to_lowercase()),
        phone: body.phone,
        created_at: Utc::now(),
    };
    services
        .customers
        .upsert(tenant.tenant_id(), record.id, record.clone());

    dto::success(
        StatusCode::CREATED,
        "customer created",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    let records = services.customers.list(tenant.tenant_id());
    dto::success(
        StatusCode::OK,
        "customers",
        serde_json::to_value(&records).unwrap_or_default(),
    )
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    match services.customers.get(tenant.tenant_id(), &id) {
        Some(record) => dto::success(
            StatusCode::OK,
            "customer",
            serde_json::to_value(&record).unwrap_or_default(),
        ),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<dto::UpdateCustomerRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Update) {
        return errors::admission_error_to_response(e);
    }

    let Some(mut record) = services.customers.get(tenant.tenant_id(), &id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found");
    };

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "name cannot be blank",
            );
        }
        record.name = name;
    }
    if let Some(email) = body.email {
        record.email = Some(email.trim().to_lowercase());
    }
    if let Some(phone) = body.phone {
        record.phone = Some(phone);
    }
    services
        .customers
        .upsert(tenant.tenant_id(), id, record.clone());

    dto::success(
        StatusCode::OK,
        "customer updated",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Delete) {
        return errors::admission_error_to_response(e);
    }

    if services.customers.remove(tenant.tenant_id(), &id) {
        dto::success(StatusCode::OK, "customer deleted", serde_json::Value::Null)
    } else {
        errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found")
    }
}
