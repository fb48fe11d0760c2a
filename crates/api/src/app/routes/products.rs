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

use crate::app::records::ProductRecord;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

const RESOURCE: &str = "products";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    // Live count, read per request; the ceiling check must never run against
    // a cached counter. The limit gate decides before permissions do.
    let current = services.products.count(tenant.tenant_id());
    if let Err(e) = ensure_capacity(tenant.tenant(), BoundedResource::Products, current) {
        return errors::admission_error_to_response(e);
    }

    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Create) {
        return errors::admission_error_to_response(e);
    }

    let sku = body.sku.trim().to_string();
    if sku.is_empty() || body.name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "sku and name are required",
        );
    }
    if services
        .products
        .list(tenant.tenant_id())
        .iter()
        .any(|p| p.sku == sku)
    {
        return errors::json_error(StatusCode::CONFLICT, "conflict", "sku already exists");
    }

    let record = ProductRecord {
        id: Uuid::now_v7(),
        sku,
        name: body.name.trim().to_string(),
        price_cents: body.price_cents,
        active: true,
        created_at: Utc::now(),
    };
    services
        .products
        .upsert(tenant.tenant_id(), record.id, record.clone());

    dto::success(
        StatusCode::CREATED,
        "product created",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    let records = services.products.list(tenant.tenant_id());
    dto::success(
        StatusCode::OK,
        "products",
        serde_json::to_value(&records).unwrap_or_default(),
    )
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    match services.products.get(tenant.tenant_id(), &id) {
        Some(record) => dto::success(
            StatusCode::OK,
            "product",
            serde_json::to_value(&record).unwrap_or_default(),
        ),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Update) {
        return errors::admission_error_to_response(e);
    }

    let Some(mut record) = services.products.get(tenant.tenant_id(), &id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
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
    if let Some(price_cents) = body.price_cents {
        record.price_cents = price_cents;
    }
    if let Some(active) = body.active {
        record.active = active;
    }
    services
        .products
        .upsert(tenant.tenant_id(), id, record.clone());

    dto::success(
        StatusCode::OK,
        "product updated",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Delete) {
        return errors::admission_error_to_response(e);
    }

    if services.products.remove(tenant.tenant_id(), &id) {
        dto::success(StatusCode::OK, "product deleted", serde_json::Value::Null)
    } else {
        errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found")
    }
}
