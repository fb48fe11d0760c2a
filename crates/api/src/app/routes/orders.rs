//! Sales orders. Line prices are resolved from the product catalog at
//! creation time, never trusted from the client.

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

use crate::app::records::{OrderLine, OrderRecord, OrderStatus};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

const RESOURCE: &str = "orders";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", post(set_order_status))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Create) {
        return errors::admission_error_to_response(e);
    }

    if body.lines.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "an order needs at least one line",
        );
    }

    if let Some(customer_id) = body.customer_id {
        if services.customers.get(tenant.tenant_id(), &customer_id).is_none() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "unknown customer",
            );
        }
    }

    let mut lines = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        if line.quantity == 0 {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "line quantity must be positive",
            );
        }
        let Some(product) = services.products.get(tenant.tenant_id(), &line.product_id) else {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "unknown product on order line",
            );
        };
        lines.push(OrderLine {
            product_id: product.id,
            quantity: line.quantity,
            unit_price_cents: product.price_cents,
        });
    }

    let record = OrderRecord {
        id: Uuid::now_v7(),
        customer_id: body.customer_id,
        lines,
        status: OrderStatus::Draft,
        created_at: Utc::now(),
    };
    services
        .orders
        .upsert(tenant.tenant_id(), record.id, record.clone());

    dto::success(
        StatusCode::CREATED,
        "order created",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    let records = services.orders.list(tenant.tenant_id());
    dto::success(
        StatusCode::OK,
        "orders",
        serde_json::to_value(&records).unwrap_or_default(),
    )
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Read) {
        return errors::admission_error_to_response(e);
    }

    match services.orders.get(tenant.tenant_id(), &id) {
        Some(record) => dto::success(
            StatusCode::OK,
            "order",
            serde_json::to_value(&record).unwrap_or_default(),
        ),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
    }
}

pub async fn set_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<dto::OrderStatusRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&services, &tenant, &principal, RESOURCE, Action::Update) {
        return errors::admission_error_to_response(e);
    }

    let Some(mut record) = services.orders.get(tenant.tenant_id(), &id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found");
    };

    record.status = body.status;
    services
        .orders
        .upsert(tenant.tenant_id(), id, record.clone());

    dto::success(
        StatusCode::OK,
        "order status updated",
        serde_json::to_value(&record).unwrap_or_default(),
    )
}
