use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto;
use crate::context::{PrincipalContext, TenantContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Diagnostic echo of the resolved request context.
pub async fn whoami(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "tenant_id": tenant.tenant_id().to_string(),
        "tenant_slug": tenant.tenant().slug,
        "subscription_status": tenant.tenant().subscription.status.to_string(),
        "user_id": principal.user_id().to_string(),
        "kind": principal.kind().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
    }))
}

/// Public demo-request intake. Delivery is someone else's job; we accept and
/// log.
pub async fn demo_request(Json(body): Json<dto::DemoRequest>) -> axum::response::Response {
    tracing::info!(
        name = %body.name,
        email = %body.email,
        company = body.company.as_deref().unwrap_or("-"),
        "demo request received"
    );
    dto::success(
        StatusCode::ACCEPTED,
        "demo request received",
        serde_json::Value::Null,
    )
}
