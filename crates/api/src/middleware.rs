//! Admission pipeline middleware.
//!
//! Stages run strictly in order: authentication → tenant resolution →
//! subscription gate. Each stage either attaches context for the next one or
//! terminates the request with its own admission error; later stages never
//! see a request an earlier stage rejected. The limit gate runs inside the
//! bounded-resource creation handlers (it needs the live count for the
//! specific resource) but still decides ahead of permission evaluation.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use merx_auth::JwtValidator;
use merx_core::TenantId;
use merx_tenancy::{
    AdmissionError, ResolutionRequest, ensure_member, ensure_subscription, resolve_tenant,
    subdomain_of,
};

use crate::app::{errors, services::AppServices};
use crate::context::{PrincipalContext, TenantContext};

/// Paths that bypass the pipeline entirely.
///
/// This is the single, centrally defined allow-list; nothing is ever
/// inferred from route shape.
pub const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/register",
    "/auth/password-reset/request",
    "/auth/password-reset/confirm",
    "/demo-request",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Stage 1: authenticate the caller and attach [`PrincipalContext`].
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => return errors::admission_error_to_response(AdmissionError::Unauthenticated),
    };

    let claims = match services.jwt.validate(&token, Utc::now()) {
        Ok(c) => c,
        Err(_) => return errors::admission_error_to_response(AdmissionError::Unauthenticated),
    };

    let user = match services.users.get(claims.sub) {
        Some(u) if u.active => u,
        _ => return errors::admission_error_to_response(AdmissionError::Unauthenticated),
    };

    // Last-seen stamp is best-effort and off the request path; a store error
    // must never fail the request.
    {
        let users = services.users.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            if let Err(e) = users.record_login(user_id, Utc::now()) {
                tracing::warn!(%user_id, "last-login update failed: {e}");
            }
        });
    }

    req.extensions_mut().insert(PrincipalContext::new(
        user.id,
        user.kind,
        user.roles.clone(),
        user.memberships.clone(),
    ));

    next.run(req).await
}

/// Stage 2: resolve exactly one tenant and attach [`TenantContext`].
pub async fn tenant_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(principal) = req.extensions().get::<PrincipalContext>().cloned() else {
        return errors::admission_error_to_response(AdmissionError::Unauthenticated);
    };

    let subdomain = req
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(|host| subdomain_of(host, &services.config.base_domain));

    let header = match req.headers().get("x-company-id") {
        None => None,
        Some(v) => match v.to_str().ok().and_then(|s| s.parse::<TenantId>().ok()) {
            Some(id) => Some(id),
            None => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_company_id",
                    "X-Company-Id must be a valid tenant id",
                );
            }
        },
    };

    let resolution = ResolutionRequest {
        subdomain: subdomain.as_deref(),
        header,
        memberships: principal.memberships(),
    };

    let (tenant_id, via) = match resolve_tenant(resolution, |slug| {
        services.tenants.find_by_slug(slug).map(|t| t.id)
    }) {
        Ok(v) => v,
        Err(e) => return errors::admission_error_to_response(e),
    };

    if let Err(e) = ensure_member(principal.kind(), principal.memberships(), tenant_id) {
        return errors::admission_error_to_response(e);
    }

    let tenant = match services.tenants.get(tenant_id) {
        Some(t) if t.active => t,
        _ => return errors::admission_error_to_response(AdmissionError::TenantNotFound),
    };

    tracing::debug!(tenant = %tenant.slug, resolved_via = ?via, "tenant resolved");
    req.extensions_mut().insert(TenantContext::new(tenant));

    next.run(req).await
}

/// Stage 3: reject mutations for tenants whose subscription does not admit
/// writes.
pub async fn subscription_gate(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    if is_mutating(req.method()) {
        let Some(tenant) = req.extensions().get::<TenantContext>() else {
            return errors::admission_error_to_response(AdmissionError::Unauthenticated);
        };
        if let Err(e) = ensure_subscription(tenant.tenant()) {
            return errors::admission_error_to_response(e);
        }
    }

    next.run(req).await
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
