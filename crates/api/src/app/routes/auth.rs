//! Public authentication surface: registration, login, password reset.
//!
//! Every route here is on the allow-list and runs outside the admission
//! pipeline.

use std::sync::Arc;

use axum::{Json, Router, extract::Extension, http::StatusCode, routing::post};
use chrono::Utc;
use uuid::Uuid;

use merx_auth::{JwtClaims, JwtSigner, UserKind, hash_password, verify_password};
use merx_core::UserId;
use merx_tenancy::user::ResetToken;
use merx_tenancy::{Tenant, Tier, UserRecord};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/password-reset/request", post(password_reset_request))
        .route("/password-reset/confirm", post(password_reset_confirm))
}

fn mint_token(services: &AppServices, user_id: UserId) -> Result<String, axum::response::Response> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        issued_at: now,
        expires_at: now + services.config.token_ttl,
    };
    services.jwt.sign(&claims).map_err(|e| {
        tracing::error!("token signing failed: {e}");
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token_error",
            "could not issue token",
        )
    })
}

/// POST /auth/register — create a tenant on a trial subscription plus its
/// company-admin user, and log them in.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let now = Utc::now();

    if services.users.find_by_email(&body.email).is_some() {
        return errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            "email already registered",
        );
    }

    let tenant = match Tenant::register(&body.slug, &body.company_name, Tier::Starter, now) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

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

    let user = match UserRecord::new(
        &body.email,
        password_hash,
        UserKind::CompanyAdmin,
        vec![tenant.id],
        vec![],
        now,
    ) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let tenant_id = tenant.id;
    if let Err(e) = services.tenants.insert(tenant) {
        return errors::domain_error_to_response(e);
    }
    let user_id = user.id;
    if let Err(e) = services.users.insert(user) {
        return errors::domain_error_to_response(e);
    }

    let token = match mint_token(&services, user_id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    dto::success(
        StatusCode::CREATED,
        "company registered",
        serde_json::json!({
            "company_id": tenant_id.to_string(),
            "user_id": user_id.to_string(),
            "token": token,
        }),
    )
}

/// POST /auth/login — verify credentials and issue a token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let invalid = || {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid email or password",
        )
    };

    let Some(user) = services.users.find_by_email(&body.email) else {
        return invalid();
    };
    if !user.active {
        return invalid();
    }

    match verify_password(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid(),
        Err(e) => {
            tracing::error!(user_id = %user.id, "credential hash unusable: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "could not verify credentials",
            );
        }
    }

    // Best-effort; a failed stamp must not fail the login.
    {
        let users = services.users.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            if let Err(e) = users.record_login(user_id, Utc::now()) {
                tracing::warn!(%user_id, "last-login update failed: {e}");
            }
        });
    }

    let token = match mint_token(&services, user.id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    dto::success(
        StatusCode::OK,
        "logged in",
        serde_json::json!({
            "token": token,
            "user": {
                "id": user.id.to_string(),
                "email": user.email,
                "kind": user.kind.to_string(),
                "roles": user.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            },
        }),
    )
}

/// POST /auth/password-reset/request — issue a reset token.
///
/// Responds identically whether or not the account exists, to avoid leaking
/// which emails are registered. Token delivery is out of scope; we store it
/// and log the issuance.
pub async fn password_reset_request(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PasswordResetRequest>,
) -> axum::response::Response {
    if let Some(mut user) = services.users.find_by_email(&body.email) {
        user.reset_token = Some(ResetToken {
            token: Uuid::now_v7().to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        });
        let user_id = user.id;
        if let Err(e) = services.users.update(user) {
            tracing::warn!(%user_id, "failed to store reset token: {e}");
        } else {
            tracing::info!(%user_id, "password reset token issued");
        }
    }

    dto::success(
        StatusCode::OK,
        "if the account exists, a reset token has been issued",
        serde_json::Value::Null,
    )
}

/// POST /auth/password-reset/confirm — consume a reset token.
pub async fn password_reset_confirm(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PasswordResetConfirm>,
) -> axum::response::Response {
    let rejected = || {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_reset_token",
            "reset token is invalid or expired",
        )
    };

    let Some(mut user) = services.users.find_by_email(&body.email) else {
        return rejected();
    };

    let valid = user
        .reset_token
        .as_ref()
        .is_some_and(|t| t.token == body.token && t.expires_at > Utc::now());
    if !valid {
        return rejected();
    }

    user.password_hash = match hash_password(&body.new_password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(user_id = %user.id, "password hashing failed: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "could not process credentials",
            );
        }
    };
    user.reset_token = None;

    if let Err(e) = services.users.update(user) {
        return errors::domain_error_to_response(e);
    }

    dto::success(StatusCode::OK, "password updated", serde_json::Value::Null)
}
