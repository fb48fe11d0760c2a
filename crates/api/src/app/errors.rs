use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use merx_core::DomainError;
use merx_tenancy::AdmissionError;

/// Map an admission failure to its HTTP status and JSON body.
///
/// Every variant keeps its own machine-readable code; "trial expired" and
/// "missing role" must stay distinguishable to callers and tests.
pub fn admission_error_to_response(err: AdmissionError) -> axum::response::Response {
    let status = match &err {
        AdmissionError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AdmissionError::AmbiguousTenant => StatusCode::BAD_REQUEST,
        AdmissionError::TenantNotFound => StatusCode::NOT_FOUND,
        AdmissionError::TenantForbidden
        | AdmissionError::SubscriptionInactive
        | AdmissionError::LimitExceeded { .. }
        | AdmissionError::PermissionDenied(_) => StatusCode::FORBIDDEN,
    };
    json_error(status, err.code(), err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
