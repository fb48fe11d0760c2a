//! HTTP application wiring (Axum router + middleware stack).
//!
//! Layout:
//! - `services.rs`: store wiring and shared state
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `records.rs`: tenant-scoped CRUD records
//! - `dto.rs`: request DTOs and the success envelope
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod records;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(config: AppConfig) -> Router {
    build_app_with(Arc::new(services::build_services(config)))
}

/// Build the router around pre-constructed services. Useful when the caller
/// needs to seed stores before the server starts.
///
/// The `ServiceBuilder` stack runs top-down: authentication, then tenant
/// resolution, then the subscription gate, then the handler.
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                services.clone(),
                middleware::auth_middleware,
            ))
            .layer(axum::middleware::from_fn_with_state(
                services.clone(),
                middleware::tenant_middleware,
            ))
            .layer(axum::middleware::from_fn(middleware::subscription_gate))
            .layer(axum::Extension(services)),
    )
}
