use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod company_users;
pub mod customers;
pub mod locations;
pub mod orders;
pub mod products;
pub mod system;

/// Full routing tree. Public paths are enumerated in
/// [`crate::middleware::PUBLIC_PATHS`]; everything else goes through the
/// admission pipeline.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/demo-request", post(system::demo_request))
        .nest("/auth", auth::router())
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router())
        .nest("/locations", locations::router())
        .nest("/company/users", company_users::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
}
