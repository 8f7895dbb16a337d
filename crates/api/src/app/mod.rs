//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared service handle
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `extract.rs`: JSON body extractor with API-shaped rejections
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use decorshop_auth::Hs256JwtValidator;
use decorshop_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_router(services, &config.jwt_secret))
}

/// Router over already-built services. Tests use this with an in-memory store.
pub fn build_router(services: Arc<AppServices>, jwt_secret: &str) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
