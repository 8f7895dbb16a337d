use axum::{Router, routing::get};

use decorshop_auth::Permission;

use crate::middleware;

pub mod admin;
pub mod categories;
pub mod favorites;
pub mod products;
pub mod system;

/// Storefront endpoints: no token needed.
pub fn public_router() -> Router {
    Router::new().merge(products::router()).merge(categories::router())
}

/// Endpoints behind `auth_middleware`; capability gates are per route group.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/whoami", get(system::whoami))
        .merge(favorites::router())
        .merge(admin::router())
}

/// Gate every route of `router` on `required`.
pub(crate) fn gated(router: Router, required: Permission) -> Router {
    router.route_layer(axum::middleware::from_fn_with_state(
        required,
        middleware::require_capability,
    ))
}
