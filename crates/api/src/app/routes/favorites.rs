use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::{get, post},
};
use serde_json::{Value, json};

use decorshop_auth::Permission;
use decorshop_infra::{FavoriteStore, ProductStore};

use crate::app::dto::{self, ProductView};
use crate::app::errors::ApiError;
use crate::app::routes::gated;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    gated(
        Router::new()
            .route("/api/favorites", get(list_favorites))
            .route("/api/favorites/:id", post(add_favorite).delete(remove_favorite)),
        Permission::FAVORITES_MANAGE,
    )
}

pub async fn list_favorites(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Value>, ApiError> {
    let products: Vec<ProductView> = services
        .store
        .favorite_products(principal.principal_id())
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect();
    Ok(Json(json!({ "success": true, "products": products })))
}

pub async fn add_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    // Pending products are invisible to customers, so they cannot be favorited.
    services
        .store
        .get_product(id)
        .await?
        .filter(|p| p.is_visible())
        .ok_or_else(|| ApiError::not_found("product"))?;

    let added = services.store.add_favorite(principal.principal_id(), id).await?;
    Ok(Json(json!({ "success": true, "added": added })))
}

pub async fn remove_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let removed = services.store.remove_favorite(principal.principal_id(), id).await?;
    Ok(Json(json!({ "success": true, "removed": removed })))
}
