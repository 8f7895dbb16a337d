use std::sync::Arc;

use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};

use decorshop_infra::{CategoryStore, ProductStore};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories/available", get(available_categories))
}

/// Active categories in display order, each with its subcategories.
pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Value>, ApiError> {
    let categories = services.store.list_categories(true).await?;
    Ok(Json(json!({ "success": true, "categories": categories })))
}

/// Category labels that currently have confirmed products, with counts.
pub async fn available_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Value>, ApiError> {
    let counts = services.store.category_counts().await?;
    Ok(Json(json!({ "success": true, "categories": counts })))
}
