use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    routing::get,
};
use serde_json::{Value, json};

use decorshop_catalog::filter::DEFAULT_PAGE_SIZE;
use decorshop_catalog::{CatalogQueryParams, ListingKind, Page, PageRequest, ProductQuery, SortOrder};
use decorshop_infra::ProductStore;

use crate::app::dto::{self, ProductListResponse, ProductView, SimilarQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

const NEW_ARRIVALS_LIMIT: u32 = 12;
const SIMILAR_LIMIT: u32 = 8;

pub fn router() -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/new", get(new_arrivals))
        .route("/api/products/promotions", get(promotions))
        .route("/api/products/similar", get(similar_products))
        .route("/api/products/:id", get(get_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let query = ProductQuery::from_params(&params, DEFAULT_PAGE_SIZE);
    let page = services.store.list_products(&query).await?;
    Ok(Json(page.into()))
}

pub async fn new_arrivals(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let mut query = ProductQuery::from_params(&params, NEW_ARRIVALS_LIMIT);
    query.filter.kind = Some(ListingKind::New);
    query.sort = SortOrder::Newest;
    let page = services.store.list_products(&query).await?;
    Ok(Json(page.into()))
}

pub async fn promotions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let mut query = ProductQuery::from_params(&params, DEFAULT_PAGE_SIZE);
    query.filter.kind = Some(ListingKind::Discount);
    let page = services.store.list_products(&query).await?;
    Ok(Json(page.into()))
}

pub async fn similar_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<SimilarQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let raw_id = params
        .product_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("productId is required"))?;
    let id = dto::parse_product_id(raw_id)?;
    let limit = params
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<u32>().ok())
        .unwrap_or(SIMILAR_LIMIT);

    let product = services
        .store
        .get_product(id)
        .await?
        .filter(|p| p.is_visible())
        .ok_or_else(|| ApiError::not_found("product"))?;

    let page = match ProductQuery::similar_to(&product, limit) {
        Some(query) => services.store.list_products(&query).await?,
        None => {
            let page = PageRequest::new(limit, 0);
            Page {
                items: Vec::new(),
                total: 0,
                limit: page.limit,
                offset: page.offset,
            }
        }
    };
    Ok(Json(page.into()))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let product = services
        .store
        .get_product(id)
        .await?
        .filter(|p| p.is_visible())
        .ok_or_else(|| ApiError::not_found("product"))?;

    Ok(Json(json!({
        "success": true,
        "product": ProductView::from(product),
    })))
}
