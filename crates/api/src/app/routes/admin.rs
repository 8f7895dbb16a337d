use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query},
    routing::{get, post},
};
use serde_json::{Value, json};

use decorshop_auth::Permission;
use decorshop_catalog::filter::DEFAULT_PAGE_SIZE;
use decorshop_catalog::{BulkAction, CatalogQueryParams, ModerationTransition, ProductQuery, Visibility, sanitize_ids};
use decorshop_infra::jobs::DedupJob;
use decorshop_infra::{ProductStore, admin_stats, export_products, import_products};

use crate::app::dto::{
    self, ApproveAllRequest, BulkRequest, CategorizeRequest, DedupRequest, ModerationRequest, ProductListResponse,
    ProductView,
};
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::routes::gated;
use crate::app::services::AppServices;

pub fn router() -> Router {
    let moderate = Router::new()
        .route("/api/admin/products", get(list_products))
        .route("/api/admin/products/bulk", post(bulk))
        .route("/api/admin/products/approve-all", post(approve_all))
        .route("/api/admin/products/:id/moderation", post(moderate_product));

    let categorize = Router::new().route("/api/admin/products/:id/categorize", post(categorize_product));
    let exporting = Router::new().route("/api/admin/products/export", post(export));
    let importing = Router::new().route("/api/admin/products/import", post(import));
    let maintenance = Router::new().route("/api/admin/products/dedup", post(dedup));
    let dashboard = Router::new().route("/api/admin/stats", get(stats));

    Router::new()
        .merge(gated(moderate, Permission::CATALOG_MODERATE))
        .merge(gated(categorize, Permission::CATALOG_CATEGORIZE))
        .merge(gated(exporting, Permission::CATALOG_EXPORT))
        .merge(gated(importing, Permission::CATALOG_IMPORT))
        .merge(gated(maintenance, Permission::CATALOG_MAINTAIN))
        .merge(gated(dashboard, Permission::ADMIN_STATS_READ))
}

/// Moderation queue. `status` defaults to `pending`.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let visibility = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Visibility::Pending,
        Some(raw) => raw.parse::<Visibility>().map_err(|_| {
            ApiError::validation(format!("invalid status '{raw}' (expected pending, confirmed or all)"))
        })?,
    };

    let mut query = ProductQuery::from_params(&params, DEFAULT_PAGE_SIZE);
    query.visibility = visibility;
    let page = services.store.list_products(&query).await?;
    Ok(Json(page.into()))
}

pub async fn bulk(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<BulkRequest>,
) -> Result<Json<Value>, ApiError> {
    let action: BulkAction = body.action.parse()?;
    let ids = sanitize_ids(&body.product_ids);
    let outcome = services.moderation.bulk(action, &ids).await?;

    Ok(Json(json!({
        "success": true,
        "action": outcome.action,
        "requested": outcome.requested,
        "affected": outcome.affected,
    })))
}

pub async fn approve_all(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: ApproveAllRequest = dto::optional_json(&body)?;
    let approved = services.moderation.approve_all(body.ids()?).await?;
    Ok(Json(json!({ "success": true, "approved": approved })))
}

pub async fn moderate_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ModerationRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let transition: ModerationTransition = body.action.parse()?;
    let product = services.moderation.transition(id, transition).await?;
    Ok(Json(json!({ "success": true, "product": ProductView::from(product) })))
}

pub async fn categorize_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategorizeRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let outcome = services
        .moderation
        .categorize(id, &body.category, body.subcategory.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "product": ProductView::from(outcome.product),
        "category": outcome.category,
        "created": outcome.created,
    })))
}

pub async fn export(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Value>, ApiError> {
    let exported = export_products(&*services.store, &services.export_path).await?;
    Ok(Json(json!({
        "success": true,
        "exported": exported,
        "path": services.export_path.display().to_string(),
    })))
}

pub async fn import(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Value>, ApiError> {
    let report = import_products(&*services.store, &services.import_path).await?;
    Ok(Json(json!({
        "success": true,
        "created": report.created,
        "skipped": report.skipped,
    })))
}

/// Duplicate scan. Dry run unless the body says `{"apply": true}`.
pub async fn dedup(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let body: DedupRequest = dto::optional_json(&body)?;
    let job = if body.apply { DedupJob::apply() } else { DedupJob::dry_run() };
    let report = job.run(&*services.store).await?;

    Ok(Json(json!({
        "success": true,
        "dryRun": report.dry_run,
        "candidates": report.candidates,
        "deleted": report.deleted,
        "failed": report.failed,
    })))
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Value>, ApiError> {
    let stats = admin_stats(&*services.store).await?;
    Ok(Json(json!({
        "success": true,
        "total": stats.total,
        "confirmed": stats.confirmed,
        "pending": stats.pending,
    })))
}
