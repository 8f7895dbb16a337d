//! JSON catalog file import/export.
//!
//! File shape: `{ "products": [ ... ], "exportedAt": "<RFC 3339>" }`.
//! `exportedAt` is written on export and ignored on import.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use decorshop_catalog::{NewProduct, Visibility};

use crate::error::{ServiceError, ServiceResult};
use crate::store::ProductStore;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile<T> {
    pub products: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
}

/// Write every confirmed product to `path`. The file is replaced
/// atomically; parent directories are created as needed.
pub async fn export_products<S>(store: &S, path: &Path) -> ServiceResult<usize>
where
    S: ProductStore + ?Sized,
{
    let products = store.all_products(Visibility::Confirmed).await?;
    let file = CatalogFile {
        exported_at: Some(Utc::now()),
        products,
    };
    let body = serde_json::to_vec_pretty(&file).map_err(|source| ServiceError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ServiceError::io(parent, e))?;
    }
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, &body)
        .await
        .map_err(|e| ServiceError::io(&staging, e))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|e| ServiceError::io(path, e))?;

    tracing::info!(path = %path.display(), count = file.products.len(), "catalog exported");
    Ok(file.products.len())
}

/// Insert every valid record of `path` as a pending product. Records that
/// fail to parse or validate are skipped with a warning; a file that is not
/// a `{products: [...]}` document fails the whole import.
pub async fn import_products<S>(store: &S, path: &Path) -> ServiceResult<ImportReport>
where
    S: ProductStore + ?Sized,
{
    let raw = tokio::fs::read(path).await.map_err(|e| ServiceError::io(path, e))?;
    let file: CatalogFile<Value> = serde_json::from_slice(&raw).map_err(|source| ServiceError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = ImportReport::default();
    for (index, record) in file.products.into_iter().enumerate() {
        let input = match parse_record(record) {
            Ok(input) => input,
            Err(reason) => {
                tracing::warn!(index, %reason, "skipping catalog record");
                report.skipped += 1;
                continue;
            }
        };
        store.insert_product(input).await?;
        report.created += 1;
    }

    tracing::info!(
        path = %path.display(),
        created = report.created,
        skipped = report.skipped,
        "catalog imported"
    );
    Ok(report)
}

fn parse_record(record: Value) -> Result<NewProduct, String> {
    let input: NewProduct = serde_json::from_value(record).map_err(|e| e.to_string())?;
    input.validate().map_err(|e| e.to_string())?;
    Ok(input)
}
