use serde::Serialize;

use decorshop_catalog::{TitleRename, Visibility, plan_title_suffixes};
use decorshop_core::ProductId;

use crate::store::{ProductStore, StoreResult};

/// Give products that share an exact title distinct `" 2"`, `" 3"`, …
/// suffixes. The oldest product (lowest id) keeps its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameDuplicateTitlesJob {
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    pub dry_run: bool,
    pub renames: Vec<TitleRename>,
    pub applied: usize,
    pub failed: Vec<ProductId>,
}

impl RenameDuplicateTitlesJob {
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    pub fn apply() -> Self {
        Self { dry_run: false }
    }

    pub async fn run<S>(&self, store: &S) -> StoreResult<RenameReport>
    where
        S: ProductStore + ?Sized,
    {
        let products = store.all_products(Visibility::Any).await?;
        let renames = plan_title_suffixes(&products);
        tracing::info!(scanned = products.len(), planned = renames.len(), dry_run = self.dry_run, "title scan complete");

        let mut report = RenameReport {
            dry_run: self.dry_run,
            renames,
            applied: 0,
            failed: Vec::new(),
        };
        if self.dry_run {
            return Ok(report);
        }

        for rename in &report.renames {
            match store.rename_product(rename.id, &rename.to).await {
                Ok(true) => report.applied += 1,
                Ok(false) => tracing::debug!(product_id = %rename.id, "product vanished before rename"),
                Err(e) => {
                    tracing::warn!(product_id = %rename.id, error = %e, "failed to rename product");
                    report.failed.push(rename.id);
                }
            }
        }
        Ok(report)
    }
}
