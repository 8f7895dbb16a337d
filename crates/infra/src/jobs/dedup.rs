use serde::Serialize;

use decorshop_catalog::{DuplicateCandidate, Visibility, find_duplicate_candidates};
use decorshop_core::ProductId;

use crate::store::{ProductStore, StoreResult};

/// Remove pending products that duplicate confirmed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupJob {
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupReport {
    pub dry_run: bool,
    pub candidates: Vec<DuplicateCandidate>,
    pub deleted: Vec<ProductId>,
    pub failed: Vec<ProductId>,
}

impl DedupJob {
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    pub fn apply() -> Self {
        Self { dry_run: false }
    }

    pub async fn run<S>(&self, store: &S) -> StoreResult<DedupReport>
    where
        S: ProductStore + ?Sized,
    {
        let (confirmed, pending) = tokio::try_join!(
            store.all_products(Visibility::Confirmed),
            store.all_products(Visibility::Pending),
        )?;
        let candidates = find_duplicate_candidates(&confirmed, &pending);
        tracing::info!(
            confirmed = confirmed.len(),
            pending = pending.len(),
            candidates = candidates.len(),
            dry_run = self.dry_run,
            "duplicate scan complete"
        );

        let mut report = DedupReport {
            dry_run: self.dry_run,
            candidates,
            deleted: Vec::new(),
            failed: Vec::new(),
        };
        if self.dry_run {
            return Ok(report);
        }

        for candidate in &report.candidates {
            let id = candidate.pending_id;
            match store.delete_product(id).await {
                Ok(true) => {
                    tracing::info!(product_id = %id, matched_id = %candidate.matched_id, reason = ?candidate.reason, "duplicate deleted");
                    report.deleted.push(id);
                }
                Ok(false) => tracing::debug!(product_id = %id, "duplicate already gone"),
                Err(e) => {
                    tracing::warn!(product_id = %id, error = %e, "failed to delete duplicate");
                    report.failed.push(id);
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCatalogStore, StoreError};
    use async_trait::async_trait;
    use decorshop_catalog::{CategoryAssignment, CategoryCount, NewProduct, Page, Product, ProductQuery};
    use rust_decimal::Decimal;

    /// Delegates to the in-memory store but refuses to delete one id.
    struct FlakyStore {
        inner: InMemoryCatalogStore,
        undeletable: ProductId,
    }

    #[async_trait]
    impl ProductStore for FlakyStore {
        async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
            self.inner.list_products(query).await
        }
        async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
            self.inner.get_product(id).await
        }
        async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
            self.inner.insert_product(product).await
        }
        async fn set_confirmed(&self, ids: &[ProductId], confirmed: bool) -> StoreResult<u64> {
            self.inner.set_confirmed(ids, confirmed).await
        }
        async fn confirm_all_pending(&self) -> StoreResult<u64> {
            self.inner.confirm_all_pending().await
        }
        async fn delete_products(&self, ids: &[ProductId]) -> StoreResult<u64> {
            self.inner.delete_products(ids).await
        }
        async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
            if id == self.undeletable {
                return Err(StoreError::Storage("row locked".into()));
            }
            self.inner.delete_product(id).await
        }
        async fn assign_category(&self, id: ProductId, assignment: &CategoryAssignment) -> StoreResult<bool> {
            self.inner.assign_category(id, assignment).await
        }
        async fn rename_product(&self, id: ProductId, title: &str) -> StoreResult<bool> {
            self.inner.rename_product(id, title).await
        }
        async fn count_products(&self, visibility: Visibility) -> StoreResult<u64> {
            self.inner.count_products(visibility).await
        }
        async fn all_products(&self, visibility: Visibility) -> StoreResult<Vec<Product>> {
            self.inner.all_products(visibility).await
        }
        async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>> {
            self.inner.category_counts().await
        }
    }

    fn pid(raw: i64) -> ProductId {
        ProductId::from_raw(raw).unwrap()
    }

    /// 1 confirmed "Ваза" 500; 2..=4 pending: 2 and 4 duplicate 1, 3 does not.
    async fn seeded() -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        for (title, price) in [("Ваза", 500), ("ваза!", 500), ("Ваза", 900), ("  ВАЗА ", 500)] {
            store.insert_product(NewProduct::new(title, Decimal::from(price))).await.unwrap();
        }
        store.set_confirmed(&[pid(1)], true).await.unwrap();
        store
    }

    #[tokio::test]
    async fn dry_run_reports_without_deleting() {
        let store = seeded().await;
        let first = DedupJob::dry_run().run(&store).await.unwrap();
        let second = DedupJob::dry_run().run(&store).await.unwrap();

        assert_eq!(first, second);
        let flagged: Vec<ProductId> = first.candidates.iter().map(|c| c.pending_id).collect();
        assert_eq!(flagged, vec![pid(2), pid(4)]);
        assert!(first.deleted.is_empty());
        assert_eq!(store.count_products(Visibility::Any).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn apply_deletes_only_candidates() {
        let store = seeded().await;
        let report = DedupJob::apply().run(&store).await.unwrap();
        assert_eq!(report.deleted, vec![pid(2), pid(4)]);
        assert!(report.failed.is_empty());

        let remaining: Vec<ProductId> = store
            .all_products(Visibility::Any)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(remaining, vec![pid(1), pid(3)]);
    }

    #[tokio::test]
    async fn one_failed_deletion_does_not_stop_the_rest() {
        let store = FlakyStore {
            inner: seeded().await,
            undeletable: pid(2),
        };
        let report = DedupJob::apply().run(&store).await.unwrap();
        assert_eq!(report.failed, vec![pid(2)]);
        assert_eq!(report.deleted, vec![pid(4)]);
        assert!(store.get_product(pid(2)).await.unwrap().is_some());
    }
}
