//! Admin dashboard counters.

use serde::Serialize;

use decorshop_catalog::Visibility;

use crate::store::{ProductStore, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total: u64,
    pub confirmed: u64,
    pub pending: u64,
}

/// Product counts by moderation state. The three counts are issued
/// concurrently; any failure fails the whole call.
pub async fn admin_stats<S>(store: &S) -> StoreResult<AdminStats>
where
    S: ProductStore + ?Sized,
{
    let (total, confirmed, pending) = tokio::try_join!(
        store.count_products(Visibility::Any),
        store.count_products(Visibility::Confirmed),
        store.count_products(Visibility::Pending),
    )?;
    Ok(AdminStats { total, confirmed, pending })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCatalogStore;
    use decorshop_catalog::NewProduct;
    use decorshop_core::ProductId;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn counts_split_by_state() {
        let store = InMemoryCatalogStore::new();
        for title in ["a", "b", "c", "d"] {
            store.insert_product(NewProduct::new(title, Decimal::TEN)).await.unwrap();
        }
        let confirm: Vec<ProductId> = [1, 2, 3].into_iter().filter_map(ProductId::from_raw).collect();
        store.set_confirmed(&confirm, true).await.unwrap();

        let stats = admin_stats(&store).await.unwrap();
        assert_eq!(stats, AdminStats { total: 4, confirmed: 3, pending: 1 });
        assert_eq!(stats.total, stats.confirmed + stats.pending);
    }

    #[tokio::test]
    async fn empty_catalog_is_all_zeroes() {
        let store = InMemoryCatalogStore::new();
        let stats = admin_stats(&store).await.unwrap();
        assert_eq!(stats, AdminStats { total: 0, confirmed: 0, pending: 0 });
    }
}
