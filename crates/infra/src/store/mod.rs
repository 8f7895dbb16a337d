//! Catalog persistence.
//!
//! The HTTP layer and the maintenance jobs only ever see `Arc<dyn CatalogStore>`;
//! [`InMemoryCatalogStore`] backs tests and local development, while
//! [`PostgresCatalogStore`] is the production implementation.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use decorshop_auth::PrincipalId;
use decorshop_catalog::{
    Category, CategoryAssignment, CategoryCount, NewCategory, NewProduct, Page, Product, ProductQuery, Subcategory,
    Visibility,
};
use decorshop_core::{CategoryId, ProductId};

use crate::config::StoreConfig;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

/// Catalog store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Product persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Filter, sort and paginate. `total` counts every match, not just the page.
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>>;

    /// Fetch a product regardless of its moderation state.
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Insert a new pending product.
    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product>;

    /// Set the confirmation flag on every existing product in `ids`.
    /// Returns the number of products matched; unknown ids are ignored.
    async fn set_confirmed(&self, ids: &[ProductId], confirmed: bool) -> StoreResult<u64>;

    /// Confirm every pending product. Returns how many were confirmed.
    async fn confirm_all_pending(&self) -> StoreResult<u64>;

    /// Delete every existing product in `ids`. Returns the number removed.
    async fn delete_products(&self, ids: &[ProductId]) -> StoreResult<u64>;

    /// Delete one product. Returns `false` when it did not exist.
    async fn delete_product(&self, id: ProductId) -> StoreResult<bool>;

    /// Stamp category fields onto a product. Returns `false` when it did not exist.
    async fn assign_category(&self, id: ProductId, assignment: &CategoryAssignment) -> StoreResult<bool>;

    async fn rename_product(&self, id: ProductId, title: &str) -> StoreResult<bool>;

    async fn count_products(&self, visibility: Visibility) -> StoreResult<u64>;

    /// Every product in the given visibility, ordered by id.
    async fn all_products(&self, visibility: Visibility) -> StoreResult<Vec<Product>>;

    /// Distinct non-empty category labels among confirmed products, by name.
    async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>>;
}

/// Category persistence.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Exact, case-sensitive name lookup.
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    /// Categories with their subcategories, by `sort_order` then name.
    async fn list_categories(&self, active_only: bool) -> StoreResult<Vec<Category>>;

    /// Every slug currently in use.
    async fn category_slugs(&self) -> StoreResult<Vec<String>>;

    /// Fails with [`StoreError::Conflict`] when the name or slug is taken.
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category>;

    async fn find_or_create_subcategory(&self, category_id: CategoryId, name: &str) -> StoreResult<Subcategory>;
}

/// Per-principal favorites.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Returns `false` when the product was already a favorite.
    async fn add_favorite(&self, owner: PrincipalId, id: ProductId) -> StoreResult<bool>;

    /// Returns `false` when the product was not a favorite.
    async fn remove_favorite(&self, owner: PrincipalId, id: ProductId) -> StoreResult<bool>;

    /// Confirmed favorites, most recently added first.
    async fn favorite_products(&self, owner: PrincipalId) -> StoreResult<Vec<Product>>;
}

/// Everything the storefront needs from storage.
pub trait CatalogStore: ProductStore + CategoryStore + FavoriteStore {}

impl<T> CatalogStore for T where T: ProductStore + CategoryStore + FavoriteStore {}

/// Open the store `config` selects. Postgres gets its schema applied first.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn CatalogStore>> {
    match config {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory catalog store");
            Ok(InMemoryCatalogStore::arc())
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresCatalogStore::connect(database_url, *max_connections).await?;
            store.migrate().await?;
            tracing::info!(max_connections, "using postgres catalog store");
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn in_memory_config_opens_an_empty_store() {
        let store = open_store(&StoreConfig::InMemory).await.unwrap();
        assert_eq!(store.count_products(Visibility::Any).await.unwrap(), 0);

        store.insert_product(NewProduct::new("Пуф", Decimal::from(2_500))).await.unwrap();
        assert_eq!(store.count_products(Visibility::Pending).await.unwrap(), 1);
    }
}
