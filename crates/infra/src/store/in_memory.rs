//! In-memory catalog store for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use decorshop_auth::PrincipalId;
use decorshop_catalog::{
    Category, CategoryAssignment, CategoryCount, NewCategory, NewProduct, Page, Product, ProductQuery, Subcategory,
    Visibility, slugify,
};
use decorshop_core::{CategoryId, ProductId, SubcategoryId};

use super::{CategoryStore, FavoriteStore, ProductStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    /// Insertion order, oldest first.
    favorites: HashMap<PrincipalId, Vec<ProductId>>,
    last_product_id: i64,
    last_category_id: i64,
    last_subcategory_id: i64,
}

/// Catalog store backed by process memory. Ids are assigned sequentially
/// starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<State>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Storage("catalog lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Storage("catalog lock poisoned".into()))
    }
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

fn id_exhausted(kind: &str) -> StoreError {
    StoreError::Storage(format!("{kind} id sequence exhausted"))
}

#[async_trait]
impl ProductStore for InMemoryCatalogStore {
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
        let state = self.read()?;
        Ok(query.apply(state.products.values()))
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut state = self.write()?;
        let id = ProductId::from_raw(next_id(&mut state.last_product_id)).ok_or_else(|| id_exhausted("product"))?;
        let product = product.into_product(id, Utc::now());
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn set_confirmed(&self, ids: &[ProductId], confirmed: bool) -> StoreResult<u64> {
        let mut state = self.write()?;
        let now = Utc::now();
        let mut affected = 0;
        for id in ids {
            if let Some(product) = state.products.get_mut(id) {
                product.is_confirmed = confirmed;
                product.updated_at = now;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn confirm_all_pending(&self) -> StoreResult<u64> {
        let mut state = self.write()?;
        let now = Utc::now();
        let mut affected = 0;
        for product in state.products.values_mut().filter(|p| !p.is_confirmed) {
            product.is_confirmed = true;
            product.updated_at = now;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_products(&self, ids: &[ProductId]) -> StoreResult<u64> {
        let mut state = self.write()?;
        let removed = ids.iter().filter(|id| state.products.remove(*id).is_some()).count();
        for favorites in state.favorites.values_mut() {
            favorites.retain(|id| !ids.contains(id));
        }
        Ok(removed as u64)
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.delete_products(&[id]).await? == 1)
    }

    async fn assign_category(&self, id: ProductId, assignment: &CategoryAssignment) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(false);
        };
        product.category = Some(assignment.category.clone());
        product.category_id = Some(assignment.category_id);
        product.subcategory = assignment.subcategory.clone();
        product.updated_at = Utc::now();
        Ok(true)
    }

    async fn rename_product(&self, id: ProductId, title: &str) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(false);
        };
        product.title = title.to_string();
        product.updated_at = Utc::now();
        Ok(true)
    }

    async fn count_products(&self, visibility: Visibility) -> StoreResult<u64> {
        let state = self.read()?;
        Ok(state.products.values().filter(|p| visibility.allows(p)).count() as u64)
    }

    async fn all_products(&self, visibility: Visibility) -> StoreResult<Vec<Product>> {
        let state = self.read()?;
        Ok(state.products.values().filter(|p| visibility.allows(p)).cloned().collect())
    }

    async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>> {
        let state = self.read()?;
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for product in state.products.values().filter(|p| p.is_confirmed) {
            if let Some(name) = product.category.as_deref().filter(|c| !c.is_empty()) {
                *counts.entry(name).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(name, count)| CategoryCount { name: name.to_string(), count })
            .collect())
    }
}

#[async_trait]
impl CategoryStore for InMemoryCatalogStore {
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let state = self.read()?;
        Ok(state.categories.values().find(|c| c.name == name).cloned())
    }

    async fn list_categories(&self, active_only: bool) -> StoreResult<Vec<Category>> {
        let state = self.read()?;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.is_active || !active_only)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn category_slugs(&self) -> StoreResult<Vec<String>> {
        let state = self.read()?;
        Ok(state.categories.values().map(|c| c.slug.clone()).collect())
    }

    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .categories
            .values()
            .find(|c| c.name == category.name || c.slug == category.slug)
        {
            return Err(StoreError::Conflict(format!("category '{}' already exists", existing.name)));
        }

        let id = CategoryId::from_raw(next_id(&mut state.last_category_id)).ok_or_else(|| id_exhausted("category"))?;
        let created = Category {
            id,
            name: category.name,
            slug: category.slug,
            is_active: category.is_active,
            sort_order: category.sort_order,
            subcategories: Vec::new(),
        };
        state.categories.insert(id, created.clone());
        Ok(created)
    }

    async fn find_or_create_subcategory(&self, category_id: CategoryId, name: &str) -> StoreResult<Subcategory> {
        let mut state = self.write()?;
        let State {
            categories,
            last_subcategory_id,
            ..
        } = &mut *state;
        let category = categories
            .get_mut(&category_id)
            .ok_or_else(|| StoreError::NotFound(format!("category {category_id}")))?;

        if let Some(existing) = category.subcategories.iter().find(|s| s.name == name) {
            return Ok(existing.clone());
        }

        let id = SubcategoryId::from_raw(next_id(last_subcategory_id)).ok_or_else(|| id_exhausted("subcategory"))?;
        let created = Subcategory {
            id,
            category_id,
            name: name.to_string(),
            slug: slugify(name),
        };
        category.subcategories.push(created.clone());
        category.subcategories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(created)
    }
}

#[async_trait]
impl FavoriteStore for InMemoryCatalogStore {
    async fn add_favorite(&self, owner: PrincipalId, id: ProductId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if !state.products.contains_key(&id) {
            return Err(StoreError::NotFound(format!("product {id}")));
        }
        let favorites = state.favorites.entry(owner).or_default();
        if favorites.contains(&id) {
            return Ok(false);
        }
        favorites.push(id);
        Ok(true)
    }

    async fn remove_favorite(&self, owner: PrincipalId, id: ProductId) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(favorites) = state.favorites.get_mut(&owner) else {
            return Ok(false);
        };
        let before = favorites.len();
        favorites.retain(|f| *f != id);
        Ok(favorites.len() != before)
    }

    async fn favorite_products(&self, owner: PrincipalId) -> StoreResult<Vec<Product>> {
        let state = self.read()?;
        let Some(favorites) = state.favorites.get(&owner) else {
            return Ok(Vec::new());
        };
        Ok(favorites
            .iter()
            .rev()
            .filter_map(|id| state.products.get(id))
            .filter(|p| p.is_confirmed)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decorshop_catalog::{CatalogQueryParams, PageRequest, SortOrder};
    use rust_decimal::Decimal;

    async fn seeded() -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        for (title, price) in [("Ваза", 500), ("Стол", 12_000), ("Лампа", 2_500)] {
            store.insert_product(NewProduct::new(title, Decimal::from(price))).await.unwrap();
        }
        store
    }

    fn pid(raw: i64) -> ProductId {
        ProductId::from_raw(raw).unwrap()
    }

    #[tokio::test]
    async fn inserts_are_pending_with_sequential_ids() {
        let store = seeded().await;
        let all = store.all_products(Visibility::Any).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id.get()).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(all.iter().all(|p| !p.is_confirmed));
        assert_eq!(store.count_products(Visibility::Confirmed).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_confirmed_ignores_unknown_ids() {
        let store = seeded().await;
        let affected = store.set_confirmed(&[pid(1), pid(3), pid(99)], true).await.unwrap();
        assert_eq!(affected, 2);
        assert_eq!(store.count_products(Visibility::Confirmed).await.unwrap(), 2);
        assert_eq!(store.count_products(Visibility::Pending).await.unwrap(), 1);

        assert_eq!(store.confirm_all_pending().await.unwrap(), 1);
        assert_eq!(store.confirm_all_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_counts_total_beyond_page() {
        let store = seeded().await;
        store.confirm_all_pending().await.unwrap();

        let mut query = ProductQuery::from_params(&CatalogQueryParams::default(), 20);
        query.page = PageRequest::new(2, 0);
        query.sort = SortOrder::PriceAsc;
        let page = store.list_products(&query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "Ваза");
    }

    #[tokio::test]
    async fn delete_drops_favorites() {
        let store = seeded().await;
        store.confirm_all_pending().await.unwrap();
        let owner = PrincipalId::new();
        assert!(store.add_favorite(owner, pid(2)).await.unwrap());
        assert!(!store.add_favorite(owner, pid(2)).await.unwrap());

        assert!(store.delete_product(pid(2)).await.unwrap());
        assert!(!store.delete_product(pid(2)).await.unwrap());
        assert!(store.favorite_products(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn favorites_hide_unconfirmed_products() {
        let store = seeded().await;
        store.set_confirmed(&[pid(1), pid(2)], true).await.unwrap();
        let owner = PrincipalId::new();
        store.add_favorite(owner, pid(1)).await.unwrap();
        store.add_favorite(owner, pid(2)).await.unwrap();
        store.set_confirmed(&[pid(1)], false).await.unwrap();

        let favorites = store.favorite_products(owner).await.unwrap();
        assert_eq!(favorites.iter().map(|p| p.id).collect::<Vec<_>>(), vec![pid(2)]);
        assert!(store.remove_favorite(owner, pid(1)).await.unwrap());
        assert!(!store.remove_favorite(owner, pid(1)).await.unwrap());
    }

    #[tokio::test]
    async fn category_names_and_slugs_are_unique() {
        let store = InMemoryCatalogStore::new();
        let created = store
            .create_category(NewCategory::from_name("Текстиль", |_| false).unwrap())
            .await
            .unwrap();
        assert_eq!(created.slug, "текстиль");

        let duplicate = store.create_category(NewCategory::from_name("Текстиль", |_| false).unwrap()).await;
        assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

        let sub = store.find_or_create_subcategory(created.id, "Пледы").await.unwrap();
        let again = store.find_or_create_subcategory(created.id, "Пледы").await.unwrap();
        assert_eq!(sub, again);
        let listed = store.list_categories(true).await.unwrap();
        assert_eq!(listed[0].subcategories.len(), 1);
    }

    #[tokio::test]
    async fn category_counts_cover_confirmed_only() {
        let store = InMemoryCatalogStore::new();
        for (title, category) in [("a", "Вазы"), ("b", "Вазы"), ("c", "Столы"), ("d", "")] {
            let mut input = NewProduct::new(title, Decimal::ONE);
            input.category = Some(category.to_string());
            store.insert_product(input).await.unwrap();
        }
        store.set_confirmed(&[pid(1), pid(2), pid(4)], true).await.unwrap();

        let counts = store.category_counts().await.unwrap();
        assert_eq!(counts, vec![CategoryCount { name: "Вазы".into(), count: 2 }]);
    }
}
