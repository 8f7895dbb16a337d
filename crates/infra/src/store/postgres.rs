//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | `StoreError` |
//! |------------|-----------------|--------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (other) | any other | `Storage` |
//! | PoolClosed, IO, decode, ... | n/a | `Storage` |
//!
//! Text filters compile to `ILIKE '%needle%'` with `%`, `_` and `\` escaped,
//! so matching is the same case-insensitive substring test the in-memory
//! store applies.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use decorshop_auth::PrincipalId;
use decorshop_catalog::{
    Category, CategoryAssignment, CategoryCount, ListingKind, NewCategory, NewProduct, Page, Product, ProductQuery,
    SortOrder, Subcategory, Visibility, slugify,
};
use decorshop_core::{CategoryId, ProductId, SubcategoryId};

use super::{CategoryStore, FavoriteStore, ProductStore, StoreError, StoreResult};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const PRODUCT_COLUMNS: &str = "p.id, p.title, p.description, p.price, p.discount, p.category, p.category_id, \
     p.subcategory, p.material, p.country, p.barcode, p.image, p.images, p.quantity, p.reserved, \
     p.is_confirmed, p.created_at, p.updated_at";

/// Postgres catalog store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn subcategories_of(&self, category_ids: &[i64]) -> StoreResult<Vec<Subcategory>> {
        let rows = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            SELECT id, category_id, name, slug
            FROM subcategories
            WHERE category_id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(category_ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_subcategories", e))?;

        rows.into_iter().map(Subcategory::try_from).collect()
    }

    async fn with_subcategories(&self, rows: Vec<CategoryRow>) -> StoreResult<Vec<Category>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let subcategories = self.subcategories_of(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let mut category = Category::try_from(row)?;
                category.subcategories = subcategories
                    .iter()
                    .filter(|s| s.category_id == category.id)
                    .cloned()
                    .collect();
                Ok(category)
            })
            .collect()
    }
}

/// Append the `WHERE` clause for `query` (products aliased as `p`).
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    qb.push(" WHERE TRUE");
    push_visibility(qb, query.visibility);

    let filter = &query.filter;
    for (column, needle) in [
        ("p.title", &filter.search),
        ("p.category", &filter.category),
        ("p.material", &filter.material),
        ("p.country", &filter.country),
    ] {
        if let Some(needle) = needle {
            qb.push(format!(" AND {column} ILIKE ")).push_bind(like_pattern(needle));
        }
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ").push_bind(max);
    }
    if filter.kind == Some(ListingKind::Discount) {
        qb.push(" AND p.discount > 0");
    }
    if let Some(category) = &query.exact_category {
        qb.push(" AND p.category = ").push_bind(category.clone());
    }
    if let Some(excluded) = query.exclude {
        qb.push(" AND p.id <> ").push_bind(excluded.get());
    }
}

fn push_visibility(qb: &mut QueryBuilder<'_, Postgres>, visibility: Visibility) {
    match visibility {
        Visibility::Confirmed => qb.push(" AND p.is_confirmed"),
        Visibility::Pending => qb.push(" AND NOT p.is_confirmed"),
        Visibility::Any => qb,
    };
}

fn order_by(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Newest => " ORDER BY p.created_at DESC, p.id DESC",
        SortOrder::PriceAsc => " ORDER BY p.price ASC, p.id ASC",
        SortOrder::PriceDesc => " ORDER BY p.price DESC, p.id ASC",
        SortOrder::DiscountDesc => " ORDER BY p.discount DESC, p.created_at DESC, p.id DESC",
    }
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn raw_ids(ids: &[ProductId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

#[async_trait]
impl ProductStore for PostgresCatalogStore {
    #[instrument(skip(self, query), fields(visibility = ?query.visibility), err)]
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
        push_conditions(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products p"));
        push_conditions(&mut select, query);
        select.push(order_by(query.effective_sort()));
        select.push(" LIMIT ").push_bind(i64::from(query.page.limit));
        select.push(" OFFSET ").push_bind(i64::from(query.page.offset));

        let rows = select
            .build_query_as::<ProductRow>()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(Page {
            items: rows.into_iter().map(Product::try_from).collect::<StoreResult<_>>()?,
            total: total.max(0) as u64,
            limit: query.page.limit,
            offset: query.page.offset,
        })
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self, product), fields(title = %product.title), err)]
    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        let product = product.normalized();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            WITH p AS (
                INSERT INTO products (
                    title, description, price, discount, category, subcategory,
                    material, country, barcode, image, images, quantity
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS} FROM p
            "#
        ))
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.discount)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(&product.material)
        .bind(&product.country)
        .bind(&product.barcode)
        .bind(&product.image)
        .bind(&product.images)
        .bind(product.quantity)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Product::try_from(row)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn set_confirmed(&self, ids: &[ProductId], confirmed: bool) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE products SET is_confirmed = $1, updated_at = NOW() WHERE id = ANY($2)")
            .bind(confirmed)
            .bind(raw_ids(ids))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_confirmed", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn confirm_all_pending(&self) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE products SET is_confirmed = TRUE, updated_at = NOW() WHERE NOT is_confirmed")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("confirm_all_pending", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn delete_products(&self, ids: &[ProductId]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM products WHERE id = ANY($1)")
            .bind(raw_ids(ids))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_products", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_category(&self, id: ProductId, assignment: &CategoryAssignment) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET category = $1, category_id = $2, subcategory = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&assignment.category)
        .bind(assignment.category_id.get())
        .bind(&assignment.subcategory)
        .bind(id.get())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("assign_category", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn rename_product(&self, id: ProductId, title: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE products SET title = $1, updated_at = NOW() WHERE id = $2")
            .bind(title)
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("rename_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products(&self, visibility: Visibility) -> StoreResult<u64> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p WHERE TRUE");
        push_visibility(&mut count, visibility);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;
        Ok(total.max(0) as u64)
    }

    async fn all_products(&self, visibility: Visibility) -> StoreResult<Vec<Product>> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE TRUE"));
        push_visibility(&mut select, visibility);
        select.push(" ORDER BY p.id");
        let rows = select
            .build_query_as::<ProductRow>()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("all_products", e))?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT category, COUNT(*)
            FROM products
            WHERE is_confirmed AND category IS NOT NULL AND category <> ''
            GROUP BY category
            ORDER BY category
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("category_counts", e))?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| CategoryCount { name, count: count.max(0) as u64 })
            .collect())
    }
}

#[async_trait]
impl CategoryStore for PostgresCatalogStore {
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, is_active, sort_order FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_category_by_name", e))?;

        match row {
            Some(row) => Ok(self.with_subcategories(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn list_categories(&self, active_only: bool) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, is_active, sort_order
            FROM categories
            WHERE is_active OR NOT $1
            ORDER BY sort_order, name
            "#,
        )
        .bind(active_only)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        self.with_subcategories(rows).await
    }

    async fn category_slugs(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM categories")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("category_slugs", e))
    }

    #[instrument(skip(self, category), fields(name = %category.name, slug = %category.slug), err)]
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, slug, is_active, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, is_active, sort_order
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.is_active)
        .bind(category.sort_order)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_category", e))?;

        Category::try_from(row)
    }

    async fn find_or_create_subcategory(&self, category_id: CategoryId, name: &str) -> StoreResult<Subcategory> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            INSERT INTO subcategories (category_id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (category_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, category_id, name, slug
            "#,
        )
        .bind(category_id.get())
        .bind(name)
        .bind(slugify(name))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_or_create_subcategory", e))?;

        Subcategory::try_from(row)
    }
}

#[async_trait]
impl FavoriteStore for PostgresCatalogStore {
    async fn add_favorite(&self, owner: PrincipalId, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO favorites (owner_id, product_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(*owner.as_uuid())
        .bind(id.get())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_favorite", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_favorite(&self, owner: PrincipalId, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE owner_id = $1 AND product_id = $2")
            .bind(*owner.as_uuid())
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_favorite", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn favorite_products(&self, owner: PrincipalId) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM favorites f
            JOIN products p ON p.id = f.product_id
            WHERE f.owner_id = $1 AND p.is_confirmed
            ORDER BY f.created_at DESC, p.id DESC
            "#
        ))
        .bind(*owner.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("favorite_products", e))?;

        rows.into_iter().map(Product::try_from).collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(msg),
                _ => {
                    tracing::error!(operation, error = %msg, "catalog query failed");
                    StoreError::Storage(msg)
                }
            }
        }
        sqlx::Error::PoolClosed => StoreError::Storage(format!("connection pool closed in {}", operation)),
        other => {
            tracing::error!(operation, error = %other, "catalog query failed");
            StoreError::Storage(format!("{} failed: {}", operation, other))
        }
    }
}

fn invalid_id(table: &str, raw: i64) -> StoreError {
    StoreError::Storage(format!("non-positive id {raw} in {table}"))
}

#[derive(Debug)]
struct ProductRow {
    id: i64,
    title: String,
    description: Option<String>,
    price: Decimal,
    discount: i32,
    category: Option<String>,
    category_id: Option<i64>,
    subcategory: Option<String>,
    material: Option<String>,
    country: Option<String>,
    barcode: Option<String>,
    image: Option<String>,
    images: Vec<String>,
    quantity: i32,
    reserved: i32,
    is_confirmed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            discount: row.try_get("discount")?,
            category: row.try_get("category")?,
            category_id: row.try_get("category_id")?,
            subcategory: row.try_get("subcategory")?,
            material: row.try_get("material")?,
            country: row.try_get("country")?,
            barcode: row.try_get("barcode")?,
            image: row.try_get("image")?,
            images: row.try_get("images")?,
            quantity: row.try_get("quantity")?,
            reserved: row.try_get("reserved")?,
            is_confirmed: row.try_get("is_confirmed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from_raw(row.id).ok_or_else(|| invalid_id("products", row.id))?,
            title: row.title,
            description: row.description,
            price: row.price,
            discount: row.discount,
            category: row.category,
            category_id: row.category_id.and_then(CategoryId::from_raw),
            subcategory: row.subcategory,
            material: row.material,
            country: row.country,
            barcode: row.barcode,
            image: row.image,
            images: row.images,
            quantity: row.quantity,
            reserved: row.reserved,
            is_confirmed: row.is_confirmed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    is_active: bool,
    sort_order: i32,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            is_active: row.try_get("is_active")?,
            sort_order: row.try_get("sort_order")?,
        })
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = StoreError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: CategoryId::from_raw(row.id).ok_or_else(|| invalid_id("categories", row.id))?,
            name: row.name,
            slug: row.slug,
            is_active: row.is_active,
            sort_order: row.sort_order,
            subcategories: Vec::new(),
        })
    }
}

#[derive(Debug)]
struct SubcategoryRow {
    id: i64,
    category_id: i64,
    name: String,
    slug: String,
}

impl<'r> sqlx::FromRow<'r, PgRow> for SubcategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SubcategoryRow {
            id: row.try_get("id")?,
            category_id: row.try_get("category_id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
        })
    }
}

impl TryFrom<SubcategoryRow> for Subcategory {
    type Error = StoreError;

    fn try_from(row: SubcategoryRow) -> Result<Self, Self::Error> {
        Ok(Subcategory {
            id: SubcategoryId::from_raw(row.id).ok_or_else(|| invalid_id("subcategories", row.id))?,
            category_id: CategoryId::from_raw(row.category_id)
                .ok_or_else(|| invalid_id("subcategories", row.category_id))?,
            name: row.name,
            slug: row.slug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decorshop_catalog::{CatalogQueryParams, PageRequest};

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ваза"), "%ваза%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn builds_filtered_listing_sql() {
        let params = CatalogQueryParams {
            search: Some("ваза".into()),
            min_price: Some("100".into()),
            kind: Some("discount".into()),
            ..Default::default()
        };
        let mut query = ProductQuery::from_params(&params, 20);
        query.page = PageRequest::new(5, 10);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
        push_conditions(&mut qb, &query);
        qb.push(order_by(query.effective_sort()));
        let sql = qb.sql();

        assert!(sql.contains("p.is_confirmed"));
        assert!(sql.contains("p.title ILIKE $1"));
        assert!(sql.contains("p.price >= $2"));
        assert!(sql.contains("p.discount > 0"));
        assert!(sql.ends_with("ORDER BY p.discount DESC, p.created_at DESC, p.id DESC"));
        assert!(!sql.contains("p.material"));
    }

    #[test]
    fn similar_query_excludes_the_source_product() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM products p");
        let query = ProductQuery {
            exact_category: Some("Вазы".into()),
            exclude: ProductId::from_raw(7),
            ..Default::default()
        };
        push_conditions(&mut qb, &query);
        let sql = qb.sql();
        assert!(sql.contains("p.category = $1"));
        assert!(sql.contains("p.id <> $2"));
    }

    #[test]
    fn unique_violation_maps_to_conflict_and_others_to_storage() {
        assert!(matches!(map_sqlx_error("op", sqlx::Error::PoolClosed), StoreError::Storage(_)));
        assert!(matches!(map_sqlx_error("op", sqlx::Error::RowNotFound), StoreError::Storage(_)));
    }
}
