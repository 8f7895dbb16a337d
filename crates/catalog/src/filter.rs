//! Catalog query model: filters, sorting, paging and visibility.
//!
//! `ProductQuery::apply` is the reference evaluation used by the in-memory
//! store; the SQL store builds the equivalent predicate.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use decorshop_core::ProductId;

use crate::product::Product;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw query-string parameters, exactly as clients send them.
///
/// Everything is a string so malformed values can be ignored instead of
/// failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQueryParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub material: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub page: Option<String>,
    /// Admin listings only: `pending`, `confirmed` or `all`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    New,
    Discount,
}

impl FromStr for ListingKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "discount" => Ok(Self::Discount),
            _ => Err(()),
        }
    }
}

/// Parsed, typed product filter. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub material: Option<String>,
    pub country: Option<String>,
    pub kind: Option<ListingKind>,
}

impl CatalogFilter {
    pub fn from_params(params: &CatalogQueryParams) -> Self {
        Self {
            search: text_param(params.search.as_deref()),
            category: text_param(params.category.as_deref()),
            min_price: parse_price(params.min_price.as_deref()),
            max_price: parse_price(params.max_price.as_deref()),
            material: text_param(params.material.as_deref()),
            country: text_param(params.country.as_deref()),
            kind: params.kind.as_deref().and_then(|k| k.parse().ok()),
        }
    }

    /// Text filters are case-insensitive substring matches; price bounds
    /// are inclusive.
    pub fn matches(&self, product: &Product) -> bool {
        let text_ok = [
            (&self.search, Some(product.title.as_str())),
            (&self.category, product.category.as_deref()),
            (&self.material, product.material.as_deref()),
            (&self.country, product.country.as_deref()),
        ]
        .into_iter()
        .all(|(needle, haystack)| match needle {
            Some(needle) => contains_ci(haystack, needle),
            None => true,
        });

        text_ok
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && (self.kind != Some(ListingKind::Discount) || product.discount > 0)
    }
}

fn text_param(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parse a price bound. Only finite numbers count; anything else is ignored.
pub fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(exact) = Decimal::from_str(raw) {
        return Some(exact);
    }
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Biggest discount first, newest among equals.
    DiscountDesc,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" | "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "discount" | "discount_desc" => Ok(Self::DiscountDesc),
            _ => Err(()),
        }
    }
}

impl SortOrder {
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        let newest = |a: &Product, b: &Product| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        };
        match self {
            SortOrder::Newest => newest(a, b),
            SortOrder::PriceAsc => a.price.cmp(&b.price).then_with(|| a.id.cmp(&b.id)),
            SortOrder::PriceDesc => b.price.cmp(&a.price).then_with(|| a.id.cmp(&b.id)),
            SortOrder::DiscountDesc => b.discount.cmp(&a.discount).then_with(|| newest(a, b)),
        }
    }
}

/// Which moderation states a query may return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Confirmed,
    Pending,
    Any,
}

impl Visibility {
    pub fn allows(self, product: &Product) -> bool {
        match self {
            Visibility::Confirmed => product.is_confirmed,
            Visibility::Pending => !product.is_confirmed,
            Visibility::Any => true,
        }
    }
}

impl FromStr for Visibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "pending" => Ok(Self::Pending),
            "all" | "any" => Ok(Self::Any),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset,
        }
    }

    /// Read `limit`, `offset` and 1-based `page`; malformed values fall back
    /// to defaults. `offset` wins over `page` when both are present.
    pub fn from_params(params: &CatalogQueryParams, default_limit: u32) -> Self {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<u32>().ok());

        let limit = parse(&params.limit).unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        let offset = match (parse(&params.offset), parse(&params.page)) {
            (Some(offset), _) => offset,
            (None, Some(page)) if page > 0 => (page - 1).saturating_mul(limit),
            _ => 0,
        };
        Self { limit, offset }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// A complete product listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub filter: CatalogFilter,
    pub visibility: Visibility,
    pub sort: SortOrder,
    pub page: PageRequest,
    /// Exact category label match (used for "similar products").
    pub exact_category: Option<String>,
    pub exclude: Option<ProductId>,
}

impl ProductQuery {
    /// Public catalog listing from raw query parameters.
    pub fn from_params(params: &CatalogQueryParams, default_limit: u32) -> Self {
        let filter = CatalogFilter::from_params(params);
        let sort = params
            .sort
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        Self {
            filter,
            visibility: Visibility::Confirmed,
            sort,
            page: PageRequest::from_params(params, default_limit),
            exact_category: None,
            exclude: None,
        }
    }

    /// Confirmed products sharing `product`'s category, excluding itself.
    /// `None` when the product has no category.
    pub fn similar_to(product: &Product, limit: u32) -> Option<Self> {
        let category = product.category.clone()?;
        Some(Self {
            exact_category: Some(category),
            exclude: Some(product.id),
            page: PageRequest::new(limit, 0),
            ..Self::default()
        })
    }

    /// The discount listing always orders by discount size.
    pub fn effective_sort(&self) -> SortOrder {
        match self.filter.kind {
            Some(ListingKind::Discount) => SortOrder::DiscountDesc,
            _ => self.sort,
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.visibility.allows(product)
            && self.filter.matches(product)
            && self.exclude != Some(product.id)
            && self
                .exact_category
                .as_deref()
                .is_none_or(|c| product.category.as_deref() == Some(c))
    }

    /// Filter, sort and page an in-memory product set.
    pub fn apply<'a>(&self, products: impl IntoIterator<Item = &'a Product>) -> Page<Product> {
        let mut hits: Vec<&Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        let sort = self.effective_sort();
        hits.sort_by(|a, b| sort.compare(a, b));

        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(self.page.offset as usize)
            .take(self.page.limit as usize)
            .cloned()
            .collect();

        Page {
            items,
            total,
            limit: self.page.limit,
            offset: self.page.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::NewProduct;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn product(id: i64, title: &str, price: i64, discount: i32, confirmed: bool) -> Product {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id);
        let mut p = NewProduct::new(title, Decimal::from(price))
            .into_product(ProductId::from_raw(id).unwrap(), created);
        p.discount = discount;
        p.is_confirmed = confirmed;
        p
    }

    fn params(pairs: &[(&str, &str)]) -> CatalogQueryParams {
        let mut p = CatalogQueryParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "search" => p.search = v,
                "category" => p.category = v,
                "minPrice" => p.min_price = v,
                "maxPrice" => p.max_price = v,
                "material" => p.material = v,
                "country" => p.country = v,
                "type" => p.kind = v,
                "sort" => p.sort = v,
                "limit" => p.limit = v,
                "offset" => p.offset = v,
                "page" => p.page = v,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn non_numeric_prices_are_ignored() {
        let filter = CatalogFilter::from_params(&params(&[("minPrice", "abc"), ("maxPrice", "Infinity")]));
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);

        let filter = CatalogFilter::from_params(&params(&[("minPrice", "99.5"), ("maxPrice", "1e3")]));
        assert_eq!(filter.min_price, Some(Decimal::from_str("99.5").unwrap()));
        assert_eq!(filter.max_price, Some(Decimal::from(1000)));
    }

    #[test]
    fn inverted_price_range_yields_empty_page() {
        let items = vec![product(1, "Ваза", 70, 0, true), product(2, "Стол", 120, 0, true)];
        let query = ProductQuery::from_params(&params(&[("minPrice", "100"), ("maxPrice", "50")]), 20);

        let page = query.apply(&items);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let items = vec![
            product(1, "A", 50, 0, true),
            product(2, "B", 100, 0, true),
            product(3, "C", 101, 0, true),
        ];
        let query = ProductQuery::from_params(&params(&[("minPrice", "50"), ("maxPrice", "100")]), 20);
        let ids: Vec<i64> = query.apply(&items).items.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn text_filters_are_case_insensitive_substrings() {
        let mut oak = product(1, "Стол Дубовый", 100, 0, true);
        oak.material = Some("Дуб".into());
        oak.country = Some("Италия".into());
        let pine = product(2, "Стол сосновый", 100, 0, true);

        let filter = CatalogFilter::from_params(&params(&[("search", "стол"), ("material", "дуб"), ("country", "ИТАЛ")]));
        assert!(filter.matches(&oak));
        assert!(!filter.matches(&pine));
    }

    #[test]
    fn pending_products_never_leak_into_public_listing() {
        let items = vec![product(1, "Ваза", 500, 0, false), product(2, "Ваза", 500, 0, true)];
        let page = ProductQuery::from_params(&CatalogQueryParams::default(), 20).apply(&items);
        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].is_confirmed);
    }

    #[test]
    fn discount_listing_requires_discount_and_sorts_by_it() {
        let items = vec![
            product(1, "A", 100, 0, true),
            product(2, "B", 100, 10, true),
            product(3, "C", 100, 40, true),
            product(4, "D", 100, 10, true),
        ];
        let query = ProductQuery::from_params(&params(&[("type", "discount"), ("sort", "price_asc")]), 20);
        let ids: Vec<i64> = query.apply(&items).items.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![3, 4, 2]);
    }

    #[test]
    fn newest_first_by_default() {
        let items = vec![product(1, "A", 1, 0, true), product(3, "C", 1, 0, true), product(2, "B", 1, 0, true)];
        let ids: Vec<i64> = ProductQuery::default().apply(&items).items.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn page_and_limit_are_parsed_and_clamped() {
        let page = PageRequest::from_params(&params(&[("limit", "10"), ("page", "3")]), 20);
        assert_eq!(page, PageRequest { limit: 10, offset: 20 });

        let page = PageRequest::from_params(&params(&[("limit", "5000"), ("offset", "7"), ("page", "9")]), 20);
        assert_eq!(page, PageRequest { limit: MAX_PAGE_SIZE, offset: 7 });

        let page = PageRequest::from_params(&params(&[("limit", "zero")]), 12);
        assert_eq!(page, PageRequest { limit: 12, offset: 0 });
    }

    #[test]
    fn similar_matches_exact_category_and_excludes_self() {
        let mut base = product(1, "Кресло", 100, 0, true);
        base.category = Some("Кресла".into());
        let mut same = product(2, "Кресло-качалка", 100, 0, true);
        same.category = Some("Кресла".into());
        let mut broader = product(3, "Кресло офисное", 100, 0, true);
        broader.category = Some("Кресла офисные".into());

        let query = ProductQuery::similar_to(&base, 8).unwrap();
        let ids: Vec<i64> = query.apply([&base, &same, &broader]).items.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![2]);

        let uncategorized = product(4, "Пуф", 100, 0, true);
        assert!(ProductQuery::similar_to(&uncategorized, 8).is_none());
    }

    proptest! {
        /// Property: every returned product satisfies both inclusive bounds.
        #[test]
        fn price_filter_respects_bounds(
            prices in proptest::collection::vec(0i64..10_000, 0..40),
            min in 0i64..10_000,
            max in 0i64..10_000,
        ) {
            let items: Vec<Product> = prices
                .iter()
                .enumerate()
                .map(|(i, price)| product(i as i64 + 1, "X", *price, 0, true))
                .collect();
            let mut query = ProductQuery::default();
            query.page = PageRequest::new(MAX_PAGE_SIZE, 0);
            query.filter.min_price = Some(Decimal::from(min));
            query.filter.max_price = Some(Decimal::from(max));

            let page = query.apply(&items);
            for p in &page.items {
                prop_assert!(p.price >= Decimal::from(min) && p.price <= Decimal::from(max));
            }
            let expected = prices.iter().filter(|p| **p >= min && **p <= max).count() as u64;
            prop_assert_eq!(page.total, expected);
        }
    }
}
