use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use decorshop_catalog::{Page, Product, sanitize_ids};
use decorshop_core::ProductId;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub action: String,
    /// Untrusted; sanitized to positive integers before use.
    #[serde(default)]
    pub product_ids: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAllRequest {
    /// Absent approves every pending product. When present it must be a list;
    /// an explicit `null` is rejected rather than read as "everything".
    #[serde(default, deserialize_with = "present")]
    pub product_ids: Option<Value>,
}

impl ApproveAllRequest {
    pub fn ids(&self) -> Result<Option<Vec<ProductId>>, ApiError> {
        match &self.product_ids {
            None => Ok(None),
            Some(Value::Array(raw)) => Ok(Some(sanitize_ids(raw))),
            Some(_) => Err(ApiError::validation("productIds must be an array of product ids")),
        }
    }
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DedupRequest {
    #[serde(default)]
    pub apply: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarQuery {
    pub product_id: Option<String>,
    pub limit: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// A product as the storefront renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub final_price: Decimal,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            final_price: product.final_price(),
            product,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<ProductView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl From<Page<Product>> for ProductListResponse {
    fn from(page: Page<Product>) -> Self {
        let page = page.map(ProductView::from);
        Self {
            success: true,
            products: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

// -------------------------
// Mapping helpers
// -------------------------

pub fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("invalid product id '{raw}'")))
}

/// Parse an optional JSON body: an empty body yields `T::default()`, a
/// malformed one is a 400.
pub fn optional_json<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use decorshop_catalog::NewProduct;

    #[test]
    fn product_view_adds_final_price_alongside_fields() {
        let mut product = NewProduct::new("Кресло", Decimal::from(1000)).into_product(ProductId::from_raw(1).unwrap(), Utc::now());
        product.discount = 25;

        let json = serde_json::to_value(ProductView::from(product)).unwrap();
        assert_eq!(json["title"], "Кресло");
        assert_eq!(json["finalPrice"], 750.0);
        assert_eq!(json["isConfirmed"], false);
    }

    #[test]
    fn optional_body_defaults_when_empty() {
        let parsed: DedupRequest = optional_json(b"  ").unwrap();
        assert!(!parsed.apply);
        let parsed: DedupRequest = optional_json(br#"{"apply": true}"#).unwrap();
        assert!(parsed.apply);
        assert!(optional_json::<ApproveAllRequest>(b"{not json").is_err());
    }

    #[test]
    fn approve_all_distinguishes_null_from_absent() {
        let absent: ApproveAllRequest = optional_json(b"{}").unwrap();
        assert_eq!(absent.ids().unwrap(), None);

        let listed: ApproveAllRequest = optional_json(br#"{"productIds": [2, "x", 2]}"#).unwrap();
        assert_eq!(listed.ids().unwrap(), Some(vec![ProductId::from_raw(2).unwrap()]));

        let null: ApproveAllRequest = optional_json(br#"{"productIds": null}"#).unwrap();
        assert!(matches!(null.ids(), Err(ApiError::Validation(_))));
        let scalar: ApproveAllRequest = optional_json(br#"{"productIds": 7}"#).unwrap();
        assert!(scalar.ids().is_err());
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(parse_product_id("12").is_ok());
        assert!(parse_product_id("abc").is_err());
        assert!(parse_product_id("-3").is_err());
    }
}
