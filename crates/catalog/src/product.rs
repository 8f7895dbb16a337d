use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use decorshop_core::{CategoryId, DomainError, DomainResult, ProductId};

use crate::moderation::ModerationState;

/// Largest price a `NUMERIC(14, 2)` column holds.
const MAX_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Money is stored in cents.
const PRICE_SCALE: u32 = 2;

/// A sellable catalog item.
///
/// Customers only ever see products with `is_confirmed = true`; everything
/// else is waiting in the moderation queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Percentage, `0..=100`.
    #[serde(default)]
    pub discount: i32,
    pub category: Option<String>,
    pub category_id: Option<CategoryId>,
    pub subcategory: Option<String>,
    pub material: Option<String>,
    pub country: Option<String>,
    pub barcode: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub reserved: i32,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Visible in the public catalog.
    pub fn is_visible(&self) -> bool {
        self.is_confirmed
    }

    pub fn state(&self) -> ModerationState {
        ModerationState::from_confirmed(self.is_confirmed)
    }

    /// Price after discount, rounded to cents. Falls back to the list price
    /// when the arithmetic would overflow.
    pub fn final_price(&self) -> Decimal {
        let discount = Decimal::from(self.discount.clamp(0, 100));
        self.price
            .checked_mul(Decimal::ONE_HUNDRED - discount)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .map(|price| price.round_dp(2))
            .unwrap_or(self.price)
    }

    /// Units that can still be ordered.
    pub fn available(&self) -> i32 {
        (self.quantity - self.reserved).max(0)
    }
}

/// Import/upload payload. Products always enter the catalog pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub quantity: i32,
}

impl NewProduct {
    pub fn new(title: impl Into<String>, price: Decimal) -> Self {
        Self {
            title: title.into(),
            description: None,
            price,
            discount: 0,
            category: None,
            subcategory: None,
            material: None,
            country: None,
            barcode: None,
            image: None,
            images: Vec::new(),
            quantity: 0,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if self.price.is_sign_negative() {
            return Err(DomainError::validation("price must not be negative"));
        }
        if self.price > MAX_PRICE {
            return Err(DomainError::validation(format!("price must not exceed {MAX_PRICE}")));
        }
        if self.price.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation("price must not have more than two decimal places"));
        }
        if !(0..=100).contains(&self.discount) {
            return Err(DomainError::validation("discount must be between 0 and 100"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity must not be negative"));
        }
        Ok(())
    }

    /// Trim text fields, drop blank optionals and fall back to the first
    /// gallery image as the cover, so every store persists the same shape.
    pub fn normalized(self) -> Self {
        let image = non_blank(self.image).or_else(|| self.images.first().cloned());
        Self {
            title: self.title.trim().to_string(),
            description: non_blank(self.description),
            category: non_blank(self.category),
            subcategory: non_blank(self.subcategory),
            material: non_blank(self.material),
            country: non_blank(self.country),
            barcode: crate::dedup::normalize_barcode(self.barcode.as_deref()),
            image,
            ..self
        }
    }

    /// Materialize as a pending product with the given store-assigned id.
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        let input = self.normalized();
        Product {
            id,
            title: input.title,
            description: input.description,
            price: input.price,
            discount: input.discount,
            category: input.category,
            category_id: None,
            subcategory: input.subcategory,
            material: input.material,
            country: input.country,
            barcode: input.barcode,
            image: input.image,
            images: input.images,
            quantity: input.quantity,
            reserved: 0,
            is_confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
