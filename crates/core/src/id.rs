//! Strongly-typed identifiers used across the domain.
//!
//! Catalog records use database-assigned positive integers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a category row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

/// Identifier of a subcategory row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubcategoryId(i64);

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw key. Returns `None` for zero or negative values.
            pub fn from_raw(raw: i64) -> Option<Self> {
                (raw > 0).then_some(Self(raw))
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<i64> for $t {
            type Error = DomainError;

            fn try_from(raw: i64) -> Result<Self, Self::Error> {
                Self::from_raw(raw)
                    .ok_or_else(|| DomainError::invalid_id(format!("{}: {} is not positive", $name, raw)))
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: i64 = s
                    .trim()
                    .parse()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::try_from(raw)
            }
        }
    };
}

impl_numeric_id!(ProductId, "ProductId");
impl_numeric_id!(CategoryId, "CategoryId");
impl_numeric_id!(SubcategoryId, "SubcategoryId");
