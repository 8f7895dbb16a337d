//! Categories and slugs.

use serde::{Deserialize, Serialize};

use decorshop_core::{CategoryId, DomainError, DomainResult, SubcategoryId};

/// Slug used when a name has no sluggable characters at all.
pub const FALLBACK_SLUG: &str = "category";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub sort_order: i32,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub sort_order: i32,
}

impl NewCategory {
    /// Build an active category from a free-text name, picking a slug that
    /// `is_taken` does not report as already in use.
    pub fn from_name(name: &str, is_taken: impl Fn(&str) -> bool) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name must not be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            slug: unique_slug(&slugify(name), is_taken),
            is_active: true,
            sort_order: 0,
        })
    }
}

/// Category fields stamped onto a product by categorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAssignment {
    pub category: String,
    pub category_id: CategoryId,
    pub subcategory: Option<String>,
}

/// Number of confirmed products carrying a category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

/// Derive a URL-safe slug from a human-readable name.
///
/// The result only contains characters from `[a-z0-9а-я-]`: no whitespace,
/// no leading, trailing or doubled hyphens. Case is folded, `ё` becomes `е`,
/// every other character outside the class is dropped, and whitespace runs
/// become a single hyphen. A name with nothing sluggable yields
/// [`FALLBACK_SLUG`].
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut separator = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        let ch = if ch == 'ё' { 'е' } else { ch };
        if ch.is_ascii_alphanumeric() || ('а'..='я').contains(&ch) {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            separator = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// First of `base`, `base-2`, `base-3`, … that is not taken.
pub fn unique_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
