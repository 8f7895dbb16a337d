//! Duplicate detection between the moderation queue and the live catalog.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use decorshop_core::ProductId;

use crate::product::Product;

/// Punctuation removed before titles are compared.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '\'', '`', '«', '»', '„', '“', '”', '(', ')', '[', ']', '{', '}', '…',
];

/// Canonical form of a title for duplicate comparison: case-folded,
/// punctuation stripped, whitespace runs collapsed, trimmed.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed barcode, or `None` when absent or blank.
pub fn normalize_barcode(barcode: Option<&str>) -> Option<String> {
    barcode
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

/// `(normalized title, price)` comparison key. Prices compare by value, so
/// `500` and `500.00` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitlePriceKey {
    title: String,
    price: Decimal,
}

impl TitlePriceKey {
    pub fn of(product: &Product) -> Self {
        Self {
            title: normalize_title(&product.title),
            price: product.price.normalize(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Barcode,
    TitlePrice,
}

/// A pending product that duplicates a confirmed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCandidate {
    pub pending_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub matched_id: ProductId,
    pub reason: MatchReason,
}

/// Flag pending products that share a barcode or a normalized title and
/// price with a confirmed product. Barcode matches take precedence; output
/// follows the order of `pending`.
pub fn find_duplicate_candidates(confirmed: &[Product], pending: &[Product]) -> Vec<DuplicateCandidate> {
    let mut by_barcode: HashMap<String, ProductId> = HashMap::new();
    let mut by_key: HashMap<TitlePriceKey, ProductId> = HashMap::new();
    for product in confirmed {
        if let Some(barcode) = normalize_barcode(product.barcode.as_deref()) {
            by_barcode.entry(barcode).or_insert(product.id);
        }
        by_key.entry(TitlePriceKey::of(product)).or_insert(product.id);
    }

    pending
        .iter()
        .filter_map(|product| {
            let barcode_hit = normalize_barcode(product.barcode.as_deref())
                .and_then(|b| by_barcode.get(&b).copied())
                .map(|id| (id, MatchReason::Barcode));
            let hit = barcode_hit
                .or_else(|| by_key.get(&TitlePriceKey::of(product)).map(|id| (*id, MatchReason::TitlePrice)))?;

            Some(DuplicateCandidate {
                pending_id: product.id,
                title: product.title.clone(),
                price: product.price,
                matched_id: hit.0,
                reason: hit.1,
            })
        })
        .collect()
}

/// A planned title change from the suffix-renaming job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleRename {
    pub id: ProductId,
    pub from: String,
    pub to: String,
}

/// Plan `" 2"`, `" 3"`, … suffixes for products sharing an exact title.
///
/// The lowest id in each group keeps its title. Only exact title equality
/// groups products; price and barcode are not consulted. Suffixed titles
/// that already exist are skipped. Result is ordered by id.
pub fn plan_title_suffixes(products: &[Product]) -> Vec<TitleRename> {
    let mut taken: HashSet<String> = products.iter().map(|p| p.title.clone()).collect();

    let mut groups: BTreeMap<&str, Vec<ProductId>> = BTreeMap::new();
    for product in products {
        groups.entry(product.title.as_str()).or_default().push(product.id);
    }

    let mut renames = Vec::new();
    for (title, mut ids) in groups {
        if ids.len() < 2 {
            continue;
        }
        ids.sort();
        let mut counter = 2u32;
        for id in ids.into_iter().skip(1) {
            let to = loop {
                let candidate = format!("{title} {counter}");
                counter += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(to.clone());
            renames.push(TitleRename {
                id,
                from: title.to_string(),
                to,
            });
        }
    }

    renames.sort_by_key(|r| r.id);
    renames
}
