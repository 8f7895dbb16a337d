//! Catalog domain module.
//!
//! Products, categories, catalog filtering, the moderation state machine and
//! the duplicate-detection heuristics, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod category;
pub mod dedup;
pub mod filter;
pub mod moderation;
pub mod product;

pub use category::{Category, CategoryAssignment, CategoryCount, NewCategory, Subcategory, slugify, unique_slug};
pub use dedup::{
    DuplicateCandidate, MatchReason, TitlePriceKey, TitleRename, find_duplicate_candidates,
    normalize_barcode, normalize_title, plan_title_suffixes,
};
pub use filter::{
    CatalogFilter, CatalogQueryParams, ListingKind, Page, PageRequest, ProductQuery, SortOrder, Visibility,
};
pub use moderation::{BulkAction, ModerationState, ModerationTransition, sanitize_ids};
pub use product::{NewProduct, Product};
