//! Infrastructure layer: catalog storage, configuration, file transfer and
//! the services that sit directly on top of the store.

pub mod config;
pub mod error;
pub mod jobs;
pub mod moderation;
pub mod stats;
pub mod store;
pub mod transfer;

pub use config::{AppConfig, ConfigError, StoreConfig};
pub use error::{ServiceError, ServiceResult};
pub use moderation::{BulkOutcome, CategorizeOutcome, ModerationService};
pub use stats::{AdminStats, admin_stats};
pub use store::{
    CatalogStore, CategoryStore, FavoriteStore, InMemoryCatalogStore, PostgresCatalogStore, ProductStore, StoreError,
    StoreResult, open_store,
};
pub use transfer::{CatalogFile, ImportReport, export_products, import_products};
