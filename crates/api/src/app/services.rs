use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use decorshop_infra::{AppConfig, CatalogStore, ModerationService, open_store};

/// Everything a handler needs, shared behind one `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn CatalogStore>,
    pub moderation: ModerationService,
    pub export_path: PathBuf,
    pub import_path: PathBuf,
}

impl AppServices {
    pub fn new(store: Arc<dyn CatalogStore>, export_path: PathBuf, import_path: PathBuf) -> Self {
        Self {
            moderation: ModerationService::new(store.clone()),
            store,
            export_path,
            import_path,
        }
    }
}

/// Open the configured store and wire the services over it.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = open_store(&config.store)
        .await
        .context("failed to open catalog store")?;

    Ok(AppServices::new(
        store,
        config.export_path.clone(),
        config.import_path.clone(),
    ))
}
