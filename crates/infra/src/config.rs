//! Configuration loading and representation.

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret-change-me";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_EXPORT_PATH: &str = "data/products.json";
const DEFAULT_IMPORT_PATH: &str = "data/import.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where catalog data lives.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String, max_connections: u32 },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => f.write_str("InMemory"),
            Self::Postgres { max_connections, .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"<redacted>")
                .field("max_connections", max_connections)
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreConfig,
    pub export_path: PathBuf,
    pub import_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("store", &self.store)
            .field("export_path", &self.export_path)
            .field("import_path", &self.import_path)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid { name: "BIND_ADDR", reason: e.to_string() })?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using development default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent = match get("USE_PERSISTENT_STORES") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "USE_PERSISTENT_STORES",
                reason: format!("expected true or false, got '{raw}'"),
            })?,
            None => false,
        };

        let store = if use_persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        reason: format!("expected a positive integer, got '{raw}'"),
                    })?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            StoreConfig::Postgres { database_url, max_connections }
        } else {
            StoreConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
            export_path: get("CATALOG_EXPORT_PATH")
                .unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string())
                .into(),
            import_path: get("CATALOG_IMPORT_PATH")
                .unwrap_or_else(|| DEFAULT_IMPORT_PATH.to_string())
                .into(),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
