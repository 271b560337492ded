use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Add a permissive CORS layer so browser front-ends on other origins
    /// can call `/api/*`
    #[serde(default)]
    pub cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file, created on first start
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bookshelf.db")
}
fn default_pool_size() -> u32 {
    bookshelf_db::pool::DEFAULT_POOL_SIZE
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// `per_page` used by the pagination endpoint when none is given
    #[serde(default = "default_per_page")]
    pub default_per_page: i64,

    /// Upper bound applied to a requested `per_page` (no bound when unset)
    #[serde(default)]
    pub max_per_page: Option<i64>,
}

fn default_per_page() -> i64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Keep the `GET /delete-*/{id}` links working. When false only POST deletes.
    #[serde(default = "default_allow_get_deletes")]
    pub allow_get_deletes: bool,
}

fn default_allow_get_deletes() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            allow_get_deletes: default_allow_get_deletes(),
        }
    }
}
