use serde::Deserialize;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Top-level configuration loaded from `config.json`.
//
// Every section and every field carries a default, so an empty
// object (or a missing file) yields a runnable service.
//
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// External statistics source
    pub source: SourceConfig,

    /// Collection run parameters
    pub collection: CollectionConfig,

    /// JSON-LD export naming
    pub export: ExportConfig,

    /// Downstream publish relay
    pub publish: PublishConfig,

    /// Optional debug configuration
    pub debug: DebugConfig,
}

// ------------------------------------------------------------
// Server configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. "0.0.0.0:8080"
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
        }
    }
}

// ------------------------------------------------------------
// Source configuration
// ------------------------------------------------------------
//
// Parameters for the data source adapter.
//
// Notes:
// - `name` selects the adapter from the source registry.
// - `max_body_bytes` caps how much of a response is read;
//   anything beyond it is discarded before parsing.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    /// Adapter identifier (e.g. "worldbank")
    pub name: String,

    /// API base URL without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum response bytes read per request
    pub max_body_bytes: usize,

    /// Date window used when no target year is requested ("FROM:TO")
    pub default_date_range: String,

    /// Page size requested from the API
    pub per_page: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: "worldbank".into(),
            base_url: "https://api.worldbank.org/v2".into(),
            timeout_secs: 30,
            max_body_bytes: 512 * 1024,
            default_date_range: "2020:2024".into(),
            per_page: 50,
        }
    }
}

// ------------------------------------------------------------
// Collection configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectionConfig {
    /// Number of completed runs kept in memory
    pub history_capacity: usize,

    /// Concurrent fetches across the region loop of one resource.
    ///
    /// 1 keeps the scan strictly sequential.
    pub fetch_concurrency: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            fetch_concurrency: 1,
        }
    }
}

// ------------------------------------------------------------
// Export configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    /// IRI prefix for dataset and observation identifiers
    pub base_iri: String,

    /// Human readable dataset name
    pub dataset_name: String,

    /// JSON-LD `@context` value
    pub context: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_iri: "https://resources.gftd.ai/content/resource".into(),
            dataset_name: "Global Resource Collection".into(),
            context: "https://schema.org/".into(),
        }
    }
}

// ------------------------------------------------------------
// Publish configuration
// ------------------------------------------------------------
//
// The relay signals the downstream aggregation service to refresh.
// `target_url` is used whenever the caller does not supply one.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PublishConfig {
    /// Default downstream JSON-RPC endpoint
    pub target_url: String,

    /// Remote operation invoked on the downstream service
    pub remote_tool: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum response bytes read from the downstream service
    pub max_body_bytes: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            target_url: "http://127.0.0.1:8090/api/mcp".into(),
            remote_tool: "global.list_resources".into(),
            timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

// ------------------------------------------------------------
// Debug configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DebugConfig {
    /// Raises the default log level to debug
    pub log: bool,

    /// Seconds between metrics report lines (0 disables the reporter)
    pub metrics_interval_secs: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log: false,
            metrics_interval_secs: 60,
        }
    }
}

// ------------------------------------------------------------
// Configuration loader
// ------------------------------------------------------------
//
// Reads a JSON configuration file and deserializes it into the
// strongly typed `Config` structure.
//
// BEHAVIOR:
// - Missing file  -> defaults
// - Invalid JSON  -> error
//
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(data) => {
            let cfg = serde_json::from_str(&data)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}
