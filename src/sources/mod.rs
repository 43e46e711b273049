//! Data source registry and factory
//!
//! This module provides:
//! - The `DataSource` abstraction
//! - A factory resolving the configured adapter by name
//!
//! All API-specific logic lives in dedicated adapter modules.

pub mod adapter;
pub mod worldbank;

use std::sync::Arc;

use adapter::DataSource;

use crate::config::SourceConfig;

/// Builds the data source named in `cfg.name`.
///
/// RETURNS:
/// - `Ok(Some(..))` for a supported adapter
/// - `Ok(None)` if the name is unknown
/// - `Err` if the adapter could not be constructed
pub fn get_source(cfg: &SourceConfig) -> anyhow::Result<Option<Arc<dyn DataSource>>> {
    match cfg.name.as_str() {
        "worldbank" => Ok(Some(Arc::new(worldbank::WorldBankSource::new(cfg)?))),
        _ => Ok(None),
    }
}
