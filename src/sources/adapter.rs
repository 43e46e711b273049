use crate::error::FetchError;
use crate::schema::DataPoint;

/// DataSource is the abstraction layer between:
/// - The generic collection orchestrator
/// - A concrete statistics API
///
/// Each implementation must:
/// - Fetch one (indicator, region, year) series per call
/// - Normalize entries into `DataPoint`s
/// - Return points sorted by year, newest first
///
/// CONTRACT:
/// - Exactly one attempt per call; no retries
/// - Individual unusable entries are skipped, not reported
/// - An `Err` affects only the (resource, region) pair being fetched
///
/// THREAD SAFETY:
/// - Must be Send + Sync
/// - One instance is shared by every concurrent run
///
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Canonical adapter name, matching `source.name` in configuration.
    fn name(&self) -> &'static str;

    /// Label stamped on every collected value (e.g. "World Bank API").
    fn label(&self) -> &'static str;

    /// Fetches the series for `indicator` in `region`.
    ///
    /// `year = None` requests the configured multi-year window;
    /// `Some(y)` requests exactly that year.
    async fn fetch(
        &self,
        indicator: &str,
        region: &str,
        year: Option<i32>,
    ) -> Result<Vec<DataPoint>, FetchError>;
}
