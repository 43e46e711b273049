use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Utc;
use futures_util::{StreamExt, stream};

use crate::{
    catalog::Catalog,
    error::FetchError,
    metrics::METRICS,
    schema::{CollectedValue, DataPoint, Region, ResourceDefinition, Run, RunStatus},
    sources::adapter::DataSource,
    util,
};

use super::history::RunHistory;

/// Collection orchestrator.
///
/// Scans target resources × regions, invokes the data source per
/// pair and assembles a terminal `Run` which is appended to the
/// shared history.
///
/// DESIGN:
/// - Resources in catalog order (outer), regions in list order (inner)
/// - A failing pair becomes one error line; the scan always continues
/// - Up to `concurrency` region fetches of one resource run at once;
///   results are consumed in region order
///
/// NOT RESPONSIBLE FOR:
/// - Retries or backoff
/// - Cancellation (a started scan runs to completion)
///
pub struct Collector {
    source: Arc<dyn DataSource>,
    catalog: Arc<Catalog>,
    history: Arc<RunHistory>,
    concurrency: usize,
}

impl Collector {
    pub fn new(
        source: Arc<dyn DataSource>,
        catalog: Arc<Catalog>,
        history: Arc<RunHistory>,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            catalog,
            history,
            concurrency: concurrency.max(1),
        }
    }

    /// Executes one full collection scan and records it.
    ///
    /// PARAMETERS:
    /// - `filter`: resource ids to collect (`None` = whole catalog)
    /// - `year`: single target year (`None` = source default window)
    ///
    /// GUARANTEES:
    /// - Never fails; fetch errors are captured on the run
    /// - The returned run is already visible in the history
    ///
    pub async fn run_collection(&self, filter: Option<&[String]>, year: Option<i32>) -> Arc<Run> {
        let started = Utc::now();
        let id = util::run_id(started);
        let started_at = util::rfc3339(started);

        let targets = self.catalog.resolve(filter);
        METRICS.runs_started.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "run {} {}: {} resources x {} regions",
            id,
            RunStatus::Running.as_str(),
            targets.len(),
            self.catalog.regions.len()
        );

        let mut errors = Vec::new();
        let mut values = Vec::new();

        for res in &targets {
            for (region, outcome) in self.fetch_regions(res, year).await {
                match outcome {
                    Ok(points) => {
                        METRICS.fetches_ok.fetch_add(1, Ordering::Relaxed);
                        values.extend(points.into_iter().map(|p| CollectedValue {
                            resource_id: res.id.clone(),
                            region: region.code.clone(),
                            region_name: region.name.clone(),
                            year: p.year,
                            value: p.value,
                            unit: res.unit.clone(),
                            source: self.source.label().to_string(),
                            fetched_at: started_at.clone(),
                        }));
                    }
                    Err(e) => {
                        METRICS.fetch_errors.fetch_add(1, Ordering::Relaxed);
                        log::debug!("run {}: {}/{} failed: {}", id, res.id, region.code, e);
                        errors.push(format!("{}/{}: {}", res.id, region.code, e));
                    }
                }
            }
        }

        let run = Arc::new(Run {
            id,
            started_at,
            finished_at: util::now_rfc3339(),
            resources_requested: targets.len(),
            errors,
            values,
        });

        let status = run.status();
        debug_assert!(status.is_terminal());
        let counter = match status {
            RunStatus::Completed => &METRICS.runs_completed,
            RunStatus::Partial => &METRICS.runs_partial,
            _ => &METRICS.runs_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        METRICS.values_collected.fetch_add(run.collected(), Ordering::Relaxed);

        log::info!(
            "run {} {}: values={} errors={}",
            run.id,
            status.as_str(),
            run.collected(),
            run.errors.len()
        );

        self.history.append(run.clone()).await;
        run
    }

    /// Fetches every region for one resource.
    ///
    /// Output order equals `catalog.regions` order regardless of
    /// completion order.
    async fn fetch_regions<'a>(
        &'a self,
        res: &ResourceDefinition,
        year: Option<i32>,
    ) -> Vec<(&'a Region, Result<Vec<DataPoint>, FetchError>)> {
        let fetches: Vec<_> = self
            .catalog
            .regions
            .iter()
            .map(|region| {
                let source = Arc::clone(&self.source);
                let indicator = res.indicator.clone();
                let code = region.code.clone();
                async move { source.fetch(&indicator, &code, year).await }
            })
            .collect();

        let outcomes: Vec<_> = stream::iter(fetches)
            .buffered(self.concurrency)
            .collect()
            .await;

        self.catalog.regions.iter().zip(outcomes).collect()
    }
}
