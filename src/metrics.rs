use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;

/// Global runtime metrics for the collector.
///
/// Purpose:
/// - Track run outcomes
/// - Track fetch throughput and failures
/// - Track publish relay activity
/// - Track RPC traffic
///
/// Design:
/// - Lock-free (Atomics)
/// - Safe in async + multithreaded contexts
#[derive(Default)]
pub struct RuntimeMetrics {
    // Runs
    pub runs_started: AtomicUsize,
    pub runs_completed: AtomicUsize,
    pub runs_partial: AtomicUsize,
    pub runs_failed: AtomicUsize,

    // Fetches
    pub fetches_ok: AtomicUsize,
    pub fetch_errors: AtomicUsize,
    pub values_collected: AtomicUsize,

    // Publish relay
    pub publish_sent: AtomicUsize,
    pub publish_errors: AtomicUsize,
    pub publish_skipped: AtomicUsize,

    pub rpc_requests: AtomicUsize,
}

impl RuntimeMetrics {
    /// One-line rendering used by the periodic reporter.
    pub fn report_line(&self) -> String {
        format!(
            "[METRICS] runs={} completed={} partial={} failed={} fetch_ok={} fetch_err={} values={} pub_sent={} pub_err={} pub_skip={} rpc={}",
            self.runs_started.load(Ordering::Relaxed),
            self.runs_completed.load(Ordering::Relaxed),
            self.runs_partial.load(Ordering::Relaxed),
            self.runs_failed.load(Ordering::Relaxed),
            self.fetches_ok.load(Ordering::Relaxed),
            self.fetch_errors.load(Ordering::Relaxed),
            self.values_collected.load(Ordering::Relaxed),
            self.publish_sent.load(Ordering::Relaxed),
            self.publish_errors.load(Ordering::Relaxed),
            self.publish_skipped.load(Ordering::Relaxed),
            self.rpc_requests.load(Ordering::Relaxed),
        )
    }
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));

/// Spawns the periodic metrics reporter.
///
/// `interval_secs == 0` disables reporting.
pub fn spawn_reporter(interval_secs: u64) {
    if interval_secs == 0 {
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // first tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            log::info!("{}", METRICS.report_line());
        }
    });
}
