//! Utility helpers shared by the collector.
//!
//! This module contains:
//! - Time and identifier helpers
//! - Bounded HTTP body reading
//!
//! IMPORTANT:
//! - No source-specific logic should live here.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::FetchError;

/// Formats a timestamp as RFC 3339 with second precision (`...Z`).
pub fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC time as RFC 3339.
pub fn now_rfc3339() -> String {
    rfc3339(Utc::now())
}

/// Nanoseconds since the Unix epoch for `ts`.
///
/// Falls back to microsecond resolution outside the i64 nanosecond
/// range (years beyond 2262).
pub fn unix_nanos(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_nanos_opt()
        .unwrap_or_else(|| ts.timestamp_micros().saturating_mul(1_000))
}

/// Run identifier derived from a high-resolution timestamp.
pub fn run_id(ts: DateTime<Utc>) -> String {
    format!("run-{}", unix_nanos(ts))
}

/// Reads at most `cap` bytes of a response body.
///
/// Bytes past the cap are dropped; the remainder of the body is not
/// awaited.
pub async fn read_capped(
    mut resp: reqwest::Response,
    cap: usize,
) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    while body.len() < cap {
        match resp.chunk().await? {
            Some(chunk) => {
                let take = chunk.len().min(cap - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    Ok(body)
}
