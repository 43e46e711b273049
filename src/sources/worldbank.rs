use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::SourceConfig,
    error::FetchError,
    schema::DataPoint,
    util,
};

use super::adapter::DataSource;

/// World Bank v2 indicator API adapter.
///
/// Response format:
///
/// ```text
/// [ {page, pages, per_page, total, ...}, [ {date, value, ...}, ... ] ]
/// ```
///
/// The second element is `null` when the series has no data.
pub struct WorldBankSource {
    client: reqwest::Client,
    base_url: String,
    default_range: String,
    per_page: u32,
    max_body_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

impl WorldBankSource {
    pub fn new(cfg: &SourceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            default_range: cfg.default_date_range.clone(),
            per_page: cfg.per_page,
            max_body_bytes: cfg.max_body_bytes,
        })
    }

    fn date_range(&self, year: Option<i32>) -> String {
        match year {
            Some(y) => format!("{y}:{y}"),
            None => self.default_range.clone(),
        }
    }

    fn url(&self, indicator: &str, region: &str, year: Option<i32>) -> String {
        format!(
            "{}/country/{}/indicator/{}?date={}&format=json&per_page={}",
            self.base_url,
            region.to_lowercase(),
            indicator,
            self.date_range(year),
            self.per_page,
        )
    }
}

#[async_trait::async_trait]
impl DataSource for WorldBankSource {
    fn name(&self) -> &'static str {
        "worldbank"
    }

    fn label(&self) -> &'static str {
        "World Bank API"
    }

    async fn fetch(
        &self,
        indicator: &str,
        region: &str,
        year: Option<i32>,
    ) -> Result<Vec<DataPoint>, FetchError> {
        let url = self.url(indicator, region, year);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Protocol(status.as_u16()));
        }

        let body = util::read_capped(resp, self.max_body_bytes).await?;
        parse_response(&body)
    }
}

/// Parses a World Bank response body into points, newest year first.
///
/// FAILS:
/// - body is not a JSON array
/// - array has fewer than two elements
/// - second element is neither `null` nor an array of entry objects
///
/// SKIPS (not an error):
/// - entries with a `null` / missing value
/// - entries whose date is not an integer year
pub fn parse_response(body: &[u8]) -> Result<Vec<DataPoint>, FetchError> {
    let raw: Vec<Value> =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let Some(data) = raw.into_iter().nth(1) else {
        return Err(FetchError::Parse("no data".into()));
    };

    let entries: Option<Vec<Entry>> = serde_json::from_value(data)
        .map_err(|e| FetchError::Parse(format!("parse entries: {e}")))?;

    let mut points: Vec<DataPoint> = entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| {
            let value = e.value?;
            let year = e.date?.trim().parse::<i32>().ok().filter(|y| *y != 0)?;
            Some(DataPoint { year, value })
        })
        .collect();

    points.sort_by(|a, b| b.year.cmp(&a.year));
    Ok(points)
}
