use std::sync::Arc;

use serde::Serialize;

use crate::{
    collector::history::RunHistory,
    config::ExportConfig,
    error::ToolError,
    schema::CollectedValue,
};

// ------------------------------------------------------------
// JSON-LD document shapes (schema.org)
// ------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Observation {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "spatialCoverage")]
    pub spatial_coverage: String,
    #[serde(rename = "temporalCoverage")]
    pub temporal_coverage: i32,
    pub value: f64,
    #[serde(rename = "unitCode")]
    pub unit_code: String,
    #[serde(rename = "isBasedOn")]
    pub is_based_on: String,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Dataset {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "@graph")]
    pub graph: Vec<Observation>,
    pub count: usize,
}

/// Projects the latest run into a JSON-LD dataset.
pub struct JsonLdExporter {
    history: Arc<RunHistory>,
    cfg: ExportConfig,
}

impl JsonLdExporter {
    pub fn new(history: Arc<RunHistory>, cfg: ExportConfig) -> Self {
        Self { history, cfg }
    }

    /// Exports the latest run, optionally keeping one resource only.
    ///
    /// FAILS:
    /// - `EmptyState` if no run has completed yet
    pub async fn export(&self, resource_id: Option<&str>) -> Result<Dataset, ToolError> {
        let latest = self.history.latest().await.ok_or_else(|| {
            ToolError::EmptyState("no collection runs available; call collector.run first".into())
        })?;

        let graph: Vec<Observation> = latest
            .values
            .iter()
            .filter(|v| resource_id.is_none_or(|id| v.resource_id == id))
            .map(|v| self.observation(v))
            .collect();

        Ok(Dataset {
            context: self.cfg.context.clone(),
            kind: "Dataset",
            id: format!("{}/collection", self.base()),
            name: self.cfg.dataset_name.clone(),
            date_created: latest.finished_at.clone(),
            count: graph.len(),
            graph,
        })
    }

    fn base(&self) -> &str {
        self.cfg.base_iri.trim_end_matches('/')
    }

    fn observation(&self, v: &CollectedValue) -> Observation {
        Observation {
            context: self.cfg.context.clone(),
            kind: "Observation",
            id: format!(
                "{}/{}/{}/{}",
                self.base(),
                v.resource_id,
                v.region.to_lowercase(),
                v.year
            ),
            name: format!("{} - {} ({})", v.resource_id, v.region_name, v.year),
            description: format!(
                "Collected value for {} in {}, year {}",
                v.resource_id, v.region_name, v.year
            ),
            spatial_coverage: v.region_name.clone(),
            temporal_coverage: v.year,
            value: v.value,
            unit_code: v.unit.clone(),
            is_based_on: v.source.clone(),
            date_created: v.fetched_at.clone(),
        }
    }
}
