//! Tool dispatcher
//!
//! Maps named capabilities to the collection engine and exporters.
//!
//! - `specs`:   advertised capability list
//! - `request`: typed argument validation
//!
//! Every failure is a `ToolError`; transport concerns live in `rpc`.

pub mod request;
pub mod specs;

use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
    catalog::Catalog,
    collector::{history::RunHistory, runner::Collector},
    error::ToolError,
    export::{jsonld::JsonLdExporter, publish::Publisher},
    schema::{CollectedValue, Run, RunSummary},
};

use request::ToolRequest;
use specs::ToolSpec;

/// Number of runs listed by `collector.status`.
pub const STATUS_LIMIT: usize = 10;

pub struct ToolDispatcher {
    collector: Arc<Collector>,
    history: Arc<RunHistory>,
    catalog: Arc<Catalog>,
    exporter: JsonLdExporter,
    publisher: Publisher,
}

impl ToolDispatcher {
    pub fn new(
        collector: Arc<Collector>,
        history: Arc<RunHistory>,
        catalog: Arc<Catalog>,
        exporter: JsonLdExporter,
        publisher: Publisher,
    ) -> Self {
        Self {
            collector,
            history,
            catalog,
            exporter,
            publisher,
        }
    }

    pub fn tools(&self) -> Vec<ToolSpec> {
        specs::tool_specs()
    }

    /// Triggers a full, unfiltered collection run.
    pub async fn trigger(&self) -> Arc<Run> {
        self.collector.run_collection(None, None).await
    }

    /// Invokes a capability by name.
    ///
    /// `args = Value::Null` is treated as an empty argument map.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        match ToolRequest::parse(name, args)? {
            ToolRequest::Run { resource_ids, year } => {
                let run = self
                    .collector
                    .run_collection(resource_ids.as_deref(), year)
                    .await;
                Ok(json!({ "run": run.as_ref() }))
            }

            ToolRequest::Status => {
                let summaries: Vec<RunSummary> = self
                    .history
                    .recent(STATUS_LIMIT)
                    .await
                    .iter()
                    .map(|r| r.summary())
                    .collect();
                Ok(json!({ "count": summaries.len(), "runs": summaries }))
            }

            ToolRequest::ListCatalog => Ok(json!({
                "resources": self.catalog.resources,
                "regions": self.catalog.regions,
                "count": self.catalog.resources.len(),
            })),

            ToolRequest::GetCollected { resource_id, run_id } => {
                let run = self.target_run(run_id.as_deref()).await?;
                let values: Vec<&CollectedValue> = run
                    .values
                    .iter()
                    .filter(|v| resource_id.as_deref().is_none_or(|id| v.resource_id == id))
                    .collect();
                Ok(json!({ "run_id": run.id, "count": values.len(), "values": values }))
            }

            ToolRequest::ExportJsonLd { resource_id } => {
                let dataset = self.exporter.export(resource_id.as_deref()).await?;
                Ok(serde_json::to_value(dataset)?)
            }

            ToolRequest::Publish { target_url } => {
                let outcome = self.publisher.publish(target_url.as_deref()).await?;
                Ok(serde_json::to_value(outcome)?)
            }
        }
    }

    /// The run addressed by `run_id`, or the latest one.
    async fn target_run(&self, run_id: Option<&str>) -> Result<Arc<Run>, ToolError> {
        let empty = || ToolError::EmptyState("no collection runs found".into());
        match run_id {
            None => self.history.latest().await.ok_or_else(empty),
            Some(id) => match self.history.find_by_id(id).await {
                Some(run) => Ok(run),
                None if self.history.len().await == 0 => Err(empty()),
                None => Err(ToolError::Validation(format!("unknown run_id: {id}"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExportConfig, PublishConfig};
    use crate::error::FetchError;
    use crate::schema::DataPoint;
    use crate::testing::{CountingDownstream, ScriptedSource, test_catalog};

    struct Harness {
        dispatcher: ToolDispatcher,
        downstream: Arc<CountingDownstream>,
    }

    fn harness(source: ScriptedSource) -> Harness {
        let catalog = test_catalog();
        let history = Arc::new(RunHistory::new(50));
        let downstream = Arc::new(CountingDownstream::ok());
        let collector = Arc::new(Collector::new(
            Arc::new(source),
            catalog.clone(),
            history.clone(),
            1,
        ));
        let dispatcher = ToolDispatcher::new(
            collector,
            history.clone(),
            catalog,
            JsonLdExporter::new(history.clone(), ExportConfig::default()),
            Publisher::new(history, downstream.clone(), &PublishConfig::default()),
        );
        Harness { dispatcher, downstream }
    }

    fn succeeding() -> ScriptedSource {
        ScriptedSource::new(|_, _, _| Ok(vec![DataPoint { year: 2023, value: 5.0 }]))
    }

    #[tokio::test]
    async fn lists_six_tools() {
        let h = harness(succeeding());
        let names: Vec<&str> = h.dispatcher.tools().iter().map(|t| t.name).collect();
        assert_eq!(names, vec![
            "collector.run",
            "collector.status",
            "collector.list_catalog",
            "collector.get_collected",
            "collector.export_jsonld",
            "collector.publish",
        ]);
    }

    #[tokio::test]
    async fn unknown_tool_is_error() {
        let h = harness(succeeding());
        let err = h.dispatcher.invoke("collector.nope", Value::Null).await.unwrap_err();
        assert_eq!(err.to_string(), "unknown tool: collector.nope");
    }

    #[tokio::test]
    async fn run_returns_full_run() {
        let h = harness(succeeding());
        let v = h.dispatcher.invoke("collector.run", Value::Null).await.unwrap();
        assert_eq!(v["run"]["status"], "completed");
        assert_eq!(v["run"]["values_collected"], 4);
        assert_eq!(v["run"]["values"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn status_is_empty_before_any_run() {
        let h = harness(succeeding());
        let v = h.dispatcher.invoke("collector.status", json!({})).await.unwrap();
        assert_eq!(v["count"], 0);
    }

    #[tokio::test]
    async fn status_lists_last_ten_without_values() {
        let h = harness(succeeding());
        for _ in 0..12 {
            h.dispatcher.invoke("collector.run", json!({})).await.unwrap();
        }

        let v = h.dispatcher.invoke("collector.status", Value::Null).await.unwrap();
        let runs = v["runs"].as_array().unwrap();
        assert_eq!(v["count"], 10);
        assert_eq!(runs.len(), 10);
        assert!(runs.iter().all(|r| r.get("values").is_none()));
        assert!(runs.iter().all(|r| r["values_collected"] == 4));
    }

    #[tokio::test]
    async fn list_catalog_returns_resources_and_regions() {
        let h = harness(succeeding());
        let v = h.dispatcher.invoke("collector.list_catalog", Value::Null).await.unwrap();
        assert_eq!(v["count"], 2);
        assert_eq!(v["resources"][0]["id"], "r1");
        assert_eq!(v["regions"][1]["code"], "B");
    }

    #[tokio::test]
    async fn get_collected_requires_a_run() {
        let h = harness(succeeding());
        let err = h.dispatcher.invoke("collector.get_collected", Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::EmptyState(_)));

        let err = h
            .dispatcher
            .invoke("collector.get_collected", json!({ "run_id": "run-1" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::EmptyState(_)));
    }

    #[tokio::test]
    async fn get_collected_filters_and_selects_runs() {
        let h = harness(succeeding());
        let first = h.dispatcher.invoke("collector.run", json!({ "resource_ids": ["r2"] })).await.unwrap();
        let first_id = first["run"]["id"].as_str().unwrap().to_string();
        h.dispatcher.invoke("collector.run", Value::Null).await.unwrap();

        let latest = h
            .dispatcher
            .invoke("collector.get_collected", json!({ "resource_id": "r1" }))
            .await
            .unwrap();
        assert_eq!(latest["count"], 2);
        assert!(latest["values"].as_array().unwrap().iter().all(|v| v["resource_id"] == "r1"));

        let older = h
            .dispatcher
            .invoke("collector.get_collected", json!({ "run_id": first_id }))
            .await
            .unwrap();
        assert_eq!(older["run_id"], first_id.as_str());
        assert_eq!(older["count"], 2);

        let err = h
            .dispatcher
            .invoke("collector.get_collected", json!({ "run_id": "run-missing" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn export_before_any_run_is_empty_state() {
        let h = harness(succeeding());
        let err = h.dispatcher.invoke("collector.export_jsonld", Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::EmptyState(_)));
        assert_eq!(err.kind(), "empty_state");
    }

    #[tokio::test]
    async fn export_after_run() {
        let h = harness(succeeding());
        h.dispatcher.invoke("collector.run", Value::Null).await.unwrap();
        let v = h
            .dispatcher
            .invoke("collector.export_jsonld", json!({ "resource_id": "r2" }))
            .await
            .unwrap();
        assert_eq!(v["count"], 2);
        assert_eq!(v["@graph"][0]["@id"], "https://resources.gftd.ai/content/resource/r2/a/2023");
    }

    #[tokio::test]
    async fn publish_skips_empty_latest_run() {
        let h = harness(ScriptedSource::new(|_, _, _| Err(FetchError::Protocol(404))));
        let run = h.dispatcher.invoke("collector.run", Value::Null).await.unwrap();
        assert_eq!(run["run"]["status"], "failed");

        let v = h.dispatcher.invoke("collector.publish", Value::Null).await.unwrap();
        assert_eq!(v["status"], "skipped");
        assert_eq!(h.downstream.call_count(), 0);
    }

    #[tokio::test]
    async fn publish_uses_override_target() {
        let h = harness(succeeding());
        h.dispatcher.invoke("collector.run", Value::Null).await.unwrap();
        let v = h
            .dispatcher
            .invoke("collector.publish", json!({ "target_mcp_url": "http://agg.local/api/mcp" }))
            .await
            .unwrap();
        assert_eq!(v["status"], "published");
        assert_eq!(v["target_url"], "http://agg.local/api/mcp");
        assert_eq!(h.downstream.call_count(), 1);
    }

    #[tokio::test]
    async fn trigger_runs_full_catalog() {
        let h = harness(succeeding());
        let run = h.dispatcher.trigger().await;
        assert_eq!(run.resources_requested, 2);
        assert_eq!(run.collected(), 4);
    }
}
