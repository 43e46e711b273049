use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    collector::history::RunHistory,
    config::PublishConfig,
    error::{FetchError, ToolError},
    metrics::METRICS,
    util,
};

/// Remote JSON-RPC tool endpoint.
///
/// One call per `call_tool`; no retries.
#[async_trait::async_trait]
pub trait Downstream: Send + Sync {
    async fn call_tool(&self, url: &str, tool: &str, args: Value) -> Result<Value, FetchError>;
}

/// JSON-RPC 2.0 `tools/call` client over HTTP POST.
pub struct McpRelayClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl McpRelayClient {
    pub fn new(cfg: &PublishConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_body_bytes: cfg.max_body_bytes,
        })
    }
}

#[async_trait::async_trait]
impl Downstream for McpRelayClient {
    async fn call_tool(&self, url: &str, tool: &str, args: Value) -> Result<Value, FetchError> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "id": format!("collector-{}", util::unix_nanos(Utc::now())),
            "method": "tools/call",
            "params": { "name": tool, "arguments": args },
        });

        let resp = self.client.post(url).json(&envelope).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Protocol(status.as_u16()));
        }

        let body = util::read_capped(resp, self.max_body_bytes).await?;

        let parsed: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        if let Some(err) = parsed.get("error").filter(|e| e.is_object()) {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(FetchError::Remote(message.to_string()));
        }

        match parsed.get("result") {
            Some(result) if result.is_object() => Ok(result.clone()),
            _ => Ok(parsed),
        }
    }
}

/// Result of a publish request.
///
/// A downstream failure is a successful tool result carrying
/// `status: "error"`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PublishOutcome {
    Skipped {
        reason: String,
    },
    Published {
        values_count: usize,
        target_url: String,
        target_response: Value,
    },
    Error {
        detail: String,
    },
}

/// Relays "refresh" signals to the downstream aggregation service.
pub struct Publisher {
    history: Arc<RunHistory>,
    downstream: Arc<dyn Downstream>,
    default_target: String,
    remote_tool: String,
}

impl Publisher {
    pub fn new(history: Arc<RunHistory>, downstream: Arc<dyn Downstream>, cfg: &PublishConfig) -> Self {
        Self {
            history,
            downstream,
            default_target: cfg.target_url.clone(),
            remote_tool: cfg.remote_tool.clone(),
        }
    }

    /// Signals the downstream service about the latest run.
    ///
    /// BEHAVIOR:
    /// - No run             -> `EmptyState` error
    /// - Latest run empty   -> `Skipped`, no network call
    /// - Remote call fails  -> `Error` outcome (not a tool error)
    pub async fn publish(&self, target: Option<&str>) -> Result<PublishOutcome, ToolError> {
        let latest = self.history.latest().await.ok_or_else(|| {
            ToolError::EmptyState("no collection runs; call collector.run first".into())
        })?;

        if latest.values.is_empty() {
            METRICS.publish_skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(PublishOutcome::Skipped {
                reason: "no values to publish".into(),
            });
        }

        let target = target.unwrap_or(self.default_target.as_str());
        METRICS.publish_sent.fetch_add(1, Ordering::Relaxed);

        match self
            .downstream
            .call_tool(target, &self.remote_tool, json!({}))
            .await
        {
            Ok(response) => Ok(PublishOutcome::Published {
                values_count: latest.values.len(),
                target_url: target.to_string(),
                target_response: response,
            }),
            Err(e) => {
                METRICS.publish_errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("publish to {} failed: {}", target, e);
                Ok(PublishOutcome::Error {
                    detail: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CollectedValue, Run};
    use crate::testing::{CountingDownstream, init_tls, serve};
    use axum::{Json, Router, body::Body, http::StatusCode, routing::post};
    use futures_util::{StreamExt, stream};

    fn run_with(values: usize) -> Arc<Run> {
        let v = CollectedValue {
            resource_id: "coal".into(),
            region: "USA".into(),
            region_name: "United States".into(),
            year: 2022,
            value: 1.0,
            unit: "t".into(),
            source: "World Bank API".into(),
            fetched_at: "2026-01-01T00:00:00Z".into(),
        };
        Arc::new(Run {
            id: "run-1".into(),
            started_at: "2026-01-01T00:00:00Z".into(),
            finished_at: "2026-01-01T00:00:01Z".into(),
            resources_requested: 1,
            errors: Vec::new(),
            values: vec![v; values],
        })
    }

    fn relay() -> McpRelayClient {
        init_tls();
        McpRelayClient::new(&PublishConfig::default()).unwrap()
    }

    async fn publisher(run: Option<Arc<Run>>, downstream: Arc<CountingDownstream>) -> Publisher {
        let history = Arc::new(RunHistory::new(50));
        if let Some(run) = run {
            history.append(run).await;
        }
        Publisher::new(history, downstream, &PublishConfig::default())
    }

    #[tokio::test]
    async fn requires_a_run() {
        let ds = Arc::new(CountingDownstream::ok());
        let p = publisher(None, ds.clone()).await;
        assert!(matches!(p.publish(None).await, Err(ToolError::EmptyState(_))));
        assert_eq!(ds.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_run_is_skipped_without_calls() {
        let ds = Arc::new(CountingDownstream::ok());
        let p = publisher(Some(run_with(0)), ds.clone()).await;

        let outcome = p.publish(Some("http://example.invalid/api/mcp")).await.unwrap();
        assert!(matches!(outcome, PublishOutcome::Skipped { .. }));
        assert_eq!(ds.call_count(), 0);
        assert_eq!(serde_json::to_value(&outcome).unwrap()["status"], "skipped");
    }

    #[tokio::test]
    async fn publishes_to_default_target() {
        let ds = Arc::new(CountingDownstream::ok());
        let p = publisher(Some(run_with(3)), ds.clone()).await;

        let outcome = p.publish(None).await.unwrap();
        assert_eq!(ds.call_count(), 1);
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["status"], "published");
        assert_eq!(v["values_count"], 3);
        assert_eq!(v["target_url"], PublishConfig::default().target_url);
        assert_eq!(v["target_response"]["echo_tool"], "global.list_resources");
    }

    #[tokio::test]
    async fn downstream_failure_is_captured() {
        let ds = Arc::new(CountingDownstream::failing());
        let p = publisher(Some(run_with(1)), ds.clone()).await;

        let outcome = p.publish(Some("http://other/api/mcp")).await.unwrap();
        assert_eq!(outcome, PublishOutcome::Error {
            detail: "http 503".into()
        });
    }

    #[tokio::test]
    async fn relay_client_unwraps_result() {
        let app = Router::new().route(
            "/api/mcp",
            post(|Json(req): Json<Value>| async move {
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": req["id"],
                    "result": { "tool": req["params"]["name"], "count": 2 }
                }))
            }),
        );
        let url = format!("{}/api/mcp", serve(app).await);

        let client = relay();
        let result = client.call_tool(&url, "global.list_resources", json!({})).await.unwrap();
        assert_eq!(result, json!({ "tool": "global.list_resources", "count": 2 }));
    }

    #[tokio::test]
    async fn relay_client_surfaces_remote_errors() {
        let app = Router::new().route(
            "/api/mcp",
            post(|| async {
                Json(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32000, "message": "boom" } }))
            }),
        );
        let url = format!("{}/api/mcp", serve(app).await);

        let client = relay();
        let err = client.call_tool(&url, "x", json!({})).await.unwrap_err();
        assert!(matches!(err, FetchError::Remote(ref m) if m == "boom"));
    }

    #[tokio::test]
    async fn relay_client_caps_response_body() {
        let app = Router::new().route(
            "/api/mcp",
            post(|| async {
                Json(json!({ "jsonrpc": "2.0", "id": 1, "result": { "padding": "x".repeat(256) } }))
            }),
        );
        let url = format!("{}/api/mcp", serve(app).await);

        init_tls();
        let cfg = PublishConfig {
            max_body_bytes: 32,
            ..PublishConfig::default()
        };
        let client = McpRelayClient::new(&cfg).unwrap();
        let err = client.call_tool(&url, "x", json!({})).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));

        let ok = relay().call_tool(&url, "x", json!({})).await.unwrap();
        assert_eq!(ok["padding"].as_str().unwrap().len(), 256);
    }

    #[tokio::test]
    async fn relay_client_reports_status_before_body() {
        let app = Router::new().route(
            "/api/mcp",
            post(|| async {
                let head = stream::iter([Ok::<_, std::io::Error>("{\"jsonrpc\"")]);
                let broken = stream::once(async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Err(std::io::Error::other("reset"))
                });
                (StatusCode::SERVICE_UNAVAILABLE, Body::from_stream(head.chain(broken)))
            }),
        );
        let url = format!("{}/api/mcp", serve(app).await);

        let err = relay().call_tool(&url, "x", json!({})).await.unwrap_err();
        assert!(matches!(err, FetchError::Protocol(503)));
    }

    #[tokio::test]
    async fn relay_client_maps_bad_status() {
        let app = Router::new().route("/api/mcp", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let url = format!("{}/api/mcp", serve(app).await);

        let client = relay();
        let err = client.call_tool(&url, "x", json!({})).await.unwrap_err();
        assert!(matches!(err, FetchError::Protocol(500)));
    }
}
