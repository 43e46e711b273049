//! HTTP routes: JSON-RPC tool endpoint, scheduler trigger, health.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{Method, StatusCode, Uri, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower::{Layer, util::MapRequest, util::MapRequestLayer};
use tower_http::cors::{Any, CorsLayer};

use crate::{metrics::METRICS, tools::ToolDispatcher};

use super::protocol::*;

const SERVICE_NAME: &str = "resource-collector";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ToolDispatcher>,
}

/// Router wrapped with actor-prefix stripping applied before routing.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Builds the served application.
///
/// Deployments may mount the service under an actor segment
/// (`/w5n8p3q6/api/mcp`); the segment is removed before route matching.
pub fn build_app(dispatcher: Arc<ToolDispatcher>) -> App {
    MapRequestLayer::new(strip_actor_prefix as fn(Request) -> Request)
        .layer(build_router(dispatcher))
}

/// Builds the full router with all routes and middleware.
pub fn build_router(dispatcher: Arc<ToolDispatcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/healthz", get(health))
        .route("/readyz", get(health))
        .route("/api/mcp", post(handle_mcp))
        .route("/scheduler/trigger", post(scheduler_trigger))
        .fallback(not_found)
        .layer(cors)
        .with_state(AppState { dispatcher })
}

fn strip_actor_prefix(mut req: Request) -> Request {
    let Some(path) = without_actor_prefix(req.uri().path()) else {
        return req;
    };
    let rewritten = match req.uri().query() {
        Some(q) => format!("{path}?{q}"),
        None => path,
    };
    if let Ok(uri) = rewritten.parse::<Uri>() {
        *req.uri_mut() = uri;
    }
    req
}

/// Drops a leading 8-character lowercase alphanumeric segment when more
/// segments follow it.
fn without_actor_prefix(path: &str) -> Option<String> {
    let (first, rest) = path.trim_matches('/').split_once('/')?;
    let is_actor = first.len() == 8
        && first
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    is_actor.then(|| format!("/{rest}"))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

/// POST /scheduler/trigger: full collection run, executed inline.
async fn scheduler_trigger(State(state): State<AppState>) -> Json<Value> {
    let run = state.dispatcher.trigger().await;
    Json(json!({
        "status": "triggered",
        "run_id": run.id,
        "collected": run.collected(),
    }))
}

/// POST /api/mcp: JSON-RPC 2.0 `tools/list` and `tools/call`.
async fn handle_mcp(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<JsonRpcResponse>) {
    METRICS.rpc_requests.fetch_add(1, Ordering::Relaxed);

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return bad_request(JsonRpcResponse::error(None, PARSE_ERROR, "parse error")),
    };
    let id_hint = raw.get("id").cloned();

    let req: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(_) => {
            return bad_request(JsonRpcResponse::error(id_hint, INVALID_REQUEST, "invalid request"));
        }
    };
    if req.jsonrpc != "2.0" {
        return bad_request(JsonRpcResponse::error(req.id, INVALID_REQUEST, "invalid request"));
    }

    let id = req.id;
    match req.method.as_str() {
        "tools/list" => ok(JsonRpcResponse::success(
            id,
            json!({ "tools": state.dispatcher.tools() }),
        )),

        "tools/call" => {
            let params: ToolCallParams = match serde_json::from_value(req.params) {
                Ok(p) => p,
                Err(e) => {
                    return bad_request(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()));
                }
            };

            log::info!("tool call: {}", params.name);
            match state.dispatcher.invoke(&params.name, params.arguments).await {
                Ok(result) => ok(JsonRpcResponse::success(id, result)),
                Err(e) => {
                    log::debug!("tool {} failed: {}", params.name, e);
                    ok(JsonRpcResponse::error_with_data(
                        id,
                        TOOL_ERROR,
                        e.to_string(),
                        Some(json!({ "kind": e.kind() })),
                    ))
                }
            }
        }

        _ => bad_request(JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found")),
    }
}

fn ok(resp: JsonRpcResponse) -> (StatusCode, Json<JsonRpcResponse>) {
    (StatusCode::OK, Json(resp))
}

fn bad_request(resp: JsonRpcResponse) -> (StatusCode, Json<JsonRpcResponse>) {
    (StatusCode::BAD_REQUEST, Json(resp))
}
