//! Capability definitions advertised through `tools/list`.

use serde::Serialize;
use serde_json::{Value, json};

pub const RUN: &str = "collector.run";
pub const STATUS: &str = "collector.status";
pub const LIST_CATALOG: &str = "collector.list_catalog";
pub const GET_COLLECTED: &str = "collector.get_collected";
pub const EXPORT_JSONLD: &str = "collector.export_jsonld";
pub const PUBLISH: &str = "collector.publish";

/// Tool definition
#[derive(Debug, Serialize, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// All available tools, in advertisement order.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: RUN,
            description: "Trigger a resource collection run. Fetches data from the statistics source for all cataloged resources and regions.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resource_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional filter: only collect these resource IDs"
                    },
                    "year": {
                        "type": "integer",
                        "description": "Target year (default: latest available window)"
                    }
                }
            }),
        },
        ToolSpec {
            name: STATUS,
            description: "Get the status of recent collection runs.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolSpec {
            name: LIST_CATALOG,
            description: "List all resource definitions and regions in the collection catalog.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolSpec {
            name: GET_COLLECTED,
            description: "Get collected values from the latest run (or a given run), optionally filtered by resource_id.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resource_id": { "type": "string" },
                    "run_id": { "type": "string" }
                }
            }),
        },
        ToolSpec {
            name: EXPORT_JSONLD,
            description: "Export collected data as JSON-LD for publishing to the resources repository.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resource_id": { "type": "string" }
                }
            }),
        },
        ToolSpec {
            name: PUBLISH,
            description: "Signal the downstream aggregation service to refresh from the latest run.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target_mcp_url": {
                        "type": "string",
                        "description": "JSON-RPC endpoint to publish to (default: configured target)"
                    }
                }
            }),
        },
    ]
}

pub fn is_known(name: &str) -> bool {
    tool_specs().iter().any(|t| t.name == name)
}
