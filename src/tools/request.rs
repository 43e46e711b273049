use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ToolError;

use super::specs;

/// Typed, validated tool invocation.
///
/// String arguments are trimmed; blank strings and empty id lists
/// count as absent.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Run {
        resource_ids: Option<Vec<String>>,
        year: Option<i32>,
    },
    Status,
    ListCatalog,
    GetCollected {
        resource_id: Option<String>,
        run_id: Option<String>,
    },
    ExportJsonLd {
        resource_id: Option<String>,
    },
    Publish {
        target_url: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunArgs {
    resource_ids: Option<Vec<String>>,
    year: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CollectedArgs {
    resource_id: Option<String>,
    run_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportArgs {
    resource_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PublishArgs {
    target_mcp_url: Option<String>,
}

impl ToolRequest {
    /// Resolves a capability name and validates its arguments.
    ///
    /// FAILS:
    /// - `UnknownCapability` for an unregistered name
    /// - `Validation` for non-object arguments, wrong field types
    ///   or a non-positive year
    pub fn parse(name: &str, args: Value) -> Result<Self, ToolError> {
        if !specs::is_known(name) {
            return Err(ToolError::UnknownCapability(name.to_string()));
        }

        let args = match args {
            Value::Null => Value::Object(Map::new()),
            Value::Object(map) => Value::Object(map),
            _ => return Err(ToolError::Validation("arguments must be an object".into())),
        };

        match name {
            specs::RUN => {
                let a: RunArgs = decode(args)?;
                let resource_ids = a
                    .resource_ids
                    .map(|ids| {
                        ids.iter()
                            .filter_map(|s| non_blank(Some(s.clone())))
                            .collect::<Vec<_>>()
                    })
                    .filter(|ids| !ids.is_empty());
                Ok(ToolRequest::Run {
                    resource_ids,
                    year: a.year.map(positive_year).transpose()?,
                })
            }
            specs::STATUS => Ok(ToolRequest::Status),
            specs::LIST_CATALOG => Ok(ToolRequest::ListCatalog),
            specs::GET_COLLECTED => {
                let a: CollectedArgs = decode(args)?;
                Ok(ToolRequest::GetCollected {
                    resource_id: non_blank(a.resource_id),
                    run_id: non_blank(a.run_id),
                })
            }
            specs::EXPORT_JSONLD => {
                let a: ExportArgs = decode(args)?;
                Ok(ToolRequest::ExportJsonLd {
                    resource_id: non_blank(a.resource_id),
                })
            }
            specs::PUBLISH => {
                let a: PublishArgs = decode(args)?;
                Ok(ToolRequest::Publish {
                    target_url: non_blank(a.target_mcp_url),
                })
            }
            other => Err(ToolError::UnknownCapability(other.to_string())),
        }
    }
}

fn decode<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::Validation(e.to_string()))
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn positive_year(y: i64) -> Result<i32, ToolError> {
    i32::try_from(y)
        .ok()
        .filter(|y| *y > 0)
        .ok_or_else(|| ToolError::Validation(format!("year must be a positive integer, got {y}")))
}
