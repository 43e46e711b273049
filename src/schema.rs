use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Resource category.
///
/// Serialized lowercase; the wire name of the field is `type`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Energy,
    Mineral,
    Food,
    Technology,
}

// ------------------------------------------------------------
// Catalog entries
// ------------------------------------------------------------
//
// Immutable after startup. `indicator` is the external series code
// fetched for this resource; several resources may share one.
//
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResourceDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub unit: String,
    pub description: String,
    pub source_url: String,
    pub indicator: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Region {
    pub code: String,
    pub name: String,
}

/// One (year, value) observation returned by a data source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub year: i32,
    pub value: f64,
}

// ------------------------------------------------------------
// Collected value
// ------------------------------------------------------------
//
// Canonical record produced by a run. Never mutated after it has
// been appended to a run.
//
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CollectedValue {
    pub resource_id: String,

    /// Region code as listed in the catalog (e.g. "USA")
    pub region: String,

    pub region_name: String,
    pub year: i32,
    pub value: f64,
    pub unit: String,

    /// Source label (e.g. "World Bank API")
    pub source: String,

    /// RFC 3339 timestamp shared by every value of the run
    pub fetched_at: String,
}

// ------------------------------------------------------------
// Run status
// ------------------------------------------------------------
//
// State machine:
//
//   running ──▶ completed   errors empty
//           ├─▶ partial     errors present, values collected
//           └─▶ failed      errors present, nothing collected
//
// `running` is never observed outside the orchestrator.
//
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Partial,
    Failed,
}

impl RunStatus {
    /// Terminal status of a finished scan.
    pub fn derive(has_errors: bool, collected: usize) -> Self {
        match (has_errors, collected) {
            (false, _) => RunStatus::Completed,
            (true, 0) => RunStatus::Failed,
            (true, _) => RunStatus::Partial,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        }
    }
}

// ------------------------------------------------------------
// Run
// ------------------------------------------------------------
//
// A finished collection scan. Only the orchestrator constructs it,
// and only once the scan is over, so every `Run` is terminal.
//
// INVARIANTS:
// - `status()` is derived from (errors, values); it is not stored
// - `collected()` equals `values.len()`
//
#[derive(Debug, Clone)]
pub struct Run {
    pub id: String,
    pub started_at: String,
    pub finished_at: String,
    pub resources_requested: usize,
    pub errors: Vec<String>,
    pub values: Vec<CollectedValue>,
}

impl Run {
    pub fn status(&self) -> RunStatus {
        RunStatus::derive(!self.errors.is_empty(), self.values.len())
    }

    pub fn collected(&self) -> usize {
        self.values.len()
    }

    /// Status view without the value list.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            id: self.id.clone(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            status: self.status(),
            resources_requested: self.resources_requested,
            values_collected: self.collected(),
            error_count: self.errors.len(),
        }
    }
}

impl Serialize for Run {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Run", 8)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("started_at", &self.started_at)?;
        s.serialize_field("finished_at", &self.finished_at)?;
        s.serialize_field("status", &self.status())?;
        s.serialize_field("resources_requested", &self.resources_requested)?;
        s.serialize_field("values_collected", &self.collected())?;
        s.serialize_field("errors", &self.errors)?;
        s.serialize_field("values", &self.values)?;
        s.end()
    }
}

/// Listing view of a run; never carries values.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RunSummary {
    pub id: String,
    pub started_at: String,
    pub finished_at: String,
    pub status: RunStatus,
    pub resources_requested: usize,
    pub values_collected: usize,
    pub error_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value() -> CollectedValue {
        CollectedValue {
            resource_id: "coal".into(),
            region: "USA".into(),
            region_name: "United States".into(),
            year: 2022,
            value: 19.5,
            unit: "million tonnes".into(),
            source: "World Bank API".into(),
            fetched_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn run(errors: usize, values: usize) -> Run {
        Run {
            id: "run-1".into(),
            started_at: "2026-01-01T00:00:00Z".into(),
            finished_at: "2026-01-01T00:00:05Z".into(),
            resources_requested: 1,
            errors: (0..errors).map(|i| format!("coal/R{i}: http 500")).collect(),
            values: (0..values).map(|_| value()).collect(),
        }
    }

    #[test]
    fn status_derivation_is_exhaustive() {
        assert_eq!(RunStatus::derive(false, 0), RunStatus::Completed);
        assert_eq!(RunStatus::derive(false, 7), RunStatus::Completed);
        assert_eq!(RunStatus::derive(true, 0), RunStatus::Failed);
        assert_eq!(RunStatus::derive(true, 3), RunStatus::Partial);
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::derive(true, 0).is_terminal());
    }

    #[test]
    fn run_status_follows_contents() {
        assert_eq!(run(0, 2).status(), RunStatus::Completed);
        assert_eq!(run(1, 2).status(), RunStatus::Partial);
        assert_eq!(run(2, 0).status(), RunStatus::Failed);
    }

    #[test]
    fn run_serializes_derived_fields() {
        let v = serde_json::to_value(run(1, 2)).unwrap();
        assert_eq!(v["status"], "partial");
        assert_eq!(v["values_collected"], 2);
        assert_eq!(v["values"].as_array().unwrap().len(), 2);
        assert_eq!(v["errors"][0], "coal/R0: http 500");
    }

    #[test]
    fn summary_omits_values() {
        let v = serde_json::to_value(run(0, 3).summary()).unwrap();
        assert!(v.get("values").is_none());
        assert_eq!(v["values_collected"], 3);
        assert_eq!(v["error_count"], 0);
        assert_eq!(v["status"], "completed");
    }

    #[test]
    fn definition_uses_type_on_the_wire() {
        let def = ResourceDefinition {
            id: "wheat".into(),
            name: "Wheat".into(),
            category: Category::Food,
            unit: "million tonnes".into(),
            description: "Wheat".into(),
            source_url: "https://example.org".into(),
            indicator: "AG.PRD.FOOD.XD".into(),
        };
        let v = serde_json::to_value(&def).unwrap();
        assert_eq!(v["type"], "food");
    }
}
