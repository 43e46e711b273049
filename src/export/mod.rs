//! Exporters reading the latest completed run.
//!
//! - `jsonld`:  schema.org JSON-LD projection
//! - `publish`: refresh signal relayed to the downstream service

pub mod jsonld;
pub mod publish;
