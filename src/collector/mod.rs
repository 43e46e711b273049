//! Collector module
//!
//! This module groups the collection engine:
//! - `runner`:  the orchestrator scanning resources × regions
//! - `history`: the bounded store of completed runs
//!
//! The collector layer sits between:
//! - Data source adapters (World Bank, …)
//! - The tool dispatcher and exporters (readers of the history)
//!
//! Source-specific parsing MUST NOT live here.

pub mod history;
pub mod runner;
