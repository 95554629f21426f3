//! Run summaries.
//!
//! Each pass returns a serializable outcome; `RunSummary` collects whichever
//! passes ran plus the execution context and is written as pretty TOML when
//! the user asks for `--summary`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::dedupe::DedupeOutcome;
use crate::size_filter::FilterOutcome;
use crate::split::SplitOutcome;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe: Option<DedupeOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byre_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_line: Option<Vec<String>>,
}

/// Execution context for the current invocation.
pub fn execution_context() -> ExecutionContext {
    ExecutionContext {
        timestamp: Some(Utc::now()),
        byre_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        command_line: Some(std::env::args().collect()),
    }
}

/// Write a summary as pretty TOML, creating parent directories as needed.
pub fn save_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml_content = toml::to_string_pretty(summary)?;
    fs::write(path, toml_content)?;
    log::debug!("📋 Saved run summary to: {}", path.display());
    Ok(())
}
