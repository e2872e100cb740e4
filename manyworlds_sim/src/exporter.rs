//! JSON exporter for scenario runs.
//!
//! Wraps the core multiverse snapshot with the scenario verdict so a run can
//! be inspected offline.

use crate::error::SimError;
use crate::runner::ScenarioOutcome;
use manyworlds_core::{snapshot, MultiverseStats, UniverseNode};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Complete scenario export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Final verdict
    pub passed: bool,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Re-measurements the engine refused
    pub refused_measurements: usize,

    /// Shape of the tree
    pub stats: MultiverseStats,

    /// The multiverse itself
    pub multiverse: UniverseNode,
}

impl SimExport {
    /// Creates an export from a finished run.
    pub fn new(outcome: &ScenarioOutcome) -> Self {
        let result = &outcome.result;
        Self {
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            passed: result.passed,
            failure_reason: result.failure_reason.clone(),
            refused_measurements: result.refused_measurements,
            stats: result.stats.clone(),
            multiverse: snapshot(&outcome.root),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Reads an export written by [`SimExport::write_to_file`].
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
