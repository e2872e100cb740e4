//! ManyWorlds Scenario Simulator
//!
//! Drives the branching engine from `manyworlds_core` through named
//! scenarios and presents the result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ScenarioRunner                         │
//! │   SimConfig (seed, depth) ──► scenario ──► Universe tree     │
//! │                                   │                          │
//! │                      HookRegistry (observers, hooks)         │
//! └───────────────────────────────────┬─────────────────────────┘
//!                                     │
//!                  ┌──────────────────┴──────────────────┐
//!                  ▼                                     ▼
//!          TreeRenderer (plain/decorated)        SimExport (JSON)
//! ```
//!
//! # Usage
//!
//! ```
//! use manyworlds_sim::{ScenarioRunner, SimConfig, TreeStyle, render_tree};
//! use manyworlds_sim::scenarios::ScenarioId;
//!
//! let outcome = ScenarioRunner::new(SimConfig::default())
//!     .run(ScenarioId::Spin)
//!     .unwrap();
//!
//! assert!(outcome.result.passed);
//! println!("{}", render_tree(&outcome.root, TreeStyle::Decorated));
//! ```

mod error;
mod exporter;
mod renderer;
mod runner;
pub mod scenarios;

pub use error::SimError;
pub use exporter::SimExport;
pub use renderer::{render_tree, TreeRenderer, TreeStyle};
pub use runner::{ScenarioOutcome, ScenarioResult, ScenarioRunner, SimConfig};
