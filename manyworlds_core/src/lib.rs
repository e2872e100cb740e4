//! ManyWorlds Core - Lazy Many-Worlds Branching Engine
//!
//! A toy model of the many-worlds interpretation:
//! 1. **State**: a [`QuantumSystem`] holds normalized complex amplitudes over
//!    the outcomes of one observable
//! 2. **Branching**: measuring an observable in a [`Universe`] materializes one
//!    child per outcome, weighted by the Born rule, once per observable
//! 3. **Export**: the resulting tree is walked read-only and written as JSON
//!
//! # Example
//!
//! ```
//! use manyworlds_core::{QuantumSystem, Universe, HookRegistry};
//! use manyworlds_core::Complex;
//!
//! let h = std::f64::consts::FRAC_1_SQRT_2;
//! let system = QuantumSystem::new([
//!     ("up", Complex::new(h, 0.0)),
//!     ("down", Complex::new(h, 0.0)),
//! ]).unwrap();
//!
//! let mut root = Universe::root(system);
//! let children = root.measure_with("spin_z", &HookRegistry::new()).unwrap();
//! assert_eq!(children.len(), 2);
//! ```

pub mod error;
pub mod quantum;
pub mod universe;
pub mod hooks;
pub mod export;

// Re-export key types for convenience
pub use error::{HookError, MultiverseError};
pub use quantum::QuantumSystem;
pub use universe::{Branch, MultiverseStats, Origin, Universe, UniverseId};
pub use hooks::{
    clear_hooks, register_post_measurement_hook, register_universe_creation_observer,
    HookRegistry,
};
pub use export::{dump_multiverse, read_multiverse, snapshot, write_multiverse, AmplitudeEntry, UniverseNode};

/// Complex amplitude type used throughout the engine.
pub use nalgebra::Complex;
