//! Scenario runner - builds and measures a multiverse per scenario.

use crate::error::SimError;
use crate::scenarios::ScenarioId;

use manyworlds_core::{Complex, HookRegistry, MultiverseError, MultiverseStats, QuantumSystem, Universe};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// Tolerance for the conservation checks run after each scenario.
const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Configuration for a scenario run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Seed for randomized scenarios
    pub seed: u64,

    /// Number of measurement levels in the cascade scenario
    pub depth: usize,

    /// Upper bound on outcomes per random superposition (at least 2)
    pub max_outcomes: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            depth: 3,
            max_outcomes: 3,
        }
    }
}

impl SimConfig {
    /// Rejects configurations that would explode the tree.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.max_outcomes < 2 {
            return Err(SimError::config("max_outcomes must be at least 2"));
        }
        if self.depth == 0 || self.depth > 8 {
            return Err(SimError::config("depth must be between 1 and 8"));
        }
        let leaves = self.max_outcomes.checked_pow(self.depth as u32);
        if leaves.map_or(true, |n| n > 100_000) {
            return Err(SimError::config(format!(
                "{} outcomes over {} levels exceeds 100000 leaves",
                self.max_outcomes, self.depth
            )));
        }
        Ok(())
    }
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the multiverse conserved probability everywhere
    pub passed: bool,

    /// Shape of the final tree
    pub stats: MultiverseStats,

    /// Re-measurements refused with `AlreadyMeasured`
    pub refused_measurements: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// A finished run: the verdict plus the tree it was computed from.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub result: ScenarioResult,
    pub root: Universe,
}

/// Runs branching scenarios.
pub struct ScenarioRunner {
    config: SimConfig,
    hooks: HookRegistry,
}

impl ScenarioRunner {
    /// Creates a new scenario runner with no hooks.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            hooks: HookRegistry::new(),
        }
    }

    /// Sets the hooks used for every measurement.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs a scenario and returns the verdict with its multiverse.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioOutcome, SimError> {
        self.config.validate()?;
        info!("Starting scenario: {} (seed={})", scenario.name(), self.config.seed);

        let (root, refused_measurements) = match scenario {
            ScenarioId::Spin => self.run_spin()?,
            ScenarioId::Cascade => self.run_cascade()?,
            ScenarioId::Definite => self.run_definite()?,
        };

        let failure_reason = check_conservation(&root);
        let result = ScenarioResult {
            scenario,
            seed: self.config.seed,
            passed: failure_reason.is_none(),
            stats: root.stats(),
            refused_measurements,
            failure_reason,
        };

        Ok(ScenarioOutcome { result, root })
    }

    /// MW-001: spin measurement, then charge in the first branch.
    fn run_spin(&self) -> Result<(Universe, usize), SimError> {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let mut root = Universe::root(QuantumSystem::new([
            ("up", Complex::new(h, 0.0)),
            ("down", Complex::new(h, 0.0)),
        ])?);
        info!("Created root universe: {}", root.id());

        let mut refused = 0;

        root.measure_with("spin_z", &self.hooks)?;
        refused += self.try_remeasure(&mut root, "spin_z")?;

        let first = &mut root.children_mut()[0];
        first.prepare(QuantumSystem::new([
            ("positive", Complex::new(h, 0.0)),
            ("negative", Complex::new(h, 0.0)),
        ])?)?;
        first.measure_with("charge", &self.hooks)?;
        refused += self.try_remeasure(first, "charge")?;

        Ok((root, refused))
    }

    /// MW-002: every leaf gets a fresh random superposition at each level.
    fn run_cascade(&self) -> Result<(Universe, usize), SimError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut root = Universe::root(self.random_system(&mut rng)?);

        for level in 0..self.config.depth {
            let observable = format!("observable_{}", level);
            let leaves = root.leaves_mut();
            debug!("Level {}: measuring {} leaves", level, leaves.len());

            for leaf in leaves {
                if level > 0 {
                    leaf.prepare(self.random_system(&mut rng)?)?;
                }
                leaf.measure_with(&observable, &self.hooks)?;
            }
        }

        Ok((root, 0))
    }

    /// MW-003: measuring definite states never splits a universe.
    fn run_definite(&self) -> Result<(Universe, usize), SimError> {
        let mut root = Universe::root(QuantumSystem::definite("up"));
        let mut refused = 0;

        root.measure_with("spin_z", &self.hooks)?;

        let child = &mut root.children_mut()[0];
        child.measure_with("spin_z_again", &self.hooks)?;

        let grandchild = &mut child.children_mut()[0];
        refused += self.try_remeasure(grandchild, "spin_z")?;

        Ok((root, refused))
    }

    /// Measures an observable that should already be measured. Returns 1 when
    /// the engine refused it.
    fn try_remeasure(&self, universe: &mut Universe, observable: &str) -> Result<usize, SimError> {
        match universe.measure_with(observable, &self.hooks) {
            Ok(_) => Ok(0),
            Err(e @ MultiverseError::AlreadyMeasured { .. }) => {
                warn!("--> {}", e);
                Ok(1)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn random_system(&self, rng: &mut ChaCha8Rng) -> Result<QuantumSystem, SimError> {
        let n = rng.gen_range(2..=self.config.max_outcomes);
        let amplitudes: Vec<(String, Complex<f64>)> = (0..n)
            .map(|i| {
                let r = rng.gen_range(0.1..1.0);
                let theta = rng.gen_range(0.0..std::f64::consts::TAU);
                (format!("o{}", i), Complex::from_polar(r, theta))
            })
            .collect();
        Ok(QuantumSystem::new(amplitudes)?)
    }
}

/// Checks every branch group and the leaf total against the root weight.
fn check_conservation(root: &Universe) -> Option<String> {
    for universe in root.iter() {
        for branch in universe.branches() {
            let total = branch.total_weight();
            if (total - universe.weight()).abs() > CONSERVATION_TOLERANCE {
                return Some(format!(
                    "universe {} split '{}' into weight {:.12} from {:.12}",
                    universe.id(),
                    branch.observable,
                    total,
                    universe.weight()
                ));
            }
        }
    }

    // Leaves of sibling groups overlap in weight, so the total only adds up
    // when every universe measured at most one observable
    if root.iter().any(|u| u.branches().count() > 1) {
        return None;
    }

    let leaf_total = root.stats().total_leaf_weight;
    if (leaf_total - root.weight()).abs() > CONSERVATION_TOLERANCE {
        return Some(format!(
            "leaf weights sum to {:.12}, root weight is {:.12}",
            leaf_total,
            root.weight()
        ));
    }

    None
}
