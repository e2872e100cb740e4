//! The "BRANCH" half of the engine - universes and the measurement protocol.
//!
//! Every [`Universe`] owns its [`QuantumSystem`] and the child universes
//! produced by measuring it. Branches are kept per observable: each
//! successful measurement appends one branch group, so the state of an
//! observable in a universe is either unmeasured or measured-with-children.
//! Groups are stored in measurement order and never removed.
//!
//! # Measurement protocol
//!
//! 1. Refuse observables already measured here or in an ancestor
//!    (`AlreadyMeasured`).
//! 2. Plan one branch per outcome with probability >= 1e-12 (a definite
//!    system yields a single branch carrying the full weight).
//! 3. Create every child, then commit the branch group, the measured mark and
//!    the history entry.
//! 4. Fan out to creation observers (per child), then post-measurement hooks.
//!
//! Outcomes below 1e-12 are skipped on purpose: they would add branches with
//! negligible weight. The lost mass stays far below the 1e-9 tolerance.

use crate::error::MultiverseError;
use crate::hooks::{self, HookRegistry};
use crate::quantum::{QuantumSystem, NEGLIGIBLE_PROBABILITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Unique identifier of a universe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniverseId(pub Uuid);

impl UniverseId {
    /// Creates a fresh random ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short 8-character form used in logs and rendered trees.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for UniverseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// How a child universe came into existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    /// Observable whose measurement created the child
    pub observable: String,

    /// Outcome this child represents
    pub outcome: String,

    /// Born probability of the outcome in the parent
    pub probability: f64,
}

/// Children produced by one measurement, borrowed from their parent.
#[derive(Debug, Clone, Copy)]
pub struct Branch<'a> {
    /// Observable that was measured
    pub observable: &'a str,

    /// One child per non-negligible outcome, in basis order
    pub children: &'a [Universe],
}

impl Branch<'_> {
    /// Sum of the children's weights.
    pub fn total_weight(&self) -> f64 {
        self.children.iter().map(|c| c.weight).sum()
    }
}

/// Slice of `Universe::children` owned by one measurement.
#[derive(Debug)]
struct BranchGroup {
    observable: String,
    range: Range<usize>,
}

/// A node in the branching tree.
#[derive(Debug)]
pub struct Universe {
    id: UniverseId,
    system: QuantumSystem,
    weight: f64,
    measured: BTreeSet<String>,
    history: Vec<String>,
    parent: Option<UniverseId>,
    depth: usize,
    origin: Option<Origin>,
    children: Vec<Universe>,
    groups: Vec<BranchGroup>,
}

impl Universe {
    /// Creates a root universe with weight 1.0.
    pub fn root(system: QuantumSystem) -> Self {
        Self {
            id: UniverseId::new(),
            system,
            weight: 1.0,
            measured: BTreeSet::new(),
            history: vec!["Universe created".to_string()],
            parent: None,
            depth: 0,
            origin: None,
            children: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Creates a root universe with an explicit weight.
    ///
    /// # Errors
    /// `InvalidWeight` unless the weight is finite and strictly positive.
    pub fn with_weight(system: QuantumSystem, weight: f64) -> Result<Self, MultiverseError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(MultiverseError::InvalidWeight(weight));
        }
        let mut universe = Self::root(system);
        universe.weight = weight;
        Ok(universe)
    }

    pub fn id(&self) -> UniverseId {
        self.id
    }

    pub fn system(&self) -> &QuantumSystem {
        &self.system
    }

    /// Born-rule weight relative to the whole multiverse.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// ID of the parent universe (non-owning back-link).
    pub fn parent(&self) -> Option<UniverseId> {
        self.parent
    }

    /// Observable and outcome that created this universe. `None` for a root.
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// Observables measured here or in any ancestor, sorted.
    pub fn measured_observables(&self) -> impl Iterator<Item = &str> {
        self.measured.iter().map(String::as_str)
    }

    pub fn is_measured(&self, observable: &str) -> bool {
        self.measured.contains(observable)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Branch groups created here, in measurement order.
    pub fn branches(&self) -> impl Iterator<Item = Branch<'_>> + '_ {
        self.groups.iter().map(move |group| self.view(group))
    }

    /// The branch group produced by measuring `observable` here, if any.
    ///
    /// `None` both for unmeasured observables and for observables measured
    /// in an ancestor.
    pub fn branch_for(&self, observable: &str) -> Option<Branch<'_>> {
        self.groups
            .iter()
            .find(|group| group.observable == observable)
            .map(|group| self.view(group))
    }

    fn view<'a>(&'a self, group: &'a BranchGroup) -> Branch<'a> {
        Branch {
            observable: &group.observable,
            children: &self.children[group.range.clone()],
        }
    }

    /// Materialized children of every branch group.
    ///
    /// Groups appear in measurement order and children within a group in
    /// outcome order. Empty while nothing has been measured here.
    pub fn children(&self) -> &[Universe] {
        &self.children
    }

    /// Mutable access to the children, used to measure deeper.
    pub fn children_mut(&mut self) -> &mut [Universe] {
        &mut self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Measures `observable` using the process-wide hook registry.
    pub fn measure(&mut self, observable: &str) -> Result<&[Universe], MultiverseError> {
        let hooks = hooks::snapshot();
        self.measure_with(observable, &hooks)
    }

    /// Measures `observable`, appending one branch group.
    ///
    /// Returns the children created by this call. On a hook failure the
    /// children stay attached and the observable stays measured; the error
    /// names the observable and the hook's message.
    pub fn measure_with(
        &mut self,
        observable: &str,
        hooks: &HookRegistry,
    ) -> Result<&[Universe], MultiverseError> {
        if self.measured.contains(observable) {
            warn!(
                "Universe {} already measured observable '{}'; no new branches created",
                self.id, observable
            );
            return Err(MultiverseError::AlreadyMeasured {
                universe: self.id,
                observable: observable.to_string(),
            });
        }

        info!(
            "Performing measurement '{}' in universe {} (w={:.5})",
            observable, self.id, self.weight
        );
        debug!("System amplitudes: {}", self.system);

        let plan = self.plan_branches(observable)?;

        let outcomes: Vec<&str> = plan.iter().map(|(o, _)| o.as_str()).collect();
        let entry = format!("Measured '{}', branched into {:?}", observable, outcomes);

        let mut child_measured = self.measured.clone();
        child_measured.insert(observable.to_string());

        let mut history = self.history.clone();
        history.push(entry.clone());

        let children = plan
            .iter()
            .map(|(outcome, probability)| {
                self.spawn_child(observable, outcome, *probability, &child_measured, &history)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Commit: everything below this point only reads the tree
        let start = self.children.len();
        self.children.extend(children);
        let range = start..self.children.len();

        self.measured.insert(observable.to_string());
        self.history = history;
        self.groups.push(BranchGroup {
            observable: observable.to_string(),
            range: range.clone(),
        });

        self.fan_out(observable, range.clone(), hooks)?;

        Ok(&self.children[range])
    }

    /// Re-prepares the state of a universe that has no children yet.
    ///
    /// This is the one in-place change of a universe's system, an exception
    /// to immutability kept so a branch can pose a new observable before
    /// measuring it (the spin scenario prepares `charge` this way).
    /// Branched universes keep their system.
    ///
    /// # Errors
    /// `AlreadyBranched` once children exist.
    pub fn prepare(&mut self, system: QuantumSystem) -> Result<(), MultiverseError> {
        if !self.is_leaf() {
            return Err(MultiverseError::AlreadyBranched(self.id));
        }
        info!("Universe {} prepared in {}", self.id, system);
        self.history.push(format!("Prepared {}", system));
        self.system = system;
        Ok(())
    }

    /// Outcomes (with probability) that get a branch.
    fn plan_branches(&self, observable: &str) -> Result<Vec<(String, f64)>, MultiverseError> {
        if let Some(outcome) = self.system.definite_outcome() {
            info!(
                "  Universe {} has a definite state '{}'; single branch",
                self.id, outcome
            );
            return Ok(vec![(outcome.to_string(), 1.0)]);
        }

        let mut plan = Vec::new();
        for (outcome, p) in self.system.probabilities() {
            if p < NEGLIGIBLE_PROBABILITY {
                if p > 0.0 {
                    warn!("  Skipping negligible outcome '{}' (p={:e})", outcome, p);
                }
                continue;
            }
            plan.push((outcome.to_string(), p));
        }

        if plan.is_empty() {
            return Err(MultiverseError::invalid_state(format!(
                "no outcome with non-negligible probability for '{}'",
                observable
            )));
        }

        Ok(plan)
    }

    fn spawn_child(
        &self,
        observable: &str,
        outcome: &str,
        probability: f64,
        measured: &BTreeSet<String>,
        history: &[String],
    ) -> Result<Universe, MultiverseError> {
        let system = self.system.collapsed_to(outcome)?;
        let weight = self.weight * probability;

        let mut history = history.to_vec();
        history.push(format!(
            "Emerged from '{}' as '{}' (Prob: {:.2}%)",
            observable,
            outcome,
            probability * 100.0
        ));

        let child = Universe {
            id: UniverseId::new(),
            system,
            weight,
            measured: measured.clone(),
            history,
            parent: Some(self.id),
            depth: self.depth + 1,
            origin: Some(Origin {
                observable: observable.to_string(),
                outcome: outcome.to_string(),
                probability,
            }),
            children: Vec::new(),
            groups: Vec::new(),
        };

        info!(
            "  -> Created universe {} for outcome '{}' (w={:.5})",
            child.id, outcome, weight
        );
        Ok(child)
    }

    fn fan_out(
        &self,
        observable: &str,
        created: Range<usize>,
        hooks: &HookRegistry,
    ) -> Result<(), MultiverseError> {
        let hook_failed = |e: crate::error::HookError| MultiverseError::Hook {
            observable: observable.to_string(),
            message: e.0,
        };

        for child in &self.children[created] {
            let outcome = child
                .origin
                .as_ref()
                .map(|o| o.outcome.as_str())
                .unwrap_or_default();
            hooks.notify_created(child, outcome).map_err(hook_failed)?;
        }

        hooks.notify_measured(self, observable).map_err(hook_failed)
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    /// Depth-first pre-order walk, children in the order of [`Universe::children`].
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// All universes without children, left to right.
    pub fn leaves(&self) -> Vec<&Universe> {
        self.iter().filter(|u| u.is_leaf()).collect()
    }

    /// Mutable handles to every universe without children, left to right.
    pub fn leaves_mut(&mut self) -> Vec<&mut Universe> {
        let mut out = Vec::new();
        self.collect_leaves_mut(&mut out);
        out
    }

    fn collect_leaves_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Universe>) {
        if self.is_leaf() {
            out.push(self);
            return;
        }
        for child in self.children.iter_mut() {
            child.collect_leaves_mut(out);
        }
    }

    /// Finds a universe anywhere in this subtree.
    pub fn find(&self, id: UniverseId) -> Option<&Universe> {
        self.iter().find(|u| u.id == id)
    }

    /// Statistics over this subtree.
    pub fn stats(&self) -> MultiverseStats {
        let mut stats = MultiverseStats::default();

        for universe in self.iter() {
            stats.universe_count += 1;
            stats.branch_count += universe.groups.len();
            stats.max_depth = stats.max_depth.max(universe.depth - self.depth);
            if universe.is_leaf() {
                stats.leaf_count += 1;
                stats.total_leaf_weight += universe.weight;
            }
        }

        stats
    }
}

/// Pre-order iterator over a universe subtree.
pub struct Iter<'a> {
    stack: Vec<&'a Universe>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Universe;

    fn next(&mut self) -> Option<Self::Item> {
        let universe = self.stack.pop()?;
        self.stack.extend(universe.children.iter().rev());
        Some(universe)
    }
}

/// Statistics about a multiverse tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiverseStats {
    pub universe_count: usize,
    pub leaf_count: usize,
    /// Measurements that produced children
    pub branch_count: usize,
    pub max_depth: usize,
    /// Equals the root weight when every measurement conserved probability
    /// and no universe branched on more than one observable
    pub total_leaf_weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use approx::assert_relative_eq;
    use nalgebra::Complex;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn spin_half() -> QuantumSystem {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        QuantumSystem::new([
            ("up", Complex::new(h, 0.0)),
            ("down", Complex::new(h, 0.0)),
        ])
        .unwrap()
    }

    fn quiet() -> HookRegistry {
        HookRegistry::new()
    }

    #[test]
    fn test_spin_measurement_branches() {
        let mut root = Universe::root(spin_half());
        let children = root.measure_with("spin_z", &quiet()).unwrap();

        assert_eq!(children.len(), 2);
        let labels: Vec<&str> = children
            .iter()
            .map(|c| c.origin().unwrap().outcome.as_str())
            .collect();
        assert_eq!(labels, vec!["up", "down"]);

        for child in children {
            assert_relative_eq!(child.weight(), 0.5, epsilon = 1e-9);
            assert!(child.system().is_definite());
            assert_eq!(child.depth(), 1);
            assert!(child.is_measured("spin_z"));
        }
        assert_eq!(root.children()[0].parent(), Some(root.id()));
    }

    #[test]
    fn test_weight_conservation() {
        let mut root = Universe::with_weight(QuantumSystem::uniform(["a", "b", "c"]).unwrap(), 0.3).unwrap();
        root.measure_with("x", &quiet()).unwrap();

        let total: f64 = root.children().iter().map(|c| c.weight()).sum();
        assert_relative_eq!(total, root.weight(), epsilon = 1e-9);
        assert_relative_eq!(root.branch_for("x").unwrap().total_weight(), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_repeat_measurement_blocked() {
        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &quiet()).unwrap();
        let first: Vec<UniverseId> = root.children().iter().map(|c| c.id()).collect();

        let err = root.measure_with("spin_z", &quiet()).unwrap_err();
        assert!(err.is_already_measured());

        let second: Vec<UniverseId> = root.children().iter().map(|c| c.id()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_child_inherits_measured_observable() {
        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &quiet()).unwrap();

        let child = &mut root.children_mut()[0];
        let err = child.measure_with("spin_z", &quiet()).unwrap_err();
        assert!(matches!(err, MultiverseError::AlreadyMeasured { .. }));
        assert!(child.is_leaf());
    }

    #[test]
    fn test_definite_state_single_branch() {
        let mut root = Universe::with_weight(QuantumSystem::definite("up"), 0.25).unwrap();
        let children = root.measure_with("spin_z", &quiet()).unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].weight(), 0.25);
        assert_eq!(children[0].origin().unwrap().outcome, "up");
        assert!(root.is_measured("spin_z"));
    }

    #[test]
    fn test_second_observable_adds_branch_group() {
        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &quiet()).unwrap();
        let spin_x = root.measure_with("spin_x", &quiet()).unwrap();

        assert_eq!(spin_x.len(), 2);
        assert!(spin_x.iter().all(|c| c.origin().unwrap().observable == "spin_x"));

        let groups: Vec<&str> = root.branches().map(|b| b.observable).collect();
        assert_eq!(groups, vec!["spin_z", "spin_x"]);
        for branch in root.branches() {
            assert_relative_eq!(branch.total_weight(), root.weight(), epsilon = 1e-9);
        }

        let observables: Vec<&str> = root
            .children()
            .iter()
            .map(|c| c.origin().unwrap().observable.as_str())
            .collect();
        assert_eq!(observables, vec!["spin_z", "spin_z", "spin_x", "spin_x"]);

        assert!(root.is_measured("spin_z") && root.is_measured("spin_x"));
        assert!(root.measure_with("spin_x", &quiet()).unwrap_err().is_already_measured());
        assert_eq!(root.stats().branch_count, 2);
    }

    #[test]
    fn test_negligible_outcomes_skipped() {
        let mut root = Universe::root(
            QuantumSystem::new([
                ("a", Complex::new(1.0, 0.0)),
                ("b", Complex::new(1.0, 0.0)),
                ("c", Complex::new(1e-7, 0.0)),
            ])
            .unwrap(),
        );

        let children = root.measure_with("x", &quiet()).unwrap();
        assert_eq!(children.len(), 2);

        let total: f64 = children.iter().map(|c| c.weight()).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_observer_fidelity() {
        let calls: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookRegistry::new();

        for n in 0..3 {
            let calls = calls.clone();
            hooks.register_universe_creation_observer(move |_, outcome| {
                calls.lock().unwrap().push((n, outcome.to_string()));
                Ok(())
            });
        }

        let mut root = Universe::root(QuantumSystem::uniform(["a", "b"]).unwrap());
        root.measure_with("x", &hooks).unwrap();

        let calls = calls.lock().unwrap();
        let expected: Vec<(usize, String)> = vec![
            (0, "a".into()), (1, "a".into()), (2, "a".into()),
            (0, "b".into()), (1, "b".into()), (2, "b".into()),
        ];
        assert_eq!(*calls, expected);
    }

    #[test]
    fn test_post_hook_sees_children() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookRegistry::new();

        let s = seen.clone();
        hooks.register_post_measurement_hook(move |universe, observable| {
            s.lock().unwrap().push((observable.to_string(), universe.children().len()));
            Ok(())
        });

        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &hooks).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![("spin_z".to_string(), 2)]);
    }

    #[test]
    fn test_post_hooks_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookRegistry::new();

        for n in 0..3 {
            let order = order.clone();
            hooks.register_post_measurement_hook(move |_, _| {
                order.lock().unwrap().push(n);
                Ok(())
            });
        }

        let mut root = Universe::root(QuantumSystem::uniform(["a", "b", "c"]).unwrap());
        root.measure_with("x", &hooks).unwrap();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_hook_error_keeps_children() {
        let mut hooks = HookRegistry::new();
        hooks.register_universe_creation_observer(|_, outcome| {
            if outcome == "down" {
                Err(HookError::new("refusing down"))
            } else {
                Ok(())
            }
        });

        let mut root = Universe::root(spin_half());
        let err = root.measure_with("spin_z", &hooks).unwrap_err();

        match err {
            MultiverseError::Hook { observable, message } => {
                assert_eq!(observable, "spin_z");
                assert_eq!(message, "refusing down");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(root.children().len(), 2);
        assert!(root.is_measured("spin_z"));
    }

    #[test]
    fn test_prepare_only_before_branching() {
        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &quiet()).unwrap();

        let child = &mut root.children_mut()[0];
        child.prepare(QuantumSystem::uniform(["positive", "negative"]).unwrap()).unwrap();
        let grandchildren = child.measure_with("charge", &quiet()).unwrap();

        assert_eq!(grandchildren.len(), 2);
        assert_relative_eq!(grandchildren[0].weight(), 0.25, epsilon = 1e-9);
        assert!(grandchildren[0].is_measured("spin_z"));
        assert!(grandchildren[0].is_measured("charge"));

        let err = root.prepare(spin_half()).unwrap_err();
        assert!(matches!(err, MultiverseError::AlreadyBranched(_)));
    }

    #[test]
    fn test_branch_lookup_by_observable() {
        let mut root = Universe::root(spin_half());
        assert!(root.branch_for("spin_z").is_none());

        root.measure_with("spin_z", &quiet()).unwrap();

        let branch = root.branch_for("spin_z").unwrap();
        assert_eq!(branch.children.len(), 2);
        assert!(root.branch_for("charge").is_none());
    }

    #[test]
    fn test_history_is_inherited() {
        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &quiet()).unwrap();

        let child = &root.children()[1];
        assert_eq!(child.history()[0], "Universe created");
        assert!(child.history()[1].starts_with("Measured 'spin_z'"));
        assert!(child.history()[2].contains("as 'down'"));
    }

    #[test]
    fn test_traversal_and_stats() {
        let mut root = Universe::root(spin_half());
        root.measure_with("spin_z", &quiet()).unwrap();
        for leaf in root.leaves_mut() {
            leaf.prepare(QuantumSystem::uniform(["p", "n"]).unwrap()).unwrap();
            leaf.measure_with("charge", &quiet()).unwrap();
        }

        let depths: Vec<usize> = root.iter().map(|u| u.depth()).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1, 2, 2]);

        let stats = root.stats();
        assert_eq!(stats.universe_count, 7);
        assert_eq!(stats.leaf_count, 4);
        assert_eq!(stats.max_depth, 2);
        assert_relative_eq!(stats.total_leaf_weight, 1.0, epsilon = 1e-9);

        let target = root.children()[1].children()[0].id();
        assert_eq!(root.find(target).map(|u| u.id()), Some(target));
    }

    #[test]
    fn test_invalid_root_weight() {
        assert!(matches!(
            Universe::with_weight(spin_half(), 0.0),
            Err(MultiverseError::InvalidWeight(_))
        ));
        assert!(Universe::with_weight(spin_half(), f64::NAN).is_err());
    }

    #[test]
    fn test_short_id_display() {
        let id = UniverseId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    proptest! {
        #[test]
        fn prop_measurement_conserves_weight(
            amps in prop::collection::vec(0.01f64..10.0, 1..6),
            weight in 0.001f64..1.0,
        ) {
            let system = QuantumSystem::new(
                amps.iter()
                    .enumerate()
                    .map(|(i, a)| (format!("o{}", i), Complex::new(*a, 0.0))),
            ).unwrap();
            let mut root = Universe::with_weight(system, weight).unwrap();

            let total: f64 = root
                .measure_with("obs", &HookRegistry::new())
                .unwrap()
                .iter()
                .map(|c| c.weight())
                .sum();

            prop_assert!((total - weight).abs() < 1e-9);
        }
    }
}
