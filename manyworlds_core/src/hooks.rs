//! Creation observers and post-measurement hooks.
//!
//! Hooks are plain closures kept in registration order. A [`HookRegistry`]
//! can be passed explicitly to [`Universe::measure_with`], or callers can use
//! the process-wide registry through the free functions in this module.
//!
//! # Threading
//!
//! The process-wide registry sits behind a `Mutex` for memory safety only.
//! Registration and measurement are assumed to come from a single writer;
//! callers that share it across threads must serialize access themselves.
//!
//! [`Universe::measure_with`]: crate::Universe::measure_with

use crate::error::HookError;
use crate::universe::Universe;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Called once per newly created child with `(child, outcome)`.
pub type CreationObserver = Arc<dyn Fn(&Universe, &str) -> Result<(), HookError> + Send + Sync>;

/// Called once per measurement with `(measured universe, observable)`.
pub type PostMeasurementHook = Arc<dyn Fn(&Universe, &str) -> Result<(), HookError> + Send + Sync>;

/// Ordered lists of measurement callbacks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    creation_observers: Vec<CreationObserver>,
    post_measurement_hooks: Vec<PostMeasurementHook>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a creation observer.
    pub fn register_universe_creation_observer<F>(&mut self, observer: F)
    where
        F: Fn(&Universe, &str) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.creation_observers.push(Arc::new(observer));
    }

    /// Appends a post-measurement hook.
    pub fn register_post_measurement_hook<F>(&mut self, hook: F)
    where
        F: Fn(&Universe, &str) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.post_measurement_hooks.push(Arc::new(hook));
    }

    /// Drops every registered callback.
    pub fn clear(&mut self) {
        self.creation_observers.clear();
        self.post_measurement_hooks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.creation_observers.is_empty() && self.post_measurement_hooks.is_empty()
    }

    pub fn observer_count(&self) -> usize {
        self.creation_observers.len()
    }

    pub fn hook_count(&self) -> usize {
        self.post_measurement_hooks.len()
    }

    /// Runs every creation observer for one child. Stops at the first error.
    pub(crate) fn notify_created(&self, child: &Universe, outcome: &str) -> Result<(), HookError> {
        for observer in &self.creation_observers {
            observer(child, outcome)?;
        }
        debug!(
            "  notified {} observer(s) of universe {}",
            self.creation_observers.len(),
            child.id()
        );
        Ok(())
    }

    /// Runs every post-measurement hook. Stops at the first error.
    pub(crate) fn notify_measured(&self, universe: &Universe, observable: &str) -> Result<(), HookError> {
        for hook in &self.post_measurement_hooks {
            hook(universe, observable)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("creation_observers", &self.creation_observers.len())
            .field("post_measurement_hooks", &self.post_measurement_hooks.len())
            .finish()
    }
}

// ============================================================================
// PROCESS-WIDE REGISTRY
// ============================================================================

static GLOBAL_HOOKS: Mutex<HookRegistry> = Mutex::new(HookRegistry {
    creation_observers: Vec::new(),
    post_measurement_hooks: Vec::new(),
});

fn global() -> MutexGuard<'static, HookRegistry> {
    // A panicking hook cannot leave the lists half-written, so recover.
    GLOBAL_HOOKS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registers a creation observer with the process-wide registry.
pub fn register_universe_creation_observer<F>(observer: F)
where
    F: Fn(&Universe, &str) -> Result<(), HookError> + Send + Sync + 'static,
{
    global().register_universe_creation_observer(observer);
}

/// Registers a post-measurement hook with the process-wide registry.
pub fn register_post_measurement_hook<F>(hook: F)
where
    F: Fn(&Universe, &str) -> Result<(), HookError> + Send + Sync + 'static,
{
    global().register_post_measurement_hook(hook);
}

/// Resets the process-wide registry. Tests call this between cases.
pub fn clear_hooks() {
    global().clear();
}

/// Copy of the process-wide registry.
///
/// Measurement runs callbacks from this copy so the lock is not held while
/// user code executes.
pub fn snapshot() -> HookRegistry {
    global().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::QuantumSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_registry_counts_and_clear() {
        let mut hooks = HookRegistry::new();
        assert!(hooks.is_empty());

        hooks.register_universe_creation_observer(|_, _| Ok(()));
        hooks.register_universe_creation_observer(|_, _| Ok(()));
        hooks.register_post_measurement_hook(|_, _| Ok(()));

        assert_eq!(hooks.observer_count(), 2);
        assert_eq!(hooks.hook_count(), 1);

        hooks.clear();
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_notify_stops_at_first_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut hooks = HookRegistry::new();

        let c = calls.clone();
        hooks.register_post_measurement_hook(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Err(HookError::new("boom"))
        });
        let c = calls.clone();
        hooks.register_post_measurement_hook(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let universe = Universe::root(QuantumSystem::definite("up"));
        let err = hooks.notify_measured(&universe, "spin_z").unwrap_err();

        assert_eq!(err, HookError::new("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut copy = HookRegistry::new();
        copy.register_post_measurement_hook(|_, _| Ok(()));

        let cloned = copy.clone();
        copy.clear();

        assert_eq!(cloned.hook_count(), 1);
        assert!(copy.is_empty());
    }
}
