//! A named collection of breakers for applications that protect several
//! dependencies.
//!
//! The registry is an explicitly constructed value, not a process-global;
//! create one per application (or per test) and pass it where it is needed.

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::breaker::Breaker;
use crate::sink::BreakerSnapshot;

/// Holds one breaker per protected dependency, keyed by breaker name.
#[derive(Default)]
pub struct BreakerRegistry {
    breakers: RwLock<HashMap<String, Breaker, RandomState>>,
}

impl BreakerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a breaker under its own name.
    ///
    /// Returns the previously registered breaker with the same name, if any.
    pub fn register(&self, breaker: Breaker) -> Option<Breaker> {
        let name = breaker.name().to_owned();
        self.breakers.write().insert(name, breaker)
    }

    /// Gets a handle to a registered breaker. The handle shares state with
    /// every other clone of the same breaker.
    pub fn get(&self, name: &str) -> Option<Breaker> {
        self.breakers.read().get(name).cloned()
    }

    /// Removes a breaker from the registry.
    pub fn remove(&self, name: &str) -> Option<Breaker> {
        self.breakers.write().remove(name)
    }

    /// Number of registered breakers.
    pub fn len(&self) -> usize {
        self.breakers.read().len()
    }

    /// Whether the registry holds no breakers.
    pub fn is_empty(&self) -> bool {
        self.breakers.read().is_empty()
    }

    /// Snapshots every registered breaker, for monitoring endpoints.
    pub fn snapshot_all(&self) -> Vec<(String, BreakerSnapshot)> {
        let breakers = self.breakers.read();
        let mut snapshots: Vec<_> = breakers
            .iter()
            .map(|(name, breaker)| (name.clone(), breaker.snapshot()))
            .collect();
        snapshots.sort_by(|a, b| a.0.cmp(&b.0));
        snapshots
    }
}
