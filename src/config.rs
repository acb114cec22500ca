//! Configuration for breakers.

use std::sync::Arc;
use std::time::Duration;

use crate::breaker::Breaker;
use crate::hook::HookRegistry;
use crate::sink::{NullSink, TransitionSink};

/// Default capacity of the per-breaker transition history ring.
const DEFAULT_LOG_CAPACITY: usize = 32;

/// Builder for creating breakers.
///
/// The name and all three thresholds are required; there are no implicit
/// defaults that change tripping behavior. Sink, hooks, and history depth
/// are optional.
pub struct BreakerBuilder {
    name: String,
    failure_threshold: Option<u32>,
    success_threshold: Option<u32>,
    reset_timeout: Option<Duration>,
    sink: Arc<dyn TransitionSink>,
    hooks: Arc<HookRegistry>,
    log_capacity: usize,
}

impl BreakerBuilder {
    /// Creates a new builder for a breaker with the given diagnostic name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_threshold: None,
            success_threshold: None,
            reset_timeout: None,
            sink: Arc::new(NullSink),
            hooks: Arc::new(HookRegistry::new()),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Sets the number of consecutive failures, observed while closed,
    /// required to trip the breaker open. Must be positive.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = Some(threshold);
        self
    }

    /// Sets the number of consecutive successes, observed while half-open,
    /// required to close the breaker. Must be positive.
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = Some(threshold);
        self
    }

    /// Sets the minimum time the breaker stays open before a probe is
    /// admitted.
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = Some(timeout);
        self
    }

    /// Sets the sink that receives transition records.
    pub fn sink<S: TransitionSink>(mut self, sink: S) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Sets the hook registry for breaker events.
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Sets how many recent transition records the breaker retains.
    /// A capacity of zero disables the history.
    pub fn transition_history(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Builds the breaker.
    ///
    /// # Panics
    ///
    /// Panics if any threshold is unset, if either count threshold is zero,
    /// or if the name is empty. These are configuration bugs, not runtime
    /// conditions.
    pub fn build(self) -> Breaker {
        assert!(!self.name.is_empty(), "breaker name must not be empty");

        let failure_threshold = self
            .failure_threshold
            .expect("failure_threshold is required");
        let success_threshold = self
            .success_threshold
            .expect("success_threshold is required");
        let reset_timeout = self.reset_timeout.expect("reset_timeout is required");

        assert!(failure_threshold > 0, "failure_threshold must be positive");
        assert!(success_threshold > 0, "success_threshold must be positive");

        Breaker::from_parts(
            Arc::from(self.name),
            failure_threshold,
            success_threshold,
            reset_timeout,
            self.sink,
            self.hooks,
            self.log_capacity,
        )
    }
}
