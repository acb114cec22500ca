//! Core breaker implementation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::error::{BreakerError, BreakerResult, OpenError};
use crate::hook::HookRegistry;
use crate::sink::{BreakerSnapshot, TransitionLog, TransitionRecord, TransitionSink};
use crate::state::{State, StateManager};

/// Inner state of the breaker, shared between clones.
struct BreakerInner {
    name: Arc<str>,
    state_manager: StateManager,
    failure_threshold: u32,
    success_threshold: u32,
    reset_timeout: Duration,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    sink: Arc<dyn TransitionSink>,
    hooks: Arc<HookRegistry>,
    log: TransitionLog,
}

/// A call-protection state machine guarding one downstream dependency.
///
/// The breaker counts consecutive failures while closed and trips open at
/// `failure_threshold`. While open it rejects calls until `reset_timeout`
/// has elapsed, then admits probes in the half-open state; the threshold
/// check is pull-based, evaluated inside [`is_call_blocked`] rather than by
/// a background timer. `success_threshold` consecutive probe successes close
/// it again; a single probe failure reopens it.
///
/// The breaker itself never invokes the protected operation. Use [`call`]
/// (or `call_async` with the `async` feature) as the execution guard, or
/// drive [`is_call_blocked`] / [`record_success`] / [`record_failure`]
/// directly when the call site does not fit the closure shape.
///
/// [`is_call_blocked`]: Breaker::is_call_blocked
/// [`call`]: Breaker::call
/// [`record_success`]: Breaker::record_success
/// [`record_failure`]: Breaker::record_failure
pub struct Breaker {
    inner: Arc<BreakerInner>,
}

impl Breaker {
    /// Creates a breaker with the given name and thresholds, a null sink,
    /// and no hooks.
    ///
    /// # Panics
    ///
    /// Panics if either threshold is zero or the name is empty. Use
    /// [`builder`](Breaker::builder) to customize the sink or hooks.
    pub fn new(
        name: impl Into<String>,
        failure_threshold: u32,
        success_threshold: u32,
        reset_timeout: Duration,
    ) -> Self {
        crate::config::BreakerBuilder::new(name)
            .failure_threshold(failure_threshold)
            .success_threshold(success_threshold)
            .reset_timeout(reset_timeout)
            .build()
    }

    /// Creates a new builder for customizing a breaker.
    pub fn builder(name: impl Into<String>) -> crate::config::BreakerBuilder {
        crate::config::BreakerBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: Arc<str>,
        failure_threshold: u32,
        success_threshold: u32,
        reset_timeout: Duration,
        sink: Arc<dyn TransitionSink>,
        hooks: Arc<HookRegistry>,
        log_capacity: usize,
    ) -> Self {
        let inner = BreakerInner {
            name,
            state_manager: StateManager::new(),
            failure_threshold,
            success_threshold,
            reset_timeout,
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            sink,
            hooks,
            log: TransitionLog::new(log_capacity),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// The diagnostic label this breaker was built with.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Gets the current state. Pure read, no transitions.
    pub fn current_state(&self) -> State {
        self.inner.state_manager.current()
    }

    /// The single authority on whether a call may proceed right now.
    ///
    /// Returns `true` when the breaker is open and the reset timeout has not
    /// elapsed: the caller must not contact the dependency. Returns `false`
    /// in every other case, including open at/after the timeout, where
    /// answering also performs the open -> half-open transition. That check
    /// is the only side effect; there is no background timer.
    pub fn is_call_blocked(&self) -> bool {
        match self.inner.state_manager.current() {
            State::Closed | State::HalfOpen => false,
            State::Open => {
                if self.inner.state_manager.time_in_state() >= self.inner.reset_timeout {
                    if self.inner.state_manager.attempt_half_open() {
                        self.inner.success_count.store(0, Ordering::Release);
                        self.emit_transition(State::Open, State::HalfOpen);
                        return false;
                    }
                    // Lost the race; answer from whatever state won.
                    return self.inner.state_manager.current() == State::Open;
                }

                true
            }
        }
    }

    /// Records a successful call outcome.
    ///
    /// Closed: clears the consecutive-failure streak. Half-open: counts
    /// toward `success_threshold` and closes the breaker when reached.
    /// Open: ignored. Never panics.
    pub fn record_success(&self) {
        self.inner.hooks.execute_success_hook();

        match self.inner.state_manager.current() {
            State::Closed => {
                self.inner.failure_count.store(0, Ordering::Release);
            }
            State::HalfOpen => {
                let successes = self.inner.success_count.fetch_add(1, Ordering::AcqRel) + 1;
                if successes >= self.inner.success_threshold
                    && self.inner.state_manager.reset_closed()
                {
                    self.inner.success_count.store(0, Ordering::Release);
                    self.inner.failure_count.store(0, Ordering::Release);
                    self.emit_transition(State::HalfOpen, State::Closed);
                }
            }
            State::Open => {}
        }
    }

    /// Records a failed call outcome.
    ///
    /// Closed: counts toward `failure_threshold` and trips the breaker when
    /// reached. Half-open: reopens immediately with a fresh `opened_at`
    /// stamp. Open: ignored. Never panics.
    pub fn record_failure(&self) {
        self.inner.hooks.execute_failure_hook();

        match self.inner.state_manager.current() {
            State::Closed => {
                let failures = self.inner.failure_count.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.inner.failure_threshold && self.inner.state_manager.trip_open()
                {
                    self.inner.failure_count.store(0, Ordering::Release);
                    self.emit_transition(State::Closed, State::Open);
                }
            }
            State::HalfOpen => {
                if self.inner.state_manager.revert_to_open() {
                    self.inner.success_count.store(0, Ordering::Release);
                    self.emit_transition(State::HalfOpen, State::Open);
                }
            }
            State::Open => {}
        }
    }

    /// Administrative override: sets the state directly.
    ///
    /// Both counters are zeroed and the transition is emitted to the sink,
    /// but the jump is otherwise unvalidated. This is an escape hatch for
    /// operators and tests, not part of the normal transition table.
    pub fn force_state(&self, to: State) {
        let from = self.inner.state_manager.force(to);
        self.inner.failure_count.store(0, Ordering::Release);
        self.inner.success_count.store(0, Ordering::Release);

        if from != to {
            self.emit_transition(from, to);
        }
    }

    /// Read-only diagnostic copy of state and counters.
    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: self.inner.state_manager.current(),
            failure_count: self.inner.failure_count.load(Ordering::Acquire),
            success_count: self.inner.success_count.load(Ordering::Acquire),
        }
    }

    /// The most recent transition records, oldest first.
    pub fn recent_transitions(&self) -> Vec<TransitionRecord> {
        self.inner.log.recent()
    }

    /// Executes an operation under the breaker's protection.
    ///
    /// If the breaker is open the operation is never invoked and the call
    /// fails with [`BreakerError::Open`]. Otherwise the operation runs, its
    /// outcome is recorded, and on failure the original error is returned
    /// inside [`BreakerError::Operation`] without being altered.
    pub fn call<F, T, E>(&self, f: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.is_call_blocked() {
            return Err(BreakerError::Open(self.open_error()));
        }

        match f() {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(BreakerError::Operation(e))
            }
        }
    }

    fn open_error(&self) -> OpenError {
        OpenError {
            name: Arc::clone(&self.inner.name),
            failure_count: self.inner.failure_count.load(Ordering::Acquire),
            opened_at: self.inner.state_manager.entered_at(),
        }
    }

    fn emit_transition(&self, from: State, to: State) {
        let record = TransitionRecord {
            name: Arc::clone(&self.inner.name),
            from,
            to,
            failure_count: self.inner.failure_count.load(Ordering::Acquire),
            success_count: self.inner.success_count.load(Ordering::Acquire),
            timestamp: SystemTime::now(),
        };

        self.inner.log.push(record.clone());
        self.inner.sink.record_transition(&record);
        self.inner.hooks.execute_state_transition_hook(to);
    }
}

// Clones share the same inner state; one breaker per dependency, handed
// around freely.
impl Clone for Breaker {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Breaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Breaker")
            .field("name", &self.name())
            .field("state", &snapshot.state)
            .field("failure_count", &snapshot.failure_count)
            .field("success_count", &snapshot.success_count)
            .finish()
    }
}

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
impl Breaker {
    /// Executes an async operation under the breaker's protection.
    ///
    /// Admission is decided before the future is constructed; the breaker
    /// only needs the eventual outcome, so the operation may suspend freely.
    pub async fn call_async<F, Fut, T, E>(&self, f: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if self.is_call_blocked() {
            return Err(BreakerError::Open(self.open_error()));
        }

        match f().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(BreakerError::Operation(e))
            }
        }
    }
}
