//! Breaker state machine primitives.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Represents the possible states of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Calls are allowed; consecutive failures are counted toward tripping.
    Closed = 0,

    /// Calls are rejected until the reset timeout has elapsed.
    Open = 1,

    /// Probe calls are allowed to test whether the dependency has recovered.
    HalfOpen = 2,
}

impl State {
    /// Short lowercase label used in transition records and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::Open => "open",
            State::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<u8> for State {
    fn from(value: u8) -> Self {
        match value {
            1 => State::Open,
            2 => State::HalfOpen,
            _ => State::Closed,
        }
    }
}

/// Atomic holder for the breaker state plus the instant it was entered.
///
/// All transitions go through a compare-and-swap on the state word, so two
/// racing callers can never both apply the same transition.
pub(crate) struct StateManager {
    state: AtomicU8,
    entered_at: parking_lot::Mutex<Instant>,
}

impl StateManager {
    /// Creates a new state manager in the closed state.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(State::Closed as u8),
            entered_at: parking_lot::Mutex::new(Instant::now()),
        }
    }

    /// Gets the current state.
    pub fn current(&self) -> State {
        State::from(self.state.load(Ordering::Acquire))
    }

    /// Instant at which the current state was entered.
    ///
    /// While the breaker is open this is the `opened_at` stamp the reset
    /// timeout is measured from.
    pub fn entered_at(&self) -> Instant {
        *self.entered_at.lock()
    }

    /// Duration spent in the current state.
    pub fn time_in_state(&self) -> Duration {
        self.entered_at().elapsed()
    }

    /// Attempts to transition from one state to another.
    /// Returns true if this caller won the transition.
    pub fn transition_from_to(&self, from: State, to: State) -> bool {
        let result = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if result {
            *self.entered_at.lock() = Instant::now();
        }

        result
    }

    /// Attempts the closed -> open trip.
    pub fn trip_open(&self) -> bool {
        self.transition_from_to(State::Closed, State::Open)
    }

    /// Attempts the open -> half-open transition after the reset timeout.
    pub fn attempt_half_open(&self) -> bool {
        self.transition_from_to(State::Open, State::HalfOpen)
    }

    /// Attempts the half-open -> closed transition after enough successes.
    pub fn reset_closed(&self) -> bool {
        self.transition_from_to(State::HalfOpen, State::Closed)
    }

    /// Reverts from half-open to open after a failed probe.
    pub fn revert_to_open(&self) -> bool {
        self.transition_from_to(State::HalfOpen, State::Open)
    }

    /// Unconditionally sets the state, restamping the entry instant.
    ///
    /// Only the administrative override path uses this; normal transitions
    /// go through the CAS methods above.
    pub fn force(&self, to: State) -> State {
        let previous = self.state.swap(to as u8, Ordering::AcqRel);
        *self.entered_at.lock() = Instant::now();
        State::from(previous)
    }
}
