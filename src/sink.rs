//! Diagnostics surface: transition records, sinks, and the snapshot type.
//!
//! On every state transition the breaker emits a [`TransitionRecord`] to the
//! configured [`TransitionSink`]. The sink is a notification channel only;
//! the breaker never depends on it for correctness.

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::state::State;

/// Structured record of a single state transition.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    /// Label of the breaker that transitioned.
    pub name: Arc<str>,

    /// State before the transition.
    pub from: State,

    /// State after the transition.
    pub to: State,

    /// Consecutive-failure counter after the transition was applied.
    pub failure_count: u32,

    /// Consecutive-success counter after the transition was applied.
    pub success_count: u32,

    /// Wall-clock time the transition was observed.
    pub timestamp: SystemTime,
}

/// Trait for sinks that receive breaker transition events.
pub trait TransitionSink: Send + Sync + 'static {
    /// Records a state transition event.
    fn record_transition(&self, record: &TransitionRecord);
}

impl<T: TransitionSink + ?Sized> TransitionSink for Arc<T> {
    fn record_transition(&self, record: &TransitionRecord) {
        (**self).record_transition(record);
    }
}

/// A null sink that discards all events. The builder default.
pub struct NullSink;

impl TransitionSink for NullSink {
    fn record_transition(&self, _record: &TransitionRecord) {}
}

/// A sink that emits transitions as structured `tracing` events.
///
/// Trips are logged at warn level, recovery steps at info.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub struct LogSink;

#[cfg(feature = "tracing")]
impl TransitionSink for LogSink {
    fn record_transition(&self, record: &TransitionRecord) {
        match record.to {
            State::Open => tracing::warn!(
                breaker = %record.name,
                from = record.from.as_str(),
                to = record.to.as_str(),
                failure_count = record.failure_count,
                "breaker opened"
            ),
            State::HalfOpen => tracing::info!(
                breaker = %record.name,
                from = record.from.as_str(),
                to = record.to.as_str(),
                "breaker half-open, probing recovery"
            ),
            State::Closed => tracing::info!(
                breaker = %record.name,
                from = record.from.as_str(),
                to = record.to.as_str(),
                "breaker closed"
            ),
        }
    }
}

/// Read-only diagnostic copy of a breaker's state and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    /// Current state.
    pub state: State,

    /// Consecutive-failure counter (meaningful while closed).
    pub failure_count: u32,

    /// Consecutive-success counter (meaningful while half-open).
    pub success_count: u32,
}

/// Bounded in-memory ring of the most recent transition records.
///
/// Kept by every breaker so tests and monitoring endpoints can inspect
/// recent history without wiring up a sink.
pub(crate) struct TransitionLog {
    records: Mutex<SmallVec<[TransitionRecord; 8]>>,
    capacity: usize,
}

impl TransitionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(SmallVec::new()),
            capacity,
        }
    }

    pub fn push(&self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }

        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.remove(0);
        }
        records.push(record);
    }

    pub fn recent(&self) -> Vec<TransitionRecord> {
        self.records.lock().to_vec()
    }
}
