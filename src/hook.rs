//! Hook registry for breaker events.

use crate::state::State;
use parking_lot::RwLock;
use std::sync::Arc;

type HookFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// A registry of optional callbacks fired on breaker events.
///
/// Hooks run synchronously on the caller's thread, outside any lock held by
/// the breaker. Keep them cheap.
pub struct HookRegistry {
    on_open: RwLock<Option<HookFn>>,
    on_close: RwLock<Option<HookFn>>,
    on_half_open: RwLock<Option<HookFn>>,
    on_success: RwLock<Option<HookFn>>,
    on_failure: RwLock<Option<HookFn>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            on_open: RwLock::new(None),
            on_close: RwLock::new(None),
            on_half_open: RwLock::new(None),
            on_success: RwLock::new(None),
            on_failure: RwLock::new(None),
        }
    }

    /// Sets the hook to call when the breaker opens.
    pub fn set_on_open<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_open.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when the breaker closes.
    pub fn set_on_close<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_close.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when the breaker half-opens.
    pub fn set_on_half_open<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_half_open.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when a guarded call succeeds.
    pub fn set_on_success<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_success.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when a guarded call fails.
    pub fn set_on_failure<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_failure.write() = Some(Arc::new(f));
    }

    /// Executes the hook matching a state transition's target.
    pub(crate) fn execute_state_transition_hook(&self, to: State) {
        let hook = match to {
            State::Open => self.on_open.read().clone(),
            State::Closed => self.on_close.read().clone(),
            State::HalfOpen => self.on_half_open.read().clone(),
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Executes the success hook.
    pub(crate) fn execute_success_hook(&self) {
        let hook = self.on_success.read().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Executes the failure hook.
    pub(crate) fn execute_failure_hook(&self) {
        let hook = self.on_failure.read().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}
