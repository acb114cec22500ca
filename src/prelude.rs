//! Re-exports of the types most call sites need.
//!
//! # Example
//! ```rust,no_run
//! use tripswitch::prelude::*;
//! ```

pub use crate::breaker::Breaker;
pub use crate::config::BreakerBuilder;
pub use crate::error::{BreakerError, BreakerResult};
pub use crate::state::State;
