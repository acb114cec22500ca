//! # tripswitch
//!
//! A lock-efficient, observability-ready circuit breaker for shielding
//! callers from degrading or failing downstream dependencies.
//!
//! ## What is a circuit breaker?
//!
//! The circuit breaker pattern prevents cascading failures by temporarily
//! refusing calls that are likely to fail. A breaker moves between three
//! states:
//!
//! - **Closed**: normal operation. Calls pass through; consecutive failures
//!   are counted.
//! - **Open**: calls are rejected immediately without contacting the
//!   dependency.
//! - **Half-open**: after a reset timeout, probe calls are admitted to check
//!   whether the dependency has recovered.
//!
//! The open -> half-open check is pull-based: it happens inside the
//! admission query the next time a caller wants to issue a call, so the
//! breaker holds no timers, threads, or sockets.
//!
//! ## Basic usage
//!
//! ```rust
//! use std::time::Duration;
//! use tripswitch::{Breaker, BreakerError};
//!
//! #[derive(Debug)]
//! struct ServiceError(String);
//!
//! impl std::fmt::Display for ServiceError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "service error: {}", self.0)
//!     }
//! }
//!
//! impl std::error::Error for ServiceError {}
//!
//! // One breaker per protected dependency.
//! let breaker = Breaker::builder("billing-api")
//!     .failure_threshold(5)       // trip after 5 consecutive failures
//!     .success_threshold(2)       // close after 2 consecutive probe successes
//!     .reset_timeout(Duration::from_secs(30))
//!     .build();
//!
//! match breaker.call(|| -> Result<String, ServiceError> { Ok("ok".into()) }) {
//!     Ok(body) => println!("call succeeded: {}", body),
//!     Err(BreakerError::Open(info)) => println!("rejected: {}", info),
//!     Err(BreakerError::Operation(err)) => println!("call failed: {}", err),
//! }
//! ```
//!
//! ## Async support
//!
//! With the `async` feature enabled the guard also accepts futures:
//!
//! ```rust,ignore
//! let result = breaker.call_async(|| async {
//!     client.get("https://example.com/health").send().await
//! }).await;
//! ```
//!
//! ## Features
//!
//! - `std` - standard library support (default)
//! - `async` - the `call_async` execution guard; pure `std::future`, works
//!   on any runtime
//! - `tracing` - `LogSink` emitting transitions as structured events

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod breaker;
mod config;
mod error;
mod hook;
pub mod prelude;
mod registry;
mod sink;
mod state;

// Re-exports
pub use breaker::Breaker;
pub use config::BreakerBuilder;
pub use error::{BreakerError, BreakerResult, OpenError};
pub use hook::HookRegistry;
pub use registry::BreakerRegistry;
pub use sink::{BreakerSnapshot, NullSink, TransitionRecord, TransitionSink};
pub use state::State;

#[cfg(feature = "tracing")]
pub use sink::LogSink;
