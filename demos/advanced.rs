//! Advanced breaker example
//!
//! This example demonstrates:
//! 1. Creating a custom error type
//! 2. Wiring a custom transition sink for monitoring
//! 3. Using hooks for breaker events
//! 4. Managing several breakers through a registry

use std::error::Error;
use std::fmt;
use std::thread;
use std::time::Duration;
use tripswitch::{
    Breaker, BreakerError, BreakerRegistry, HookRegistry, TransitionRecord, TransitionSink,
};

// Custom error type that implements Error trait
#[derive(Debug)]
struct ServiceError(String);

impl ServiceError {
    fn new(msg: &str) -> Self {
        ServiceError(msg.to_string())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error: {}", self.0)
    }
}

impl Error for ServiceError {}

// A sink that prints every transition record
struct StdoutSink;

impl TransitionSink for StdoutSink {
    fn record_transition(&self, record: &TransitionRecord) {
        println!(
            "[sink] breaker '{}' {} -> {} (failures={}, successes={})",
            record.name, record.from, record.to, record.failure_count, record.success_count
        );
    }
}

// A function that simulates an external service with varying failure patterns
fn external_service_call(call_count: &mut u32) -> Result<String, ServiceError> {
    *call_count += 1;

    if *call_count <= 3 {
        // First 3 calls succeed
        Ok("Initial success".to_string())
    } else if *call_count <= 8 {
        // Next 5 calls fail (should trip the breaker)
        Err(ServiceError::new("Service temporarily unavailable"))
    } else {
        // After that, all calls succeed
        Ok("Service recovered".to_string())
    }
}

fn main() {
    println!("=== Advanced Breaker Example ===\n");

    // 1. Set up hooks for observability
    let hooks = HookRegistry::new();

    hooks.set_on_open(|| println!("[hook] breaker OPENED due to too many failures"));
    hooks.set_on_close(|| println!("[hook] breaker CLOSED after successful recovery"));
    hooks.set_on_half_open(|| println!("[hook] breaker HALF-OPEN, testing recovery"));
    hooks.set_on_success(|| println!("[hook] call succeeded"));
    hooks.set_on_failure(|| println!("[hook] call failed"));

    // 2. Create a breaker with a sink and hooks attached
    let breaker = Breaker::builder("inventory-api")
        .failure_threshold(3) // trip after 3 consecutive failures
        .success_threshold(2) // close after 2 consecutive probe successes
        .reset_timeout(Duration::from_secs(2))
        .sink(StdoutSink)
        .hooks(hooks)
        .build();

    // 3. Keep breakers for all dependencies in one registry
    let registry = BreakerRegistry::new();
    registry.register(breaker.clone());
    registry.register(
        Breaker::builder("billing-api")
            .failure_threshold(5)
            .success_threshold(1)
            .reset_timeout(Duration::from_secs(10))
            .build(),
    );

    println!("Initial state: {:?}\n", breaker.current_state());

    // 4. Simulate a series of calls to demonstrate the breaker behavior
    let mut call_count = 0;

    for i in 1..=15 {
        println!("\n--- Call {} ---", i);

        let result = breaker.call(|| external_service_call(&mut call_count));

        match result {
            Ok(response) => println!("Service response: {}", response),
            Err(BreakerError::Open(info)) => println!("Call not attempted: {}", info),
            Err(BreakerError::Operation(err)) => println!("Service error: {}", err),
        }

        let snapshot = breaker.snapshot();
        println!(
            "Breaker metrics: state={:?}, failures={}, successes={}",
            snapshot.state, snapshot.failure_count, snapshot.success_count
        );

        // Delay between calls so the reset timeout can elapse mid-run
        thread::sleep(Duration::from_millis(500));
    }

    // 5. Monitoring view across every registered breaker
    println!("\n=== Registry snapshot ===");
    for (name, snapshot) in registry.snapshot_all() {
        println!("{}: {:?}", name, snapshot);
    }

    println!("\n=== Example Completed ===");
}
