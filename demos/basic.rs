use std::error::Error;
use std::fmt;
use std::thread;
use std::time::Duration;
use tripswitch::{Breaker, BreakerError};

// Custom error type that implements Error trait
#[derive(Debug)]
struct ServiceError(String);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error: {}", self.0)
    }
}

impl Error for ServiceError {}

fn main() {
    // One breaker per protected dependency
    let breaker = Breaker::builder("flaky-service")
        .failure_threshold(3) // trip after 3 consecutive failures
        .success_threshold(1) // one successful probe closes the breaker
        .reset_timeout(Duration::from_secs(2))
        .build();

    println!("Breaker initial state: {:?}", breaker.current_state());

    let mut call_counter = 0u32;

    // Simulated downstream: fails for a stretch, then recovers
    let call_service = |counter: &mut u32| -> Result<String, ServiceError> {
        *counter += 1;
        if (3..=8).contains(counter) {
            Err(ServiceError("External service error".to_string()))
        } else {
            Ok("Success".to_string())
        }
    };

    for i in 1..=15 {
        println!("\nAttempt {}: ", i);

        match breaker.call(|| call_service(&mut call_counter)) {
            Ok(result) => println!("Call succeeded with result: {}", result),
            Err(BreakerError::Open(info)) => {
                println!("Breaker is open ({}), waiting before retry...", info);
                thread::sleep(Duration::from_millis(500));
            }
            Err(BreakerError::Operation(err)) => {
                println!("Call failed with error: {}", err);
            }
        }

        let snapshot = breaker.snapshot();
        println!(
            "Current state: {:?}, failures: {}, successes: {}",
            snapshot.state, snapshot.failure_count, snapshot.success_count
        );

        // Small delay between calls
        thread::sleep(Duration::from_millis(300));
    }
}
