use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use tripswitch::{
    Breaker, BreakerError, HookRegistry, State, TransitionRecord, TransitionSink,
};

// Custom error type that implements Error trait
#[derive(Debug, PartialEq)]
struct TestError(String);

impl TestError {
    fn new(msg: &str) -> Self {
        TestError(msg.to_string())
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test error: {}", self.0)
    }
}

impl Error for TestError {}

/// Sink that collects every transition for assertions.
struct CollectingSink(Mutex<Vec<(State, State)>>);

impl CollectingSink {
    fn new() -> Arc<Self> {
        Arc::new(CollectingSink(Mutex::new(Vec::new())))
    }

    fn transitions(&self) -> Vec<(State, State)> {
        self.0.lock().unwrap().clone()
    }
}

impl TransitionSink for CollectingSink {
    fn record_transition(&self, record: &TransitionRecord) {
        self.0.lock().unwrap().push((record.from, record.to));
    }
}

fn breaker(failures: u32, successes: u32, timeout: Duration) -> Breaker {
    Breaker::builder("test")
        .failure_threshold(failures)
        .success_threshold(successes)
        .reset_timeout(timeout)
        .build()
}

#[test]
fn trips_after_exactly_threshold_consecutive_failures() {
    let breaker = breaker(3, 1, Duration::from_secs(30));

    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Closed);
    assert_eq!(breaker.snapshot().failure_count, 2);

    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Open);
    assert_eq!(breaker.snapshot().failure_count, 0);
}

#[test]
fn success_while_closed_clears_the_failure_streak() {
    let breaker = breaker(2, 1, Duration::from_secs(30));

    // failure, success, failure, failure: only the last two are consecutive
    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Closed);

    breaker.record_success();
    assert_eq!(breaker.snapshot().failure_count, 0);

    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Closed);

    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Open);
}

#[test]
fn open_breaker_blocks_until_timeout_then_half_opens_on_query() {
    let breaker = breaker(1, 1, Duration::from_millis(100));

    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Open);

    // Before the timeout every query reports blocked and no transition runs.
    assert!(breaker.is_call_blocked());
    assert!(breaker.is_call_blocked());
    assert_eq!(breaker.current_state(), State::Open);

    thread::sleep(Duration::from_millis(150));

    // No timer fired; the state only moves when the next query observes it.
    assert_eq!(breaker.current_state(), State::Open);
    assert!(!breaker.is_call_blocked());
    assert_eq!(breaker.current_state(), State::HalfOpen);
}

#[test]
fn guard_never_invokes_the_operation_while_blocked() {
    let breaker = breaker(1, 1, Duration::from_secs(30));
    breaker.record_failure();

    let invoked = AtomicU32::new(0);
    let result = breaker.call(|| -> Result<(), TestError> {
        invoked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    assert!(matches!(result, Err(BreakerError::Open(_))));
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[test]
fn open_error_carries_breaker_diagnostics() {
    let breaker = Breaker::builder("billing")
        .failure_threshold(1)
        .success_threshold(1)
        .reset_timeout(Duration::from_secs(30))
        .build();
    breaker.record_failure();

    let err = breaker
        .call(|| -> Result<(), TestError> { Ok(()) })
        .unwrap_err();
    match err {
        BreakerError::Open(info) => {
            assert_eq!(&*info.name, "billing");
            assert_eq!(info.failure_count, 0);
            assert!(info.opened_at.elapsed() < Duration::from_secs(1));
        }
        other => panic!("expected open rejection, got {:?}", other),
    }
}

#[test]
fn half_open_closes_after_consecutive_successes() {
    let breaker = breaker(1, 2, Duration::from_millis(50));

    breaker.record_failure();
    thread::sleep(Duration::from_millis(80));
    assert!(!breaker.is_call_blocked());
    assert_eq!(breaker.current_state(), State::HalfOpen);

    breaker.record_success();
    assert_eq!(breaker.current_state(), State::HalfOpen);
    assert_eq!(breaker.snapshot().success_count, 1);

    breaker.record_success();
    assert_eq!(breaker.current_state(), State::Closed);

    let snapshot = breaker.snapshot();
    assert_eq!(snapshot.failure_count, 0);
    assert_eq!(snapshot.success_count, 0);
}

#[test]
fn half_open_failure_reopens_with_fresh_opened_at() {
    let breaker = breaker(1, 1, Duration::from_millis(50));

    breaker.record_failure();
    thread::sleep(Duration::from_millis(80));
    assert!(!breaker.is_call_blocked());
    assert_eq!(breaker.current_state(), State::HalfOpen);

    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Open);
    assert_eq!(breaker.snapshot().success_count, 0);

    // The dwell clock restarted at the probe failure, so the breaker is
    // blocked again even though the first timeout already elapsed.
    assert!(breaker.is_call_blocked());
}

#[test]
fn full_trip_probe_close_cycle_via_the_guard() {
    // failure_threshold=2, success_threshold=1, reset_timeout=500ms
    let breaker = breaker(2, 1, Duration::from_millis(500));

    let fail = || -> Result<&str, TestError> { Err(TestError::new("down")) };
    let succeed = || -> Result<&str, TestError> { Ok("up") };

    assert!(breaker.call(fail).is_err());
    assert_eq!(breaker.current_state(), State::Closed);
    assert_eq!(breaker.snapshot().failure_count, 1);

    assert!(breaker.call(fail).is_err());
    assert_eq!(breaker.current_state(), State::Open);

    // t+100ms: still blocked.
    thread::sleep(Duration::from_millis(100));
    assert!(matches!(
        breaker.call(succeed),
        Err(BreakerError::Open(_))
    ));
    assert_eq!(breaker.current_state(), State::Open);

    // t+600ms: the query admits a probe and it closes the breaker.
    thread::sleep(Duration::from_millis(500));
    assert_eq!(breaker.call(succeed).unwrap(), "up");
    assert_eq!(breaker.current_state(), State::Closed);

    let snapshot = breaker.snapshot();
    assert_eq!(snapshot.failure_count, 0);
    assert_eq!(snapshot.success_count, 0);
}

#[test]
fn guard_passes_operation_errors_through_unchanged() {
    let breaker = breaker(5, 1, Duration::from_secs(30));

    let result = breaker.call(|| -> Result<(), TestError> { Err(TestError::new("boom")) });
    match result {
        Err(BreakerError::Operation(e)) => assert_eq!(e, TestError::new("boom")),
        other => panic!("expected operation error, got {:?}", other),
    }

    // source() points at the original error
    let err = breaker
        .call(|| -> Result<(), TestError> { Err(TestError::new("boom")) })
        .unwrap_err();
    assert!(err.source().unwrap().to_string().contains("boom"));
}

#[test]
fn force_state_overrides_immediately_and_zeroes_counters() {
    let breaker = breaker(5, 3, Duration::from_secs(30));

    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.snapshot().failure_count, 2);

    breaker.force_state(State::Open);
    assert_eq!(breaker.current_state(), State::Open);
    assert_eq!(breaker.snapshot().failure_count, 0);
    assert!(breaker.is_call_blocked());

    breaker.force_state(State::Closed);
    assert_eq!(breaker.current_state(), State::Closed);
    assert!(!breaker.is_call_blocked());

    breaker.force_state(State::HalfOpen);
    assert_eq!(breaker.current_state(), State::HalfOpen);
    assert!(!breaker.is_call_blocked());
}

#[test]
fn record_methods_are_no_ops_while_open() {
    let breaker = breaker(1, 1, Duration::from_secs(30));
    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Open);

    breaker.record_success();
    breaker.record_failure();
    assert_eq!(breaker.current_state(), State::Open);

    let snapshot = breaker.snapshot();
    assert_eq!(snapshot.failure_count, 0);
    assert_eq!(snapshot.success_count, 0);
}

#[test]
fn sink_receives_every_transition_in_order() {
    let sink = CollectingSink::new();
    let breaker = Breaker::builder("orders")
        .failure_threshold(1)
        .success_threshold(1)
        .reset_timeout(Duration::from_millis(50))
        .sink(Arc::clone(&sink))
        .build();

    breaker.record_failure();
    thread::sleep(Duration::from_millis(80));
    assert!(!breaker.is_call_blocked());
    breaker.record_success();

    assert_eq!(
        sink.transitions(),
        vec![
            (State::Closed, State::Open),
            (State::Open, State::HalfOpen),
            (State::HalfOpen, State::Closed),
        ]
    );
}

#[test]
fn recent_transitions_mirror_the_sink() {
    let breaker = breaker(1, 1, Duration::from_millis(50));

    breaker.record_failure();
    thread::sleep(Duration::from_millis(80));
    assert!(!breaker.is_call_blocked());
    breaker.record_success();

    let records = breaker.recent_transitions();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].to, State::Open);
    assert_eq!(records[1].to, State::HalfOpen);
    assert_eq!(records[2].to, State::Closed);
    assert!(records.iter().all(|r| &*r.name == "test"));
}

#[test]
fn hooks_fire_on_transitions_and_outcomes() {
    let hooks = HookRegistry::new();
    let opened = Arc::new(AtomicU32::new(0));
    let failures = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&opened);
    hooks.set_on_open(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&failures);
    hooks.set_on_failure(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let breaker = Breaker::builder("hooked")
        .failure_threshold(2)
        .success_threshold(1)
        .reset_timeout(Duration::from_secs(30))
        .hooks(hooks)
        .build();

    breaker.record_failure();
    breaker.record_failure();

    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(failures.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_failures_trip_the_breaker_exactly_once() {
    const THREADS: usize = 8;

    let sink = CollectingSink::new();
    let breaker = Breaker::builder("hammered")
        .failure_threshold(4)
        .success_threshold(1)
        .reset_timeout(Duration::from_secs(30))
        .sink(Arc::clone(&sink))
        .build();

    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = Vec::with_capacity(THREADS);

    for _ in 0..THREADS {
        let thread_breaker = breaker.clone();
        let thread_barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            thread_barrier.wait();
            for _ in 0..100 {
                thread_breaker.record_failure();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(breaker.current_state(), State::Open);
    let opens = sink
        .transitions()
        .iter()
        .filter(|(_, to)| *to == State::Open)
        .count();
    assert_eq!(opens, 1);
}

#[test]
fn clones_share_one_breaker() {
    let breaker = breaker(2, 1, Duration::from_secs(30));
    let clone = breaker.clone();

    breaker.record_failure();
    clone.record_failure();

    assert_eq!(breaker.current_state(), State::Open);
    assert_eq!(clone.current_state(), State::Open);
}

#[cfg(feature = "async")]
mod async_tests {
    use super::*;

    // The guard future is plain std; polling it by hand must be enough.
    #[test]
    fn async_guard_needs_no_runtime() {
        use std::future::Future;
        use std::pin::pin;
        use std::task::{Context, Poll, Waker};

        let breaker = Breaker::builder("runtime-free")
            .failure_threshold(1)
            .success_threshold(1)
            .reset_timeout(Duration::from_secs(30))
            .build();

        let mut fut = pin!(breaker
            .call_async(|| std::future::ready(Result::<&str, TestError>::Ok("ok"))));
        let mut cx = Context::from_waker(Waker::noop());

        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(result) => assert_eq!(result.unwrap(), "ok"),
            Poll::Pending => panic!("ready operation should resolve in one poll"),
        }
    }

    #[tokio::test]
    async fn async_guard_trips_and_rejects() {
        let breaker = Breaker::builder("async")
            .failure_threshold(2)
            .success_threshold(1)
            .reset_timeout(Duration::from_secs(30))
            .build();

        for _ in 0..3 {
            let result = breaker
                .call_async(|| async { Result::<&str, TestError>::Ok("ok") })
                .await;
            assert!(result.is_ok());
        }
        assert_eq!(breaker.current_state(), State::Closed);

        for _ in 0..2 {
            let result = breaker
                .call_async(|| async { Result::<&str, TestError>::Err(TestError::new("down")) })
                .await;
            assert!(matches!(result, Err(BreakerError::Operation(_))));
        }
        assert_eq!(breaker.current_state(), State::Open);

        let result = breaker
            .call_async(|| async { Result::<&str, TestError>::Ok("ok") })
            .await;
        assert!(matches!(result, Err(BreakerError::Open(_))));
    }
}
