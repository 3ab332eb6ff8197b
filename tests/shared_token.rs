use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use retryx::{CancelError, CancelSignal, CancelToken, Config, Error, sync};

#[test]
fn one_token_stops_concurrent_sequences() {
    let token = CancelToken::new();
    let calls = AtomicU32::new(0);
    let config = Config::from_millis(10, 60_000, 60_000);

    let outcomes = thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let token = &token;
                let calls = &calls;
                scope.spawn(move || {
                    sync::execute(token, config, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("unreachable host")
                    })
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        token.cancel_with("shutdown");

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    for outcome in outcomes {
        assert_eq!(outcome.attempts, 1);
        assert_eq!(
            outcome.result,
            Err(Error::Cancelled(CancelError::Reason("shutdown".into())))
        );
    }
}

#[test]
fn jittered_sequence_exhausts_within_bounds() {
    let config = Config::from_millis(3, 5, 10).with_jitter(Duration::from_millis(5));

    let start = Instant::now();
    let outcome = sync::execute(&retryx::Never, config, || {
        Err::<(), _>(std::io::ErrorKind::TimedOut)
    });

    // 5ms + 10ms of backoff, plus under 10ms of jitter in total.
    assert!(start.elapsed() >= Duration::from_millis(15));
    assert_eq!(outcome.attempts, 3);
    assert_eq!(
        outcome.last_error().and_then(Error::operation),
        Some(&std::io::ErrorKind::TimedOut)
    );
}

#[test]
fn deadline_token_reports_deadline() {
    let token = CancelToken::with_timeout(Duration::from_millis(20));
    let outcome = sync::execute(&token, Config::from_millis(1_000, 5, 5), || {
        Err::<(), _>("busy")
    });

    assert!(token.is_triggered());
    assert!(outcome.is_cancelled());
    assert_eq!(
        outcome.last_error().and_then(Error::cancelled),
        Some(&CancelError::DeadlineExceeded)
    );
}
