//! Retry flaky I/O three times, 100ms apart, giving up early on errors that cannot heal.
use retrier::prelude::*;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let classifier = DenyListClassifier::new([
        Criterion::io_kind(io::ErrorKind::NotFound),
        Criterion::io_kind(io::ErrorKind::PermissionDenied),
    ]);
    let retrier = Retrier::builder()
        .schedule(constant_backoff(3, Duration::from_millis(100)))
        .classifier(classifier)
        .jitter(0.1)
        .stop_after_schedule(true)
        .build()
        .expect("valid retrier configuration");

    let attempts = AtomicUsize::new(0);
    let value = retrier
        .run(|| {
            // Replace with your real fallible work
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
                } else {
                    Ok("hello from retrier")
                }
            }
        })
        .await?;

    println!("{} (after {} attempts)", value, attempts.load(Ordering::SeqCst));
    Ok(())
}
