//! Cancel a retry loop that is waiting out a long backoff.
use retrier::prelude::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("upstream unavailable")]
    Unavailable,
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let classifier = AllowListClassifier::new([Criterion::when(|e: &FetchError| {
        matches!(e, FetchError::Unavailable)
    })]);
    let retrier = Retrier::new(constant_backoff(5, Duration::from_secs(30)), classifier);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        println!("shutting down");
        canceller.cancel();
    });

    let result = retrier
        .run_ctx(&token, |token| async move {
            if token.is_cancelled() {
                return Err(FetchError::from(Cancelled));
            }
            Err::<(), _>(FetchError::Unavailable)
        })
        .await;

    println!("gave up with: {:?}", result);
}
