//! Wrap a tower service with a shared retrier.
use retrier::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Service, ServiceBuilder, ServiceExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let retrier: Retrier<std::io::Error> = Retrier::new(
        limited_exponential_backoff(4, Duration::from_millis(50), Duration::from_millis(200)),
        DefaultClassifier,
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let mut svc = ServiceBuilder::new().layer(RetrierLayer::new(retrier)).service_fn(
        move |req: &'static str| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                    Err(std::io::Error::new(std::io::ErrorKind::Other, "flaky backend"))
                } else {
                    Ok(format!("served {req}"))
                }
            }
        },
    );

    for req in ["first", "second", "third"] {
        let response = svc.ready().await?.call(req).await?;
        println!("{}", response);
    }
    Ok(())
}
