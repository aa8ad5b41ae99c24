//! Tower integration.
//!
//! [`RetrierLayer`] wraps any cloneable `tower::Service` so every request runs through a
//! shared [`Retrier`]. Requests must be `Clone` because each attempt gets its own copy. The
//! first attempt calls the service readied by `poll_ready`; retries ready a fresh clone.
//!
//! ```rust
//! use retrier::{constant_backoff, DefaultClassifier, Retrier, RetrierLayer};
//! use std::time::Duration;
//! use tower::{service_fn, ServiceBuilder, ServiceExt};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let retrier: Retrier<std::io::Error> =
//!     Retrier::new(constant_backoff(3, Duration::from_millis(1)), DefaultClassifier);
//! let svc = ServiceBuilder::new()
//!     .layer(RetrierLayer::new(retrier))
//!     .service(service_fn(|name: &'static str| async move {
//!         Ok::<_, std::io::Error>(format!("hello, {name}"))
//!     }));
//! assert_eq!(svc.oneshot("world").await.unwrap(), "hello, world");
//! # });
//! ```

use crate::retrier::Retrier;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::ServiceExt;
use tower_layer::Layer;
use tower_service::Service;

/// Layer applying a shared [`Retrier`] to an inner service.
pub struct RetrierLayer<E> {
    retrier: Arc<Retrier<E>>,
}

impl<E> RetrierLayer<E> {
    pub fn new(retrier: Retrier<E>) -> Self {
        Self { retrier: Arc::new(retrier) }
    }

    /// Reuse a retrier that is also driven directly elsewhere.
    pub fn from_shared(retrier: Arc<Retrier<E>>) -> Self {
        Self { retrier }
    }
}

impl<E> Clone for RetrierLayer<E> {
    fn clone(&self) -> Self {
        Self { retrier: self.retrier.clone() }
    }
}

impl<E> std::fmt::Debug for RetrierLayer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrierLayer").field("retrier", &self.retrier).finish()
    }
}

impl<S, E> Layer<S> for RetrierLayer<E> {
    type Service = RetrierService<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        RetrierService { inner: service, retrier: self.retrier.clone() }
    }
}

/// Retry service produced by [`RetrierLayer`].
pub struct RetrierService<S, E> {
    inner: S,
    retrier: Arc<Retrier<E>>,
}

impl<S: Clone, E> Clone for RetrierService<S, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), retrier: self.retrier.clone() }
    }
}

impl<S, E, Request> Service<Request> for RetrierService<S, E>
where
    Request: Clone + Send + 'static,
    S: Service<Request> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<E>,
    E: Send + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // `poll_ready` readied `self.inner`; take that instance for the first attempt and
        // leave a fresh clone behind.
        let clone = self.inner.clone();
        let readied = std::mem::replace(&mut self.inner, clone);
        let template = readied.clone();
        let retrier = self.retrier.clone();
        let mut first = Some(readied);
        Box::pin(async move {
            retrier
                .run(move || {
                    let (mut svc, is_ready) = match first.take() {
                        Some(svc) => (svc, true),
                        None => (template.clone(), false),
                    };
                    let req = req.clone();
                    async move {
                        if !is_ready {
                            svc.ready().await.map_err(Into::<E>::into)?;
                        }
                        svc.call(req).await.map_err(Into::<E>::into)
                    }
                })
                .await
        })
    }
}
