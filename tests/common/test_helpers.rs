use futures::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TestError {
    #[error("FOO")]
    Foo,
    #[error("BAR")]
    Bar,
    #[error("BAZ")]
    Baz,
}

/// Work returning `returns[n]` on call `n`, then `Ok(())` once the script runs out.
pub fn scripted(
    returns: Vec<TestError>,
    calls: Arc<AtomicUsize>,
) -> impl FnMut() -> Ready<Result<(), TestError>> {
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        ready(match returns.get(n) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        })
    }
}

/// In-memory log sink for asserting on emitted events.
#[derive(Clone, Default)]
pub struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl SharedWriter {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(BoxMakeWriter::new(self.clone()))
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .finish()
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedGuard;
    fn make_writer(&'a self) -> Self::Writer {
        SharedGuard(self.0.clone())
    }
}

pub struct SharedGuard(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
