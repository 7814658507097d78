use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

type Sink<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Coalesces a burst of values into one delayed write.
///
/// Each [`push`](Debouncer::push) cancels the pending timer and starts a
/// new one; when a timer fires, the most recently pushed value goes to the
/// sink. Dropping the debouncer cancels any pending write.
///
/// Timers run on tokio time, so tests drive them with a paused clock.
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    sink: Sink<T>,
    pending: Arc<Mutex<Option<T>>>,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, sink: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            sink: Arc::new(move |value| Box::pin(sink(value))),
            pending: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    pub fn push(&mut self, value: T) {
        *lock(&self.pending) = Some(value);
        self.abort_timer();

        let pending = self.pending.clone();
        let sink = self.sink.clone();
        let delay = self.delay;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let value = lock(&pending).take();
            if let Some(value) = value {
                sink(value).await;
            }
        }));
    }

    /// Write the pending value now, if any.
    pub async fn flush(&mut self) {
        self.abort_timer();
        let value = lock(&self.pending).take();
        if let Some(value) = value {
            (self.sink)(value).await;
        }
    }

    /// Drop the pending value without writing it.
    pub fn cancel(&mut self) {
        self.abort_timer();
        lock(&self.pending).take();
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.abort_timer();
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
