//! Cancellable debounce timer for search input.
//!
//! Each [`Debouncer::push`] cancels the armed timer (if any) and arms a new
//! one carrying the latest value. Only when `delay` passes without another
//! push is the value delivered on the receiver returned by
//! [`Debouncer::new`]. A burst of keystrokes therefore settles into a single
//! value: the last one.
//!
//! ```text
//! push("m")  push("ma")  push("mar")  push("mars")
//!    |──100ms──|──100ms────|──100ms─────|────── 500ms ──────▶ "mars"
//! ```
//!
//! The timer runs as a tokio task and must be used inside a runtime.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period before search text is considered settled.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    armed: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its settled values arrive on.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            armed: None,
        };
        (debouncer, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any armed timer and re-arm with `value`.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.armed = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means nobody is listening any more.
            let _ = tx.send(value);
        }));
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting for the quiet period to elapse.
    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
    }
}
