//! Cancelable debounce timer.
//!
//! Only the last arm inside the quiet window fires. Each arm gets a
//! generation number and the fired callback must call [`Debouncer::fire`]
//! with it; a timer that was superseded while waiting for the lock sees a
//! stale generation and does nothing.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Default quiet period before an input change triggers a fetch
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            generation: 0,
            pending: None,
        }
    }

    /// Discard any pending timer and start a new one. `on_fire` receives the
    /// generation to hand back to [`Debouncer::fire`].
    pub fn arm<F, Fut>(&mut self, on_fire: F)
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let deadline = tokio::time::Instant::now() + self.delay;
        let callback = on_fire(self.generation);
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback.await;
        }));
    }

    /// Claim the timer for `generation`. Returns false if it was re-armed or
    /// canceled in the meantime.
    pub fn fire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.pending.is_none() {
            return false;
        }
        // The timer task is the caller; dropping its handle detaches it.
        self.pending = None;
        true
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
