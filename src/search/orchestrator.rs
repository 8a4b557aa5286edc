//! Async shell around [`SearchSession`].
//!
//! Actions are synchronous and fire-and-forget: they update state under a
//! short lock, arm the debounce timer or spawn the network call, and
//! publish a fresh [`SearchSnapshot`]. The lock is never held across an
//! `.await`; responses re-enter through [`SearchSession::complete`], which
//! discards anything that is no longer the latest request.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::catalog::CatalogClient;
use crate::error::{Result, StorefrontError};

use super::SearchOptions;
use super::cache::{ResultCache, SharedResultCache};
use super::debounce::Debouncer;
use super::session::{FetchStep, PendingFetch, Resolution, SearchSession};
use super::state::SearchSnapshot;

struct Inner {
    session: SearchSession,
    debounce: Debouncer,
    updates: watch::Sender<SearchSnapshot>,
    mounted: bool,
}

impl Inner {
    fn snapshot(&self) -> SearchSnapshot {
        self.session.snapshot(self.debounce.is_armed())
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}

/// Search/listing orchestrator for one view.
///
/// Dropping the orchestrator unmounts it: the pending timer is cleared and
/// any in-flight request is canceled and ignored.
pub struct SearchOrchestrator<C: CatalogClient + 'static> {
    client: Arc<C>,
    inner: Arc<Mutex<Inner>>,
}

impl<C: CatalogClient + 'static> SearchOrchestrator<C> {
    /// Mount with a private cache. Must be called from within a tokio
    /// runtime; later actions may come from any thread.
    pub fn mount(client: C, options: SearchOptions) -> Result<Self> {
        let cache = ResultCache::shared(options.cache_capacity, options.cache_ttl);
        Self::mount_with_cache(client, options, cache)
    }

    /// Mount with an explicitly shared cache, so several views spend one
    /// eviction budget.
    pub fn mount_with_cache(
        client: C,
        options: SearchOptions,
        cache: SharedResultCache,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            StorefrontError::Other("search orchestrator requires a tokio runtime".to_string())
        })?;

        let debounce = Debouncer::new(options.debounce, runtime);
        let session = SearchSession::new(options, cache);
        let (updates, _) = watch::channel(session.snapshot(false));

        let orchestrator = Self {
            client: Arc::new(client),
            inner: Arc::new(Mutex::new(Inner {
                session,
                debounce,
                updates,
                mounted: true,
            })),
        };

        {
            let mut inner = orchestrator.inner.lock();
            orchestrator.arm(&mut inner);
            inner.publish();
        }

        Ok(orchestrator)
    }

    /// Replace the query. A real change resets to page 1 with no results
    /// and schedules a fetch.
    pub fn set_query(&self, query: impl Into<String>) {
        let mut inner = self.inner.lock();
        if !inner.mounted {
            return;
        }
        if inner.session.set_query(query.into()) {
            self.arm(&mut inner);
        }
        inner.publish();
    }

    /// Move to another page (replace mode). Schedules a fetch.
    pub fn set_page(&self, page: u32) {
        let mut inner = self.inner.lock();
        if !inner.mounted {
            return;
        }
        if inner.session.set_page(page) {
            self.arm(&mut inner);
        }
        inner.publish();
    }

    /// Skip the debounce window and fetch page 1 now.
    pub fn submit_now(&self) {
        let mut inner = self.inner.lock();
        if !inner.mounted {
            return;
        }
        inner.debounce.cancel();
        inner.session.rewind();
        let step = inner.session.begin_fetch(false);
        self.dispatch(&inner, step);
        inner.publish();
    }

    /// Append the next page (infinite scroll mode only).
    pub fn load_more(&self) {
        let mut inner = self.inner.lock();
        if !inner.mounted {
            return;
        }
        let step = inner.session.begin_fetch(true);
        self.dispatch(&inner, step);
        inner.publish();
    }

    /// Reset to an empty query on page 1 and reload the latest items.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        if !inner.mounted {
            return;
        }
        inner.session.clear();
        self.arm(&mut inner);
        inner.publish();
    }

    /// Stop for good. Later actions are ignored.
    pub fn unmount(&self) {
        let mut inner = self.inner.lock();
        if !inner.mounted {
            return;
        }
        inner.mounted = false;
        inner.debounce.cancel();
        inner.session.detach();
        inner.publish();
        tracing::debug!("search orchestrator unmounted");
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.lock().snapshot()
    }

    /// Receive every published state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.lock().updates.subscribe()
    }

    /// Wait until no timer is armed and nothing is in flight.
    pub async fn settled(&self) -> SearchSnapshot {
        let mut updates = self.subscribe();
        match updates.wait_for(SearchSnapshot::is_settled).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    fn arm(&self, inner: &mut Inner) {
        let shared = Arc::clone(&self.inner);
        let client = Arc::clone(&self.client);
        inner.debounce.arm(move |generation| async move {
            Self::on_timer(&shared, &client, generation);
        });
    }

    fn on_timer(shared: &Arc<Mutex<Inner>>, client: &Arc<C>, generation: u64) {
        let mut inner = shared.lock();
        if !inner.mounted || !inner.debounce.fire(generation) {
            return;
        }
        let step = inner.session.begin_fetch(false);
        Self::spawn_fetch(shared, client, &inner, step);
        inner.publish();
    }

    fn dispatch(&self, inner: &Inner, step: FetchStep) {
        Self::spawn_fetch(&self.inner, &self.client, inner, step);
    }

    fn spawn_fetch(shared: &Arc<Mutex<Inner>>, client: &Arc<C>, inner: &Inner, step: FetchStep) {
        let FetchStep::Issued(pending) = step else {
            return;
        };
        let shared = Arc::clone(shared);
        let client = Arc::clone(client);
        inner
            .debounce
            .runtime()
            .spawn(Self::run_fetch(shared, client, pending));
    }

    async fn run_fetch(shared: Arc<Mutex<Inner>>, client: Arc<C>, pending: PendingFetch) {
        let PendingFetch {
            cancel,
            request,
            context,
        } = pending;
        let sequence = context.sequence;

        let outcome = request.execute(client.as_ref(), cancel).await;

        let mut inner = shared.lock();
        let resolution = inner.session.complete(context, outcome);
        if resolution != Resolution::Stale {
            inner.publish();
        }
        tracing::trace!(sequence, ?resolution, "catalog request resolved");
    }
}

impl<C: CatalogClient + 'static> Drop for SearchOrchestrator<C> {
    fn drop(&mut self) {
        self.unmount();
    }
}
