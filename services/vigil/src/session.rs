//! Poll session: full cycles, single refreshes, and auto-polling

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::checker::HealthChecker;
use crate::endpoint::Endpoint;
use crate::status::{epoch_ms, new_state_handle, EndpointStatus, StateHandle};
use crate::store::EndpointStore;

/// Handle to a running auto-poll timer task
struct AutoPoll {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// One poll session over a stored endpoint list.
///
/// The session owns the slot map and the auto-poll timer; dropping it tears
/// both down, so no timer can outlive its session.
pub struct PollSession {
    store: Arc<EndpointStore>,
    checker: Arc<HealthChecker>,
    state: StateHandle,
    auto_poll: Mutex<Option<AutoPoll>>,
}

impl PollSession {
    pub fn new(store: EndpointStore, checker: HealthChecker) -> Self {
        Self {
            store: Arc::new(store),
            checker: Arc::new(checker),
            state: new_state_handle(),
            auto_poll: Mutex::new(None),
        }
    }

    /// Shared handle to the slot map, for consumers that render it
    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    /// Clone of the current ordered slot list
    pub async fn snapshot(&self) -> Vec<EndpointStatus> {
        self.state.read().await.snapshot()
    }

    /// Check every stored endpoint once, sequentially.
    ///
    /// All slots are rebuilt as `Loading` up front, then each completed
    /// check replaces its slot immediately, so observers see the cycle's
    /// progress. A failing check never aborts the cycle; only the store
    /// read can fail.
    pub async fn run_full_cycle(&self) -> crate::Result<()> {
        run_cycle(&self.store, &self.checker, &self.state).await
    }

    /// Check exactly one endpoint and replace its slot, leaving every other
    /// slot untouched. May interleave with a running cycle; the last write
    /// to a slot wins.
    pub async fn refresh_one(&self, endpoint: &Endpoint) {
        let status = self.checker.check(endpoint).await;
        self.state.write().await.update_slot(status);
    }

    /// Run a full cycle now and again every `interval` until stopped.
    ///
    /// Starting while a timer is already running replaces it.
    pub fn start_auto_polling(&self, interval: Duration) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(auto_poll_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.checker),
            Arc::clone(&self.state),
            interval,
            cancel.clone(),
        ));

        if let Ok(mut guard) = self.auto_poll.lock() {
            if let Some(old) = guard.replace(AutoPoll { cancel, handle }) {
                old.cancel.cancel();
                old.handle.abort();
            }
        }
        tracing::info!("Auto-polling started (every {:?})", interval);
    }

    /// Cancel the recurring timer. A cycle already in flight is allowed to
    /// finish; this returns once it has.
    pub async fn stop_auto_polling(&self) {
        let auto_poll = match self.auto_poll.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };

        if let Some(auto_poll) = auto_poll {
            auto_poll.cancel.cancel();
            let _ = auto_poll.handle.await;
            tracing::info!("Auto-polling stopped");
        }
    }

    /// Clear every slot, forcing a clean view until the next cycle
    pub async fn reset_all(&self) {
        self.state.write().await.clear();
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.auto_poll.lock() {
            if let Some(auto_poll) = guard.take() {
                auto_poll.cancel.cancel();
                auto_poll.handle.abort();
            }
        }
    }
}

async fn run_cycle(
    store: &EndpointStore,
    checker: &HealthChecker,
    state: &StateHandle,
) -> crate::Result<()> {
    let endpoints = store.load()?;
    tracing::debug!("Cycle starting for {} endpoints", endpoints.len());

    state.write().await.begin_cycle(&endpoints, epoch_ms());

    // One endpoint at a time: bounds outbound connections to one and keeps
    // slot updates visibly incremental.
    for endpoint in &endpoints {
        let status = checker.check(endpoint).await;
        state.write().await.update_slot(status);
    }

    tracing::debug!("Cycle complete");
    Ok(())
}

async fn auto_poll_loop(
    store: Arc<EndpointStore>,
    checker: Arc<HealthChecker>,
    state: StateHandle,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if let Err(e) = run_cycle(&store, &checker, &state).await {
            tracing::warn!("Polling cycle failed: {}", e);
        }

        // Cancellation is only observed here, between cycles
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Auto-poll loop cancelled");
                break;
            }
        }
    }
}
