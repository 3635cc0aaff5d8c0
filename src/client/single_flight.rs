use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

/// Outcome of a refresh, shared by every caller that joined it.
pub type PendingRefresh = Shared<BoxFuture<'static, bool>>;

#[derive(Default)]
struct RefreshState {
    generation: u64,
    pending: Option<PendingRefresh>,
}

/// At most one refresh in flight; late arrivals await the same outcome.
///
/// The refresh runs on its own task, so it settles (and clears the marker)
/// even if every waiting caller is dropped.
#[derive(Clone, Default)]
pub struct SingleFlight {
    state: Arc<Mutex<RefreshState>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight refresh, or start `start()` as the new one.
    ///
    /// Returns the shared outcome and whether this call started it. The marker is
    /// set before returning, ahead of any await.
    pub fn join_or_start<F, Fut>(&self, start: F) -> (PendingRefresh, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let mut state = self.lock();
        if let Some(pending) = &state.pending {
            return (pending.clone(), false);
        }

        state.generation += 1;
        let generation = state.generation;
        let tracker = self.clone();
        let refresh = start();
        let handle = tokio::spawn(async move {
            let _settle = SettleOnDrop { flight: tracker, generation };
            refresh.await
        });

        // a panicked refresh counts as failed
        let pending = handle.map(|joined| joined.unwrap_or(false)).boxed().shared();
        state.pending = Some(pending.clone());
        (pending, true)
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().pending.is_some()
    }

    fn settle(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation {
            state.pending = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// clears the marker on completion and on panic alike
struct SettleOnDrop {
    flight: SingleFlight,
    generation: u64,
}

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        self.flight.settle(self.generation);
    }
}
