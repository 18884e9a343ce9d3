//! Session-wide graph store with a single coalesced load.
//!
//! The store moves `Uninitialized -> Loading -> Ready | Failed` once and never
//! reverts. Callers arriving while a load is in flight wait for it instead of
//! issuing their own fetch, and a failed load is not retried.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::jsonld;
use crate::models::types::{GraphError, Result};
use crate::network::traits::DataFetcher;
use crate::store::GraphStore;

/// Observable lifecycle of a [`StoreLoader`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

enum Slot {
    Uninitialized,
    Loading,
    Ready(Arc<GraphStore>),
    Failed(Arc<str>),
}

/// Fetches and decodes the dataset on first use and shares the result
pub struct StoreLoader {
    fetcher: Arc<dyn DataFetcher>,
    url: String,
    slot: RwLock<Slot>,
    load_guard: Mutex<()>,
}

impl StoreLoader {
    pub fn new(fetcher: Arc<dyn DataFetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            slot: RwLock::new(Slot::Uninitialized),
            load_guard: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> LoadState {
        match *self.slot.read().await {
            Slot::Uninitialized => LoadState::Uninitialized,
            Slot::Loading => LoadState::Loading,
            Slot::Ready(_) => LoadState::Ready,
            Slot::Failed(_) => LoadState::Failed,
        }
    }

    /// The shared store, loading it on the first call.
    ///
    /// Fails with [`GraphError::SourceUnavailable`] if the dataset could not be
    /// fetched or decoded; every later call fails the same way without
    /// fetching again.
    pub async fn get_store(&self) -> Result<Arc<GraphStore>> {
        if let Some(settled) = self.settled().await {
            return settled;
        }

        let _guard = self.load_guard.lock().await;

        // Another caller may have finished the load while we waited
        if let Some(settled) = self.settled().await {
            return settled;
        }

        *self.slot.write().await = Slot::Loading;
        tracing::debug!(url = %self.url, "loading graph store");

        let outcome = self.load().await;

        let mut slot = self.slot.write().await;
        match outcome {
            Ok(store) => {
                *slot = Slot::Ready(Arc::clone(&store));
                Ok(store)
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "graph store unavailable");
                let reason: Arc<str> = e.to_string().into();
                *slot = Slot::Failed(Arc::clone(&reason));
                Err(GraphError::SourceUnavailable(reason.to_string()))
            }
        }
    }

    async fn settled(&self) -> Option<Result<Arc<GraphStore>>> {
        match &*self.slot.read().await {
            Slot::Ready(store) => Some(Ok(Arc::clone(store))),
            Slot::Failed(reason) => Some(Err(GraphError::SourceUnavailable(reason.to_string()))),
            Slot::Uninitialized | Slot::Loading => None,
        }
    }

    async fn load(&self) -> Result<Arc<GraphStore>> {
        let bytes = self.fetcher.fetch(&self.url).await?;
        let triples = jsonld::decode(&bytes)?;
        let store = GraphStore::from_triples(triples);

        tracing::info!(
            url = %self.url,
            triples = store.len(),
            located = store.located_points(),
            "graph store ready"
        );

        Ok(Arc::new(store))
    }
}
