//! Client state: the marker store and its change feed.

use std::sync::{Arc, Mutex, MutexGuard};

use echoread_core::{Marker, MarkerSnapshot, SubscriptionPlan};
use tokio::sync::watch;

use crate::error::{ClientError, Result};
use crate::store::MarkerRepository;

type SharedStore = Mutex<Box<dyn MarkerRepository + Send>>;

/// Shared client state.
///
/// Every write through this handle publishes the resulting snapshot, so
/// subscribers see marker changes made anywhere in the process. Snapshots
/// are published under the store lock, so the last one published always
/// matches the store.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<Inner>,
}

struct Inner {
    store: SharedStore,
    markers: watch::Sender<MarkerSnapshot>,
}

impl ClientState {
    pub fn new<R>(store: R) -> Result<Self>
    where
        R: MarkerRepository + Send + 'static,
    {
        let snapshot = store.get_markers()?;
        let (markers, _rx) = watch::channel(snapshot);
        Ok(Self {
            inner: Arc::new(Inner {
                store: Mutex::new(Box::new(store)),
                markers,
            }),
        })
    }

    /// Last published snapshot.
    pub fn markers(&self) -> MarkerSnapshot {
        self.inner.markers.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MarkerSnapshot> {
        self.inner.markers.subscribe()
    }

    pub fn set_marker(&self, marker: Marker, value: &str) -> Result<()> {
        let store = self.lock()?;
        store.set_marker(marker, value)?;
        self.publish(store.get_markers()?);
        Ok(())
    }

    pub fn clear_marker(&self, marker: Marker) -> Result<()> {
        let store = self.lock()?;
        store.clear_marker(marker)?;
        self.publish(store.get_markers()?);
        Ok(())
    }

    pub fn start_trial(&self) -> Result<()> {
        self.set_marker(Marker::TrialStarted, "true")
    }

    pub fn select_subscription(&self, plan: SubscriptionPlan) -> Result<()> {
        self.set_marker(Marker::SubscriptionSelected, plan.as_str())
    }

    pub fn complete_onboarding(&self) -> Result<()> {
        self.set_marker(Marker::OnboardingCompleted, "true")
    }

    /// Write `trial_started` when neither a trial nor a subscription is
    /// recorded. Returns whether the marker was written.
    pub fn bootstrap_trial(&self) -> Result<bool> {
        let store = self.lock()?;
        if !store.get_markers()?.needs_trial_bootstrap() {
            return Ok(false);
        }
        store.set_marker(Marker::TrialStarted, "true")?;
        tracing::info!("No trial or subscription recorded, starting trial");
        self.publish(store.get_markers()?);
        Ok(true)
    }

    /// Re-read the store and publish if another writer changed it.
    ///
    /// Returns whether a new snapshot was published.
    pub fn refresh(&self) -> Result<bool> {
        let store = self.lock()?;
        Ok(self.publish(store.get_markers()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn MarkerRepository + Send>>> {
        self.inner
            .store
            .lock()
            .map_err(|_| ClientError::LockPoisoned)
    }

    fn publish(&self, snapshot: MarkerSnapshot) -> bool {
        self.inner.markers.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            tracing::debug!(markers = ?snapshot, "Markers changed");
            *current = snapshot;
            true
        })
    }
}
