// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared per-appliance state with change notification.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::event::{ApplianceEvent, EventBus};
use crate::response::KeyValue;
use crate::session::SessionStatus;
use crate::state::{ApplianceState, Field, FieldValue, StateReducer};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};

/// The live state of one appliance.
///
/// The stream session and its reconciliation tasks write through the handle;
/// sensors and host code read from it. Every change that the reducer reports
/// is announced three ways: registered callbacks run, the `watch` channel
/// receives a new snapshot, and the registry event bus (if any) gets a
/// [`ApplianceEvent::StateChanged`].
///
/// Cloning is cheap; clones refer to the same appliance.
#[derive(Clone)]
pub struct ApplianceHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    ha_id: String,
    state: RwLock<ApplianceState>,
    reducer: StateReducer,
    callbacks: CallbackRegistry,
    state_tx: watch::Sender<ApplianceState>,
    status_tx: watch::Sender<SessionStatus>,
    events: Option<EventBus>,
}

impl ApplianceHandle {
    /// Creates a handle with an empty state.
    #[must_use]
    pub fn new(ha_id: impl Into<String>, reducer: StateReducer) -> Self {
        Self::build(ha_id.into(), reducer, None)
    }

    /// Creates a handle that also publishes to `events`.
    #[must_use]
    pub fn with_event_bus(ha_id: impl Into<String>, reducer: StateReducer, events: EventBus) -> Self {
        Self::build(ha_id.into(), reducer, Some(events))
    }

    fn build(ha_id: String, reducer: StateReducer, events: Option<EventBus>) -> Self {
        let (state_tx, _) = watch::channel(ApplianceState::new());
        let (status_tx, _) = watch::channel(SessionStatus::default());
        Self {
            inner: Arc::new(HandleInner {
                ha_id,
                state: RwLock::new(ApplianceState::new()),
                reducer,
                callbacks: CallbackRegistry::new(),
                state_tx,
                status_tx,
                events,
            }),
        }
    }

    /// Returns the hardware id.
    #[must_use]
    pub fn ha_id(&self) -> &str {
        &self.inner.ha_id
    }

    /// Returns the current value of a field (`Unknown` if never observed).
    #[must_use]
    pub fn get(&self, field: Field) -> FieldValue {
        self.inner.state.read().get(field).clone()
    }

    /// Returns a copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> ApplianceState {
        self.inner.state.read().clone()
    }

    /// Returns the normalized operation state, if known.
    #[must_use]
    pub fn operation_state(&self) -> Option<String> {
        self.inner.state.read().operation_state().map(str::to_owned)
    }

    /// Applies one key/value pair and notifies observers if it changed
    /// the state.
    pub fn apply(&self, key: &str, raw: &str) -> bool {
        let changed = {
            let mut state = self.inner.state.write();
            self.inner.reducer.apply(&mut state, key, raw)
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Applies a batch of items and notifies observers once.
    pub fn apply_items(&self, items: &[KeyValue]) -> bool {
        let changed = {
            let mut state = self.inner.state.write();
            self.inner.reducer.apply_all(&mut state, items)
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Marks the appliance as disconnected and notifies observers.
    pub fn disconnect(&self) -> bool {
        let changed = {
            let mut state = self.inner.state.write();
            self.inner.reducer.disconnect(&mut state)
        };
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        tracing::debug!(ha_id = %self.inner.ha_id, fields = snapshot.len(), "Appliance state changed");

        self.inner.state_tx.send_replace(snapshot.clone());
        self.inner.callbacks.dispatch_changed();
        if let Some(events) = &self.inner.events {
            events.publish(ApplianceEvent::state_changed(&self.inner.ha_id, snapshot));
        }
    }

    /// Returns a receiver that always holds the latest state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ApplianceState> {
        self.inner.state_tx.subscribe()
    }

    /// Returns the current session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.status_tx.borrow().clone()
    }

    /// Returns a receiver that always holds the latest session status.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        let previous = self.inner.status_tx.send_replace(status.clone());
        if previous == status {
            return;
        }
        tracing::debug!(ha_id = %self.inner.ha_id, status = %status, "Session status changed");

        self.inner.callbacks.dispatch_status(&status);
        if let Some(events) = &self.inner.events {
            events.publish(ApplianceEvent::session_status(&self.inner.ha_id, status));
        }
    }

    /// Creates a weak reference that does not keep the appliance alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakApplianceHandle {
        WeakApplianceHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Subscribable for ApplianceHandle {
    fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.on_changed(callback)
    }

    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionStatus) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_status_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }
}

impl std::fmt::Debug for ApplianceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplianceHandle")
            .field("ha_id", &self.inner.ha_id)
            .field("state", &*self.inner.state.read())
            .field("status", &*self.inner.status_tx.borrow())
            .field("callbacks", &self.inner.callbacks)
            .finish_non_exhaustive()
    }
}

/// A non-owning reference to an [`ApplianceHandle`].
#[derive(Clone)]
pub struct WeakApplianceHandle {
    inner: Weak<HandleInner>,
}

impl WeakApplianceHandle {
    /// Returns the handle if the appliance is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ApplianceHandle> {
        self.inner.upgrade().map(|inner| ApplianceHandle { inner })
    }
}

impl std::fmt::Debug for WeakApplianceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakApplianceHandle")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
