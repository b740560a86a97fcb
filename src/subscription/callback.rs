// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for appliance change notifications.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::session::SessionStatus;

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later.
/// IDs are unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback invoked when any field of the appliance changed.
///
/// The callback carries no value: observers re-read the fields they care about.
type ChangedCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback invoked when the stream session changes status.
type StatusCallback = Arc<dyn Fn(&SessionStatus) + Send + Sync>;

/// Registry for appliance callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability. Callbacks are cloned
/// out of the lock before they run, so a callback may itself subscribe or
/// unsubscribe without deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    changed_callbacks: RwLock<HashMap<SubscriptionId, ChangedCallback>>,
    status_callbacks: RwLock<HashMap<SubscriptionId, StatusCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            changed_callbacks: RwLock::new(HashMap::new()),
            status_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback for state changes.
    pub fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.changed_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for session status changes.
    pub fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.status_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changed_callbacks.write().remove(&id).is_some()
            || self.status_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.changed_callbacks.write().clear();
        self.status_callbacks.write().clear();
    }

    /// Signals every change callback.
    pub fn dispatch_changed(&self) {
        let callbacks: Vec<ChangedCallback> =
            self.changed_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Passes a session status to every status callback.
    pub fn dispatch_status(&self, status: &SessionStatus) {
        let callbacks: Vec<StatusCallback> =
            self.status_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(status);
        }
    }

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.changed_callbacks.read().len() + self.status_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
