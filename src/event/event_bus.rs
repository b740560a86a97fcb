// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry-wide fan-out of appliance events.

use tokio::sync::broadcast;

use super::ApplianceEvent;

const CAPACITY: usize = 256;

/// Broadcasts discovery, state and session status events of every appliance
/// a registry manages.
///
/// The registry owns one bus and hands clones to each appliance handle, so a
/// single receiver sees all appliances. Receivers only get events published
/// after they subscribed. A receiver more than 256 events behind loses the
/// oldest ones and gets `RecvError::Lagged` once.
///
/// # Examples
///
/// ```
/// use hconnect_lib::event::{ApplianceEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ApplianceEvent::discovered("BOSCH-SMV68TX06E-68A40E000003", "Dishwasher"));
/// assert!(rx.try_recv().unwrap().is_lifecycle());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ApplianceEvent>,
}

impl EventBus {
    /// Creates a bus with no receivers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApplianceEvent> {
        self.sender.subscribe()
    }

    /// Sends `event` to every current receiver. Without receivers the event
    /// is dropped.
    pub fn publish(&self, event: ApplianceEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
