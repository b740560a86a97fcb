// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that signal appliance changes.

use crate::session::SessionStatus;
use crate::subscription::SubscriptionId;

/// Trait for types that support change subscriptions.
///
/// Implemented by [`ApplianceHandle`](crate::session::ApplianceHandle) and
/// [`ApplianceSensor`](crate::manager::ApplianceSensor).
///
/// # Examples
///
/// ```
/// use hconnect_lib::session::ApplianceHandle;
/// use hconnect_lib::state::{Field, StateReducer};
/// use hconnect_lib::subscription::Subscribable;
///
/// let handle = ApplianceHandle::new("SIEMENS-HB676G5S6-68A40E000001", StateReducer::default());
///
/// let sub_id = handle.on_changed({
///     let handle = handle.clone();
///     move || println!("door is now {}", handle.get(Field::DoorState))
/// });
///
/// handle.apply("BSH.Common.Status.DoorState", "BSH.Common.EnumType.DoorState.Open");
/// handle.unsubscribe(sub_id);
/// ```
pub trait Subscribable {
    /// Subscribes to state changes.
    ///
    /// The callback runs after any field of the appliance changed; it
    /// receives no value and should re-read what it needs.
    fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Subscribes to stream session status changes.
    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionStatus) + Send + Sync + 'static;

    /// Unsubscribes a callback.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
