// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for appliance discovery and state changes.
//!
//! A registry publishes [`ApplianceEvent`]s for discoveries, state changes
//! and session status changes of all its appliances on one [`EventBus`].
//!
//! # Examples
//!
//! ```
//! use hconnect_lib::event::{ApplianceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(ApplianceEvent::discovered("SIEMENS-HB676G5S6-68A40E000001", "Oven"));
//! ```

mod appliance_event;
mod event_bus;

pub use appliance_event::ApplianceEvent;
pub use event_bus::EventBus;
