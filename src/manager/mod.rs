// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance registry for tracking every appliance of an account.
//!
//! The [`ApplianceRegistry`] discovers the account's appliances, starts one
//! stream session for each supported [`ApplianceKind`], and hands out
//! [`ApplianceSensor`]s, one per field the appliance kind exposes.
//!
//! # Examples
//!
//! ## Event Subscription
//!
//! ```no_run
//! use hconnect_lib::ClientConfig;
//! use hconnect_lib::event::ApplianceEvent;
//! use hconnect_lib::manager::ApplianceRegistry;
//!
//! # async fn example() -> hconnect_lib::Result<()> {
//! let registry = ApplianceRegistry::new(&ClientConfig::new("my-refresh-token"))?;
//! let mut events = registry.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             ApplianceEvent::StateChanged { ha_id, state } => {
//!                 println!("{ha_id}: {:?}", state.operation_state());
//!             }
//!             ApplianceEvent::SessionStatusChanged { ha_id, status } => {
//!                 println!("{ha_id}: {status}");
//!             }
//!             ApplianceEvent::Discovered { .. } => {}
//!         }
//!     }
//! });
//!
//! registry.discover().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching Appliance State
//!
//! ```no_run
//! # use hconnect_lib::ClientConfig;
//! # use hconnect_lib::manager::ApplianceRegistry;
//! use hconnect_lib::state::Field;
//!
//! # async fn example(registry: ApplianceRegistry) {
//! if let Some(handle) = registry.handle("SIEMENS-HB676G5S6-68A40E000001") {
//!     let mut state_rx = handle.watch();
//!     tokio::spawn(async move {
//!         while state_rx.changed().await.is_ok() {
//!             let remaining = state_rx.borrow().get(Field::Remaining).clone();
//!             println!("Remaining: {remaining}");
//!         }
//!     });
//! }
//! # }
//! ```

mod appliance_kind;
mod registry;
mod sensor;

pub use appliance_kind::ApplianceKind;
pub use registry::ApplianceRegistry;
pub use sensor::ApplianceSensor;
