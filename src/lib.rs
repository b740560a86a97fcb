// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hconnect` Lib - live appliance state from the Home Connect cloud API.
//!
//! This library keeps an up-to-date, normalized view of the operating state
//! of Home Connect appliances (ovens, dishwashers, washers, dryers, coffee
//! makers and cooling appliances). It holds one server-sent event stream
//! open per appliance and fetches a REST snapshot whenever a stream
//! (re)connects.
//!
//! # Features
//!
//! - **Token management**: OAuth bearer token cache with a single in-flight refresh
//! - **Resilience**: requests and streams retry forever with capped exponential backoff
//! - **Normalized state**: vendor keys folded into a small set of [`state::Field`]s
//! - **Observers**: callbacks, `watch` channels and a broadcast event bus
//!
//! # Quick Start
//!
//! ```no_run
//! use hconnect_lib::ClientConfig;
//! use hconnect_lib::manager::ApplianceRegistry;
//! use hconnect_lib::subscription::Subscribable;
//!
//! #[tokio::main]
//! async fn main() -> hconnect_lib::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let registry = ApplianceRegistry::new(&config)?;
//!
//!     for sensor in registry.discover().await? {
//!         let reader = sensor.clone();
//!         sensor.on_changed(move || {
//!             println!("{}: {}", reader.unique_id(), reader.value());
//!         });
//!     }
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Reducing Events by Hand
//!
//! The reducer works without any network access:
//!
//! ```
//! use hconnect_lib::session::ApplianceHandle;
//! use hconnect_lib::state::{Field, FieldValue, StateReducer};
//!
//! let oven = ApplianceHandle::new("SIEMENS-HB676G5S6-68A40E000001", StateReducer::default());
//! oven.apply("BSH.Common.Status.OperationState", "BSH.Common.EnumType.OperationState.Run");
//! oven.apply("BSH.Common.Option.RemainingProgramTime", "1200");
//!
//! assert_eq!(oven.operation_state().as_deref(), Some("run"));
//! assert_eq!(oven.get(Field::Remaining), FieldValue::Integer(1200));
//!
//! oven.disconnect();
//! assert_eq!(oven.get(Field::Remaining), FieldValue::Unavailable);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod response;
pub mod session;
pub mod state;
pub mod subscription;

pub use config::ClientConfig;
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use event::{ApplianceEvent, EventBus};
pub use manager::{ApplianceKind, ApplianceRegistry, ApplianceSensor};
pub use protocol::{ApiClient, BackoffPolicy, TokenCache};
pub use session::{ApplianceHandle, SessionStatus, StreamSession};
pub use state::{ApplianceState, DisconnectPolicy, Field, FieldValue, ResetValue, StateReducer};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
