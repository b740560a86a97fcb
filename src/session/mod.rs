// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live appliance sessions.
//!
//! Each appliance has one [`ApplianceHandle`] holding its state and one
//! [`StreamSession`] keeping its event stream open. On every (re)connect the
//! session runs [`reconcile`] to fetch a REST snapshot, since events only
//! describe changes.

mod handle;
mod reconcile;
mod status;
mod stream_session;

pub use handle::{ApplianceHandle, WeakApplianceHandle};
pub use reconcile::{IDLE_STATES, reconcile};
pub use status::SessionStatus;
pub use stream_session::{CONNECTED_EVENT, DISCONNECTED_EVENT, KEEP_ALIVE_EVENT, StreamSession};
