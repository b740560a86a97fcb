// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance event types.

use crate::session::SessionStatus;
use crate::state::ApplianceState;

/// Events emitted by the appliance registry.
///
/// All events carry the hardware id (`haId`) of the appliance they concern.
///
/// # Examples
///
/// ```
/// use hconnect_lib::event::ApplianceEvent;
///
/// let event = ApplianceEvent::discovered("BOSCH-WAT28400-68A40E000002", "Washer");
/// assert_eq!(event.ha_id(), "BOSCH-WAT28400-68A40E000002");
/// assert!(event.is_lifecycle());
/// ```
#[derive(Debug, Clone)]
pub enum ApplianceEvent {
    /// A supported appliance was discovered and its session started.
    Discovered {
        /// Hardware id of the appliance.
        ha_id: String,
        /// Vendor appliance type, e.g. `Oven`.
        kind: String,
    },

    /// The normalized state of an appliance changed.
    StateChanged {
        /// Hardware id of the appliance.
        ha_id: String,
        /// The complete state after the change.
        state: ApplianceState,
    },

    /// The stream session of an appliance changed status.
    SessionStatusChanged {
        /// Hardware id of the appliance.
        ha_id: String,
        /// The new session status.
        status: SessionStatus,
    },
}

impl ApplianceEvent {
    /// Returns the hardware id associated with this event.
    #[must_use]
    pub fn ha_id(&self) -> &str {
        match self {
            Self::Discovered { ha_id, .. }
            | Self::StateChanged { ha_id, .. }
            | Self::SessionStatusChanged { ha_id, .. } => ha_id,
        }
    }

    /// Returns `true` if this is a discovery event.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Discovered { .. })
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a discovery event.
    #[must_use]
    pub fn discovered(ha_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::Discovered {
            ha_id: ha_id.into(),
            kind: kind.into(),
        }
    }

    /// Creates a state change event.
    #[must_use]
    pub fn state_changed(ha_id: impl Into<String>, state: ApplianceState) -> Self {
        Self::StateChanged {
            ha_id: ha_id.into(),
            state,
        }
    }

    /// Creates a session status event.
    #[must_use]
    pub fn session_status(ha_id: impl Into<String>, status: SessionStatus) -> Self {
        Self::SessionStatusChanged {
            ha_id: ha_id.into(),
            status,
        }
    }
}
