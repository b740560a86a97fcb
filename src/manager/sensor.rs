// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable per-field view of an appliance.

use crate::response::ApplianceInfo;
use crate::session::{ApplianceHandle, SessionStatus, WeakApplianceHandle};
use crate::state::{Field, FieldValue};
use crate::subscription::{Subscribable, SubscriptionId};

use super::ApplianceKind;

/// One field of one appliance, as a host platform would show it.
///
/// A sensor holds only a weak reference to its appliance. Once the registry
/// drops the appliance, [`value`](Self::value) reads
/// [`FieldValue::Unavailable`] and subscriptions are no-ops.
///
/// Change callbacks fire on any change of the appliance, not only of this
/// field; read [`value`](Self::value) to get the current reading.
///
/// # Examples
///
/// ```
/// use hconnect_lib::manager::ApplianceSensor;
/// use hconnect_lib::session::ApplianceHandle;
/// use hconnect_lib::state::{Field, StateReducer};
///
/// let handle = ApplianceHandle::new("BOSCH-WAT28400-68A40E000002", StateReducer::default());
/// let sensor = ApplianceSensor::new(&handle, Field::Remaining, "Bosch", "WAT28400");
///
/// assert_eq!(sensor.unique_id(), "BOSCH-WAT28400-68A40E000002-Remaining");
/// assert_eq!(sensor.name(), "Bosch WAT28400 Remaining");
/// assert_eq!(sensor.value().to_string(), "unknown");
/// ```
#[derive(Debug, Clone)]
pub struct ApplianceSensor {
    appliance: WeakApplianceHandle,
    ha_id: String,
    field: Field,
    brand: String,
    vib: String,
}

impl ApplianceSensor {
    /// Creates a sensor for one field of `handle`.
    #[must_use]
    pub fn new(
        handle: &ApplianceHandle,
        field: Field,
        brand: impl Into<String>,
        vib: impl Into<String>,
    ) -> Self {
        Self {
            appliance: handle.downgrade(),
            ha_id: handle.ha_id().to_string(),
            field,
            brand: brand.into(),
            vib: vib.into(),
        }
    }

    /// Creates every sensor that `kind` exposes.
    #[must_use]
    pub fn for_appliance(
        handle: &ApplianceHandle,
        info: &ApplianceInfo,
        kind: ApplianceKind,
    ) -> Vec<Self> {
        kind.sensor_fields()
            .iter()
            .map(|&field| Self::new(handle, field, &info.brand, &info.vib))
            .collect()
    }

    /// Returns the field this sensor reports.
    #[must_use]
    pub fn field(&self) -> Field {
        self.field
    }

    /// Returns the hardware id of the appliance.
    #[must_use]
    pub fn ha_id(&self) -> &str {
        &self.ha_id
    }

    /// Returns `"{haId}-{field}"`.
    #[must_use]
    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.ha_id, self.field)
    }

    /// Returns `"{brand} {vib} {field}"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {} {}", self.brand, self.vib, self.field)
    }

    /// Returns the current reading.
    #[must_use]
    pub fn value(&self) -> FieldValue {
        self.appliance
            .upgrade()
            .map_or(FieldValue::Unavailable, |handle| handle.get(self.field))
    }

    /// Returns true while the appliance is still tracked.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.appliance.upgrade().is_some()
    }
}

impl Subscribable for ApplianceSensor {
    fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.appliance
            .upgrade()
            .map_or(SubscriptionId::new(0), |handle| handle.on_changed(callback))
    }

    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionStatus) + Send + Sync + 'static,
    {
        self.appliance
            .upgrade()
            .map_or(SubscriptionId::new(0), |handle| {
                handle.on_status_changed(callback)
            })
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.appliance
            .upgrade()
            .is_some_and(|handle| handle.unsubscribe(id))
    }
}
