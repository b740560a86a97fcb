// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance state tracking.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Field, FieldValue};

static UNKNOWN: FieldValue = FieldValue::Unknown;

/// Normalized state snapshot of one appliance.
///
/// Fields are filled in as events and reconciliation responses arrive.
/// Reading a field that was never observed yields [`FieldValue::Unknown`].
///
/// # Examples
///
/// ```
/// use hconnect_lib::state::{ApplianceState, Field, FieldValue};
///
/// let mut state = ApplianceState::new();
/// assert_eq!(state.get(Field::DoorState), &FieldValue::Unknown);
///
/// state.set(Field::DoorState, FieldValue::text("open"));
/// assert_eq!(state.get(Field::DoorState).as_text(), Some("open"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplianceState {
    fields: BTreeMap<Field, FieldValue>,
}

impl ApplianceState {
    /// Creates a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a field, or [`FieldValue::Unknown`] if it was never set.
    #[must_use]
    pub fn get(&self, field: Field) -> &FieldValue {
        self.fields.get(&field).unwrap_or(&UNKNOWN)
    }

    /// Sets the value of a field.
    pub fn set(&mut self, field: Field, value: FieldValue) {
        self.fields.insert(field, value);
    }

    /// Returns `true` if the field has been written at least once.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Returns the operation state text, if known.
    #[must_use]
    pub fn operation_state(&self) -> Option<&str> {
        self.get(Field::OperationState).as_text()
    }

    /// Iterates over all fields that have been written.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// Returns the number of fields that have been written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Forgets every field.
    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
