// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized field names and values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A normalized, appliance-semantic state field.
///
/// Vendor event keys such as `BSH.Common.Status.DoorState` are folded into
/// one of these fields by the [`StateReducer`](super::StateReducer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Operation state (`ready`, `run`, `finished`, `disconnected`, ...).
    OperationState,
    /// Door state (`open`, `closed`, `locked`).
    DoorState,
    /// Whether the appliance is being operated locally.
    LocalControlActive,
    /// Active or selected program.
    Program,
    /// Elapsed program time in seconds.
    Elapsed,
    /// Remaining program time in seconds.
    Remaining,
    /// Program progress in percent.
    Progress,
    /// Temperature setting (washer or coffee maker).
    Temperature,
    /// Spin speed setting (washer).
    SpinSpeed,
    /// Bean amount setting (coffee maker).
    BeanAmount,
    /// Fill quantity in millilitres (coffee maker).
    FillQuantity,
    /// Most recent fault or alarm. Only one warning is kept at a time.
    Warning,
}

impl Field {
    /// All known fields, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::OperationState,
        Self::DoorState,
        Self::LocalControlActive,
        Self::Program,
        Self::Elapsed,
        Self::Remaining,
        Self::Progress,
        Self::Temperature,
        Self::SpinSpeed,
        Self::BeanAmount,
        Self::FillQuantity,
        Self::Warning,
    ];

    /// Returns the stable name of this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OperationState => "OperationState",
            Self::DoorState => "DoorState",
            Self::LocalControlActive => "LocalControlActive",
            Self::Program => "Program",
            Self::Elapsed => "Elapsed",
            Self::Remaining => "Remaining",
            Self::Progress => "Progress",
            Self::Temperature => "Temperature",
            Self::SpinSpeed => "SpinSpeed",
            Self::BeanAmount => "BeanAmount",
            Self::FillQuantity => "FillQuantity",
            Self::Warning => "Warning",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::InvalidValue {
                field: "field".to_string(),
                message: format!("unknown field name '{s}'"),
            })
    }
}

/// The value of a normalized field.
///
/// Fields that have never been observed read as [`FieldValue::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// The field has not been observed yet.
    #[default]
    Unknown,
    /// The appliance is disconnected and the value cannot be read.
    Unavailable,
    /// A textual value, already normalized to lowercase.
    Text(String),
    /// An integer value (times, percentages, quantities).
    Integer(i64),
}

impl FieldValue {
    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns `true` if the value holds real data.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Integer(_))
    }

    /// Returns the text value, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}
