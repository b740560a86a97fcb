// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Supported appliance classes and the sensors each one exposes.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::state::Field;

/// An appliance class that the registry tracks.
///
/// # Examples
///
/// ```
/// use hconnect_lib::manager::ApplianceKind;
/// use hconnect_lib::state::Field;
///
/// let kind: ApplianceKind = "Wine-cooler".parse().unwrap();
/// assert_eq!(kind, ApplianceKind::WineCooler);
/// assert!(kind.sensor_fields().contains(&Field::DoorState));
///
/// assert!("Hood".parse::<ApplianceKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplianceKind {
    /// Oven.
    Oven,
    /// Dishwasher.
    Dishwasher,
    /// Washing machine.
    Washer,
    /// Tumble dryer.
    Dryer,
    /// Coffee machine.
    CoffeeMaker,
    /// Freezer.
    Freezer,
    /// Combined fridge and freezer.
    FridgeFreezer,
    /// Refrigerator.
    Refrigerator,
    /// Wine cooler.
    WineCooler,
}

const OVEN_FIELDS: &[Field] = &[
    Field::OperationState,
    Field::DoorState,
    Field::LocalControlActive,
    Field::Program,
    Field::Elapsed,
    Field::Remaining,
    Field::Progress,
    Field::Warning,
];

const DISHWASHER_FIELDS: &[Field] = &[
    Field::OperationState,
    Field::DoorState,
    Field::LocalControlActive,
    Field::Program,
    Field::Remaining,
    Field::Progress,
    Field::Warning,
];

const WASHER_FIELDS: &[Field] = &[
    Field::OperationState,
    Field::DoorState,
    Field::LocalControlActive,
    Field::Program,
    Field::Elapsed,
    Field::Remaining,
    Field::Temperature,
    Field::SpinSpeed,
    Field::Warning,
];

const DRYER_FIELDS: &[Field] = &[
    Field::OperationState,
    Field::DoorState,
    Field::LocalControlActive,
    Field::Program,
    Field::Elapsed,
    Field::Remaining,
    Field::Warning,
];

const COFFEE_MAKER_FIELDS: &[Field] = &[
    Field::OperationState,
    Field::LocalControlActive,
    Field::Program,
    Field::Elapsed,
    Field::Remaining,
    Field::BeanAmount,
    Field::FillQuantity,
    Field::Temperature,
    Field::Warning,
];

const COOLING_FIELDS: &[Field] = &[Field::OperationState, Field::DoorState, Field::Warning];

impl ApplianceKind {
    /// All supported kinds.
    pub const ALL: [Self; 9] = [
        Self::Oven,
        Self::Dishwasher,
        Self::Washer,
        Self::Dryer,
        Self::CoffeeMaker,
        Self::Freezer,
        Self::FridgeFreezer,
        Self::Refrigerator,
        Self::WineCooler,
    ];

    /// Returns the vendor type string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oven => "Oven",
            Self::Dishwasher => "Dishwasher",
            Self::Washer => "Washer",
            Self::Dryer => "Dryer",
            Self::CoffeeMaker => "CoffeeMaker",
            Self::Freezer => "Freezer",
            Self::FridgeFreezer => "FridgeFreezer",
            Self::Refrigerator => "Refrigerator",
            Self::WineCooler => "Wine-cooler",
        }
    }

    /// Returns the fields exposed as sensors for this kind.
    #[must_use]
    pub fn sensor_fields(self) -> &'static [Field] {
        match self {
            Self::Oven => OVEN_FIELDS,
            Self::Dishwasher => DISHWASHER_FIELDS,
            Self::Washer => WASHER_FIELDS,
            Self::Dryer => DRYER_FIELDS,
            Self::CoffeeMaker => COFFEE_MAKER_FIELDS,
            Self::Freezer | Self::FridgeFreezer | Self::Refrigerator | Self::WineCooler => {
                COOLING_FIELDS
            }
        }
    }
}

impl fmt::Display for ApplianceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplianceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::InvalidValue {
                field: "type".to_string(),
                message: format!("unsupported appliance type '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_names_round_trip() {
        for kind in ApplianceKind::ALL {
            assert_eq!(kind.as_str().parse::<ApplianceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn type_names_are_case_sensitive() {
        assert!("oven".parse::<ApplianceKind>().is_err());
        assert!("WineCooler".parse::<ApplianceKind>().is_err());
    }

    #[test]
    fn every_kind_reports_operation_state() {
        for kind in ApplianceKind::ALL {
            assert_eq!(kind.sensor_fields()[0], Field::OperationState);
            assert!(kind.sensor_fields().contains(&Field::Warning));
        }
    }

    #[test]
    fn coffee_maker_has_no_door() {
        let fields = ApplianceKind::CoffeeMaker.sensor_fields();
        assert!(!fields.contains(&Field::DoorState));
        assert!(fields.contains(&Field::BeanAmount));
        assert!(fields.contains(&Field::FillQuantity));
    }

    #[test]
    fn washer_exposes_spin_speed() {
        assert!(ApplianceKind::Washer.sensor_fields().contains(&Field::SpinSpeed));
        assert!(!ApplianceKind::Dryer.sensor_fields().contains(&Field::SpinSpeed));
    }
}
