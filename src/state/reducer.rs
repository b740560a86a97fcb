// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Folding of vendor `{key, value}` pairs into normalized state.
//!
//! The vendor stream carries many keys; only those listed in a static
//! dispatch table are tracked. Each tracked key maps to a [`Rule`] that
//! describes how its raw value becomes a [`FieldValue`].

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::response::KeyValue;

use super::{ApplianceState, Field, FieldValue};

/// Pseudo-key fed to the reducer when the appliance goes offline.
pub const DISCONNECTED_KEY: &str = "DISCONNECTED";

/// Vendor key used to report the program (both active and selected).
pub const SELECTED_PROGRAM_KEY: &str = "BSH.Common.Root.SelectedProgram";

/// Placeholder program written when the vendor reports no program.
pub const NO_PROGRAM_SELECTED: &str = "No program selected";

/// Operation state written on disconnect.
pub const DISCONNECTED_STATE: &str = "disconnected";

/// Fields reset by a disconnect, in addition to the operation state.
pub const RESET_FIELDS: [Field; 6] = [
    Field::DoorState,
    Field::Program,
    Field::Remaining,
    Field::Elapsed,
    Field::Progress,
    Field::Warning,
];

/// Normalization rule for one vendor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Last dot-separated segment of a vendor enumeration, lowercased.
    ///
    /// Some options that look numeric are enumerations on the wire and use
    /// this rule too: coffee temperature and bean amount arrive as e.g.
    /// `ConsumerProducts.CoffeeMaker.EnumType.BeanAmount.Strong`, so they are
    /// stored as `"strong"` rather than parsed as integers.
    Enum(Field),
    /// Like [`Rule::Enum`], but bare strings without dots are accepted and lowercased.
    Program(Field),
    /// Integer value.
    Integer(Field),
    /// Boolean-like value, lowercased.
    Flag(Field),
    /// Fixed descriptive text, independent of the raw value.
    Literal(Field, &'static str),
    /// Appliance went offline.
    Reset,
}

static RULES: LazyLock<HashMap<&'static str, Rule>> = LazyLock::new(|| {
    HashMap::from([
        (DISCONNECTED_KEY, Rule::Reset),
        ("BSH.Common.Status.DoorState", Rule::Enum(Field::DoorState)),
        (
            "BSH.Common.Status.OperationState",
            Rule::Enum(Field::OperationState),
        ),
        (
            "BSH.Common.Setting.PowerState",
            Rule::Enum(Field::OperationState),
        ),
        (
            "BSH.Common.Status.LocalControlActive",
            Rule::Flag(Field::LocalControlActive),
        ),
        ("BSH.Common.Root.ActiveProgram", Rule::Program(Field::Program)),
        (SELECTED_PROGRAM_KEY, Rule::Program(Field::Program)),
        (
            "BSH.Common.Option.RemainingProgramTime",
            Rule::Integer(Field::Remaining),
        ),
        (
            "BSH.Common.Option.ElapsedProgramTime",
            Rule::Integer(Field::Elapsed),
        ),
        (
            "BSH.Common.Option.ProgramProgress",
            Rule::Integer(Field::Progress),
        ),
        (
            "LaundryCare.Washer.Option.Temperature",
            Rule::Enum(Field::Temperature),
        ),
        (
            "LaundryCare.Washer.Option.SpinSpeed",
            Rule::Enum(Field::SpinSpeed),
        ),
        // Enumerations, not numbers, despite the field names.
        (
            "ConsumerProducts.CoffeeMaker.Option.CoffeeTemperature",
            Rule::Enum(Field::Temperature),
        ),
        (
            "ConsumerProducts.CoffeeMaker.Option.BeanAmount",
            Rule::Enum(Field::BeanAmount),
        ),
        (
            "ConsumerProducts.CoffeeMaker.Option.FillQuantity",
            Rule::Integer(Field::FillQuantity),
        ),
        (
            "ConsumerProducts.CoffeeMaker.Event.BeanContainerEmpty",
            Rule::Literal(Field::Warning, "bean container empty"),
        ),
        (
            "ConsumerProducts.CoffeeMaker.Event.WaterTankEmpty",
            Rule::Literal(Field::Warning, "water tank empty"),
        ),
        (
            "ConsumerProducts.CoffeeMaker.Event.DripTrayFull",
            Rule::Literal(Field::Warning, "drip tray full"),
        ),
        (
            "Refrigeration.FridgeFreezer.Event.DoorAlarmFreezer",
            Rule::Literal(Field::Warning, "door alarm"),
        ),
        (
            "Refrigeration.FridgeFreezer.Event.DoorAlarmRefrigerator",
            Rule::Literal(Field::Warning, "door alarm"),
        ),
        (
            "Refrigeration.FridgeFreezer.Event.TemperatureAlarmFreezer",
            Rule::Literal(Field::Warning, "freezer temp too high"),
        ),
    ])
});

/// Looks up the normalization rule for a vendor key.
///
/// # Examples
///
/// ```
/// use hconnect_lib::state::{Field, Rule, rule_for};
///
/// assert_eq!(rule_for("BSH.Common.Status.DoorState"), Some(Rule::Enum(Field::DoorState)));
/// assert_eq!(rule_for("BSH.Common.Setting.ChildLock"), None);
/// ```
#[must_use]
pub fn rule_for(key: &str) -> Option<Rule> {
    RULES.get(key).copied()
}

/// Value written into a field when the appliance disconnects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetValue {
    /// Empty text.
    Empty,
    /// [`FieldValue::Unavailable`].
    #[default]
    Unavailable,
}

impl ResetValue {
    fn to_field_value(self) -> FieldValue {
        match self {
            Self::Empty => FieldValue::text(""),
            Self::Unavailable => FieldValue::Unavailable,
        }
    }
}

/// Decides what each field reads after a disconnect.
///
/// # Examples
///
/// ```
/// use hconnect_lib::state::{DisconnectPolicy, Field, ResetValue};
///
/// // Blank everything except the warning, which becomes unavailable.
/// let policy = DisconnectPolicy::new(ResetValue::Empty)
///     .with_field(Field::Warning, ResetValue::Unavailable);
/// assert_eq!(policy.reset_value(Field::Program), ResetValue::Empty);
/// assert_eq!(policy.reset_value(Field::Warning), ResetValue::Unavailable);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectPolicy {
    /// Reset value for fields without an override.
    #[serde(default)]
    pub default: ResetValue,
    /// Per-field overrides.
    #[serde(default)]
    pub overrides: HashMap<Field, ResetValue>,
}

impl DisconnectPolicy {
    /// Creates a policy that resets every field to `default`.
    #[must_use]
    pub fn new(default: ResetValue) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Overrides the reset value of one field.
    #[must_use]
    pub fn with_field(mut self, field: Field, value: ResetValue) -> Self {
        self.overrides.insert(field, value);
        self
    }

    /// Returns the reset value used for `field`.
    #[must_use]
    pub fn reset_value(&self, field: Field) -> ResetValue {
        self.overrides.get(&field).copied().unwrap_or(self.default)
    }
}

/// Applies vendor key/value pairs to an [`ApplianceState`].
///
/// Every key found in the dispatch table counts as a change, even if the
/// new value equals the old one.
///
/// # Examples
///
/// ```
/// use hconnect_lib::state::{ApplianceState, Field, StateReducer};
///
/// let reducer = StateReducer::default();
/// let mut state = ApplianceState::new();
///
/// let changed = reducer.apply(
///     &mut state,
///     "BSH.Common.Status.DoorState",
///     "BSH.Common.EnumType.DoorState.Open",
/// );
/// assert!(changed);
/// assert_eq!(state.get(Field::DoorState).as_text(), Some("open"));
///
/// // Keys outside the table are ignored.
/// assert!(!reducer.apply(&mut state, "BSH.Common.Setting.ChildLock", "true"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateReducer {
    policy: DisconnectPolicy,
}

impl StateReducer {
    /// Creates a reducer with the given disconnect policy.
    #[must_use]
    pub fn new(policy: DisconnectPolicy) -> Self {
        Self { policy }
    }

    /// Returns the disconnect policy.
    #[must_use]
    pub fn policy(&self) -> &DisconnectPolicy {
        &self.policy
    }

    /// Applies one key/value pair and returns whether the state changed.
    pub fn apply(&self, state: &mut ApplianceState, key: &str, raw: &str) -> bool {
        let Some(rule) = rule_for(key) else {
            tracing::trace!(key, value = raw, "Ignored key-value pair");
            return false;
        };

        match rule {
            Rule::Reset => {
                self.reset(state);
                true
            }
            Rule::Literal(field, text) => {
                state.set(field, FieldValue::text(text));
                true
            }
            Rule::Flag(field) => {
                state.set(field, FieldValue::text(raw.to_lowercase()));
                true
            }
            Rule::Program(field) => {
                state.set(field, FieldValue::text(last_segment(raw).to_lowercase()));
                true
            }
            Rule::Enum(field) => {
                if !raw.contains('.') {
                    tracing::debug!(key, value = raw, "Expected a dotted enumeration value");
                    return false;
                }
                state.set(field, FieldValue::text(last_segment(raw).to_lowercase()));
                true
            }
            Rule::Integer(field) => match raw.trim().parse::<i64>() {
                Ok(value) => {
                    state.set(field, FieldValue::Integer(value));
                    true
                }
                Err(e) => {
                    tracing::debug!(key, value = raw, error = %e, "Expected an integer value");
                    false
                }
            },
        }
    }

    /// Applies a decoded item. Items without a value are skipped.
    pub fn apply_item(&self, state: &mut ApplianceState, item: &KeyValue) -> bool {
        match item.raw_value() {
            Some(raw) => self.apply(state, &item.key, &raw),
            None => false,
        }
    }

    /// Applies items in order and returns whether any of them changed the state.
    pub fn apply_all<'a, I>(&self, state: &mut ApplianceState, items: I) -> bool
    where
        I: IntoIterator<Item = &'a KeyValue>,
    {
        items
            .into_iter()
            .fold(false, |changed, item| self.apply_item(state, item) | changed)
    }

    /// Marks the appliance as disconnected.
    ///
    /// The operation state becomes `"disconnected"` and every reset field
    /// that holds a value is replaced by its policy marker (`Unavailable`
    /// by default). Fields never seen stay absent. A later reconciliation
    /// overwrites each field its snapshot covers, so afterwards the state
    /// equals a fresh snapshot except that uncovered fields keep the marker
    /// instead of a stale value.
    pub fn disconnect(&self, state: &mut ApplianceState) -> bool {
        self.apply(state, DISCONNECTED_KEY, "")
    }

    fn reset(&self, state: &mut ApplianceState) {
        state.set(Field::OperationState, FieldValue::text(DISCONNECTED_STATE));
        for field in RESET_FIELDS {
            if state.contains(field) {
                state.set(field, self.policy.reset_value(field).to_field_value());
            }
        }
    }
}

fn last_segment(raw: &str) -> &str {
    raw.rsplit_once('.').map_or(raw, |(_, last)| last)
}
