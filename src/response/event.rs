// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key/value items carried by events and status bodies.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A single `{key, value}` item.
///
/// Values arrive as strings, numbers or booleans depending on the key.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct KeyValue {
    /// Dotted vendor key.
    pub key: String,
    /// Raw value. Items without a value (or with `null`) are skipped by the reducer.
    #[serde(default)]
    pub value: Option<Value>,
}

impl KeyValue {
    /// Creates an item with a string value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(Value::String(value.into())),
        }
    }

    /// Renders the value as the raw string the reducer works on.
    ///
    /// Strings are used as-is, numbers and booleans via their JSON text.
    /// Returns `None` when the item carries no value.
    #[must_use]
    pub fn raw_value(&self) -> Option<Cow<'_, str>> {
        match self.value.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(Cow::Borrowed(text)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

/// Payload of a data event on the stream: `{"items": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    /// Items carried by this event. Entries that are not `{key, value}`
    /// objects are dropped one by one.
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<KeyValue>,
}

/// Deserializes a list of items, skipping entries without a string `key`.
///
/// The list itself must still be an array.
pub(crate) fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<KeyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<KeyValue>(item) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed item");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_renders_scalars() {
        let text = KeyValue::new("k", "BSH.Common.EnumType.DoorState.Open");
        assert_eq!(
            text.raw_value().as_deref(),
            Some("BSH.Common.EnumType.DoorState.Open")
        );

        let number: KeyValue = serde_json::from_str(r#"{"key": "k", "value": 120}"#).unwrap();
        assert_eq!(number.raw_value().as_deref(), Some("120"));

        let flag: KeyValue = serde_json::from_str(r#"{"key": "k", "value": true}"#).unwrap();
        assert_eq!(flag.raw_value().as_deref(), Some("true"));
    }

    #[test]
    fn missing_or_null_value_renders_nothing() {
        let missing: KeyValue = serde_json::from_str(r#"{"key": "k"}"#).unwrap();
        assert!(missing.raw_value().is_none());

        let null: KeyValue = serde_json::from_str(r#"{"key": "k", "value": null}"#).unwrap();
        assert!(null.raw_value().is_none());
    }

    #[test]
    fn parse_event_payload() {
        let json = r#"{"items": [
            {"timestamp": 1700000000, "handling": "none", "key": "BSH.Common.Option.RemainingProgramTime",
             "value": 120, "unit": "seconds", "level": "hint", "uri": "/api/homeappliances/X/programs/active/options/BSH.Common.Option.RemainingProgramTime"}
        ]}"#;
        let payload: EventPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.items[0].raw_value().as_deref(), Some("120"));
    }

    #[test]
    fn malformed_items_are_skipped_individually() {
        let json = r#"{"items": [
            {"value": "BSH.Common.EnumType.DoorState.Open"},
            {"key": "BSH.Common.Option.ProgramProgress", "value": 30},
            "garbage",
            {"key": 7, "value": 1}
        ]}"#;
        let payload: EventPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.items[0].key, "BSH.Common.Option.ProgramProgress");
    }

    #[test]
    fn items_must_still_be_a_list() {
        assert!(serde_json::from_str::<EventPayload>(r#"{"items": {"key": "k"}}"#).is_err());
        assert!(serde_json::from_str::<EventPayload>(r#"{}"#).is_err());
    }
}
