// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `{data}` / `{error}` envelope shared by all REST responses.

use serde::Deserialize;

use crate::error::ParseError;

/// Vendor error key returned when no program is active or selected.
pub const NO_PROGRAM_SELECTED_ERROR: &str = "SDK.Error.NoProgramSelected";

/// A REST response body carrying either data or a vendor error.
///
/// # Examples
///
/// ```
/// use hconnect_lib::response::{ApiEnvelope, Program};
///
/// let json = r#"{"error": {"key": "SDK.Error.NoProgramSelected"}}"#;
/// let envelope: ApiEnvelope<Program> = serde_json::from_str(json).unwrap();
/// assert!(envelope.is_no_program_selected());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Payload on success.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Vendor error on failure.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Vendor error payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Dotted error key, e.g. `SDK.Error.NoProgramSelected`.
    pub key: String,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Returns `true` if the body is the vendor "no program selected" error.
    #[must_use]
    pub fn is_no_program_selected(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|error| error.key == NO_PROGRAM_SELECTED_ERROR)
    }

    /// Returns the error key, if this is an error body.
    #[must_use]
    pub fn error_key(&self) -> Option<&str> {
        self.error.as_ref().map(|error| error.key.as_str())
    }

    /// Consumes the envelope and returns its data.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedFormat`] if the body carries a vendor
    /// error, or [`ParseError::MissingField`] if neither shape is present.
    pub fn into_data(self) -> Result<T, ParseError> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(ParseError::UnexpectedFormat(format!(
                "vendor error {}",
                error.key
            ))),
            (None, None) => Err(ParseError::MissingField("data".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::StatusList;

    #[test]
    fn parse_data_body() {
        let json = r#"{"data": {"status": [{"key": "a", "value": "b"}]}}"#;
        let envelope: ApiEnvelope<StatusList> = serde_json::from_str(json).unwrap();
        assert!(envelope.error.is_none());
        assert_eq!(envelope.into_data().unwrap().status.len(), 1);
    }

    #[test]
    fn parse_error_body() {
        let json = r#"{"error": {"key": "SDK.Error.HomeAppliance.Connection.Initialization.Failed", "description": "offline"}}"#;
        let envelope: ApiEnvelope<StatusList> = serde_json::from_str(json).unwrap();
        assert!(!envelope.is_no_program_selected());
        assert_eq!(
            envelope.error_key(),
            Some("SDK.Error.HomeAppliance.Connection.Initialization.Failed")
        );
        assert!(matches!(
            envelope.into_data(),
            Err(ParseError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn empty_body_is_missing_data() {
        let envelope: ApiEnvelope<StatusList> = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(ParseError::MissingField(field)) if field == "data"
        ));
    }
}
