// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance listing, detail and status bodies.

use serde::Deserialize;

use super::KeyValue;

/// Body of `GET /api/homeappliances`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplianceList {
    /// Appliances paired with the account.
    #[serde(default)]
    pub homeappliances: Vec<ApplianceInfo>,
}

/// An appliance as returned by discovery and by `GET /api/homeappliances/{haId}`.
///
/// # Examples
///
/// ```
/// use hconnect_lib::response::ApplianceInfo;
///
/// let json = r#"{"haId": "SIEMENS-HB676G5S6-68A40E000001", "type": "Oven",
///                "brand": "Siemens", "vib": "HB676G5S6", "connected": true}"#;
/// let info: ApplianceInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.kind, "Oven");
/// assert_eq!(info.connected, Some(true));
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApplianceInfo {
    /// Vendor hardware identifier.
    #[serde(rename = "haId")]
    pub ha_id: String,
    /// Appliance class, e.g. `Oven` or `Wine-cooler`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Vendor model identifier.
    #[serde(default)]
    pub vib: String,
    /// User-assigned name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the appliance is currently online.
    #[serde(default)]
    pub connected: Option<bool>,
}

/// Body of `GET /api/homeappliances/{haId}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusList {
    /// Current status values.
    #[serde(default, deserialize_with = "super::event::lenient_items")]
    pub status: Vec<KeyValue>,
}
