// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! URL construction for the Home Connect REST and event endpoints.

/// Builds endpoint URLs relative to an API base URL.
///
/// Hardware ids are percent-encoded as a single path segment.
///
/// # Examples
///
/// ```
/// use hconnect_lib::protocol::Endpoints;
///
/// let endpoints = Endpoints::new("https://api.home-connect.com/");
/// assert_eq!(
///     endpoints.status("BOSCH-HCS06COM1-0123"),
///     "https://api.home-connect.com/api/homeappliances/BOSCH-HCS06COM1-0123/status"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Creates endpoints for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// OAuth token endpoint.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{}/security/oauth/token", self.base_url)
    }

    /// Appliance list.
    #[must_use]
    pub fn appliances(&self) -> String {
        format!("{}/api/homeappliances", self.base_url)
    }

    /// Detail of one appliance.
    #[must_use]
    pub fn appliance(&self, ha_id: &str) -> String {
        format!("{}/{}", self.appliances(), urlencoding::encode(ha_id))
    }

    /// Status list of one appliance.
    #[must_use]
    pub fn status(&self, ha_id: &str) -> String {
        format!("{}/status", self.appliance(ha_id))
    }

    /// Active program of one appliance.
    #[must_use]
    pub fn active_program(&self, ha_id: &str) -> String {
        format!("{}/programs/active", self.appliance(ha_id))
    }

    /// Selected program of one appliance.
    #[must_use]
    pub fn selected_program(&self, ha_id: &str) -> String {
        format!("{}/programs/selected", self.appliance(ha_id))
    }

    /// Server-sent event stream of one appliance.
    #[must_use]
    pub fn events(&self, ha_id: &str) -> String {
        format!("{}/events", self.appliance(ha_id))
    }
}
