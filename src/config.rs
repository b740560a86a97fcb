// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::protocol::BackoffPolicy;
use crate::state::DisconnectPolicy;

/// Environment variable holding the OAuth refresh token.
pub const REFRESH_TOKEN_ENV: &str = "HOME_CONNECT_REFRESH_TOKEN";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "HOME_CONNECT_BASE_URL";

/// Configuration shared by the API client, the token cache and every stream
/// session.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hconnect_lib::ClientConfig;
///
/// let config = ClientConfig::new("my-refresh-token")
///     .with_base_url("https://simulator.home-connect.com/")
///     .with_request_timeout(Duration::from_secs(10))
///     .with_language("de-DE");
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.language(), "de-DE");
/// ```
///
/// It can also be loaded from a host configuration file:
///
/// ```
/// use hconnect_lib::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{"refresh_token": "abc", "backoff": {"unit": 50}}"#,
/// ).unwrap();
/// assert_eq!(config.base_url(), ClientConfig::DEFAULT_BASE_URL);
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    base_url: String,
    refresh_token: String,
    #[serde(with = "millis")]
    request_timeout: Duration,
    #[serde(with = "millis")]
    stream_idle_timeout: Duration,
    language: String,
    backoff: BackoffPolicy,
    disconnect: DisconnectPolicy,
}

impl ClientConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.home-connect.com/";
    /// Default timeout for REST requests. The event stream has none.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default limit on silence from the event stream. The server sends a
    /// keep-alive about once a minute.
    pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
    /// Default `Accept-Language` sent on the event stream.
    pub const DEFAULT_LANGUAGE: &'static str = "en-US";

    /// Creates a configuration with the given refresh token and defaults
    /// for everything else.
    #[must_use]
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            ..Self::default()
        }
    }

    /// Builds a configuration from `HOME_CONNECT_REFRESH_TOKEN` and the
    /// optional `HOME_CONNECT_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRefreshToken`] if the token variable is
    /// unset or empty, or [`ConfigError::InvalidBaseUrl`] if the base URL is
    /// not an HTTP(S) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let refresh_token =
            std::env::var(REFRESH_TOKEN_ENV).map_err(|_| ConfigError::MissingRefreshToken)?;
        let mut config = Self::new(refresh_token);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the REST request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets how long the event stream may stay silent before it is
    /// considered dead and reopened.
    #[must_use]
    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// Sets the language requested on the event stream.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the backoff policy for request retries and reconnects.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets what fields read after an appliance disconnects.
    #[must_use]
    pub fn with_disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.disconnect = policy;
        self
    }

    /// Returns the API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the OAuth refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Returns the REST request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the event stream idle limit.
    #[must_use]
    pub fn stream_idle_timeout(&self) -> Duration {
        self.stream_idle_timeout
    }

    /// Returns the stream language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the backoff policy.
    #[must_use]
    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Returns the disconnect policy.
    #[must_use]
    pub fn disconnect_policy(&self) -> &DisconnectPolicy {
        &self.disconnect
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRefreshToken`] for an empty token and
    /// [`ConfigError::InvalidBaseUrl`] for a base URL that is not HTTP(S).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_token.trim().is_empty() {
            return Err(ConfigError::MissingRefreshToken);
        }

        let host = self
            .base_url
            .strip_prefix("https://")
            .or_else(|| self.base_url.strip_prefix("http://"));
        match host {
            Some(rest) if !rest.trim_matches('/').is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            refresh_token: String::new(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            stream_idle_timeout: Self::DEFAULT_STREAM_IDLE_TIMEOUT,
            language: Self::DEFAULT_LANGUAGE.to_string(),
            backoff: BackoffPolicy::default(),
            disconnect: DisconnectPolicy::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("refresh_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("stream_idle_timeout", &self.stream_idle_timeout)
            .field("language", &self.language)
            .field("backoff", &self.backoff)
            .field("disconnect", &self.disconnect)
            .finish()
    }
}

/// Serializes a [`Duration`] as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
