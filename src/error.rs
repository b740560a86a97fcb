// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hconnect` library.
//!
//! Most failures in this crate never reach the caller: transport errors are
//! retried and malformed payloads are logged and skipped. The types here
//! describe what went wrong at the points where an error *is* observable,
//! such as configuration validation, stream setup, or payload shape checks.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Client configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Appliance was not found in the registry.
    #[error("appliance not found: {0}")]
    ApplianceNotFound(String),
}

/// Errors related to HTTP and event stream communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the bearer token (HTTP 401).
    #[error("authentication rejected")]
    Unauthorized,

    /// The server answered with an unexpected status code.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The event stream stayed silent longer than the idle limit.
    #[error("no event received for {0:?}")]
    IdleTimeout(std::time::Duration),

    /// The event stream was closed by the remote end.
    #[error("event stream ended")]
    StreamEnded,

    /// No bearer token is available (the last refresh failed).
    #[error("no access token available")]
    MissingToken,
}

impl ProtocolError {
    /// Returns `true` if the error means the bearer token must be refreshed.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Errors related to parsing API responses and stream payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No OAuth refresh token was provided.
    #[error("refresh token is required")]
    MissingRefreshToken,

    /// The API base URL is not a usable HTTP(S) URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
