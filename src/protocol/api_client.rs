// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated REST client with status-driven retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, ParseError, ProtocolError};
use crate::protocol::{Backoff, BackoffPolicy, Endpoints, EventStream, TokenCache};
use crate::response::{ApiEnvelope, ApplianceInfo, ApplianceList};

/// Media type of the vendor REST API.
pub const VENDOR_MEDIA_TYPE: &str = "application/vnd.bsh.sdk.v1+json";

/// Media type of the event stream.
pub const EVENT_STREAM_MEDIA_TYPE: &str = "text/event-stream";

/// HTTP client for the Home Connect API.
///
/// [`request`](Self::request) never fails: transport errors, unexpected
/// statuses and unreadable bodies are retried with exponential backoff until
/// a `200` or `404` arrives, or until the caller drops the future. A `401`
/// forces a token refresh before the next attempt.
///
/// Cheap to clone; clones share connections and the token cache.
///
/// # Examples
///
/// ```no_run
/// use hconnect_lib::{ApiClient, ClientConfig};
///
/// # async fn example() -> hconnect_lib::Result<()> {
/// let client = ApiClient::new(&ClientConfig::new("my-refresh-token"))?;
///
/// for appliance in client.appliances().await? {
///     println!("{} {} ({})", appliance.brand, appliance.vib, appliance.kind);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    client: Client,
    stream_client: Client,
    endpoints: Endpoints,
    tokens: TokenCache,
    backoff: BackoffPolicy,
    stream_idle_timeout: Duration,
    language: String,
}

impl ApiClient {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or
    /// [`Error::Protocol`] if the HTTP client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ProtocolError::Http)?;

        // Reads on the event stream are bounded by the session's idle limit.
        let stream_client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(ProtocolError::Http)?;

        let endpoints = Endpoints::new(config.base_url());
        let tokens = TokenCache::new(client.clone(), &endpoints, config.refresh_token());

        Ok(Self {
            inner: Arc::new(ClientInner {
                client,
                stream_client,
                endpoints,
                tokens,
                backoff: config.backoff().clone(),
                stream_idle_timeout: config.stream_idle_timeout(),
                language: config.language().to_string(),
            }),
        })
    }

    /// Returns the endpoint builder.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    /// Returns the shared token cache.
    #[must_use]
    pub fn tokens(&self) -> &TokenCache {
        &self.inner.tokens
    }

    /// Returns the backoff policy used for retries.
    #[must_use]
    pub fn backoff_policy(&self) -> &BackoffPolicy {
        &self.inner.backoff
    }

    /// Returns how long an event stream may stay silent.
    #[must_use]
    pub fn stream_idle_timeout(&self) -> Duration {
        self.inner.stream_idle_timeout
    }

    /// Returns the language requested on event streams.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.inner.language
    }

    /// Sends a request until it yields a `200` or `404` body.
    ///
    /// With `auth`, a bearer token from the cache is attached; a `401`
    /// invalidates that token. Every other failure (including a missing
    /// token) waits `min(max_delay, unit * 2^attempt)` and tries again.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
        auth: bool,
    ) -> Value {
        let mut backoff = Backoff::new(self.inner.backoff.clone());

        loop {
            let token = if auth {
                self.inner.tokens.token(None).await
            } else {
                None
            };

            let result = if auth && token.is_none() {
                Err(ProtocolError::MissingToken)
            } else {
                self.send_once(method.clone(), url, headers, body, token.as_deref())
                    .await
            };

            match result {
                Ok(value) => return value,
                Err(ProtocolError::Unauthorized) if auth => {
                    tracing::debug!(url, "Request unauthorized, refreshing access token");
                    self.inner.tokens.token(token.as_deref()).await;
                }
                Err(e) => {
                    tracing::debug!(url, method = %method, error = %e, "Request failed");
                }
            }

            let delay = backoff.next_delay();
            tracing::debug!(
                url,
                attempt = backoff.attempt(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, ProtocolError> {
        tracing::debug!(url, method = %method, "Sending HTTP request");

        let mut request = self
            .inner
            .client
            .request(method, url)
            .headers(headers.clone());
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "Received HTTP response");

        match status {
            StatusCode::OK | StatusCode::NOT_FOUND => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(ProtocolError::Unauthorized),
            other => Err(ProtocolError::Status(other.as_u16())),
        }
    }

    /// Authenticated `GET` of a vendor JSON resource.
    pub async fn get_json(&self, url: &str) -> Value {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(VENDOR_MEDIA_TYPE));
        self.request(Method::GET, url, &headers, None, true).await
    }

    /// Authenticated `GET` whose body is checked against the envelope of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the body does not have the expected
    /// shape. Vendor errors are not errors here; inspect the envelope.
    pub async fn get_typed<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<ApiEnvelope<T>, ParseError> {
        let value = self.get_json(url).await;
        Ok(serde_json::from_value(value)?)
    }

    /// Lists the appliances paired with the account.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the list body is malformed or carries a
    /// vendor error.
    pub async fn appliances(&self) -> Result<Vec<ApplianceInfo>, ParseError> {
        let url = self.inner.endpoints.appliances();
        let list: ApplianceList = self.get_typed(&url).await?.into_data()?;
        Ok(list.homeappliances)
    }

    /// Opens a server-sent event stream with the given bearer token.
    ///
    /// Unlike [`request`](Self::request) this makes a single attempt;
    /// reconnecting is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Unauthorized`] for a `401`,
    /// [`ProtocolError::Status`] for any other non-success status, and
    /// [`ProtocolError::Http`] for transport failures.
    pub async fn open_event_stream(
        &self,
        url: &str,
        token: &str,
    ) -> Result<EventStream, ProtocolError> {
        tracing::debug!(url, "Opening event stream");

        let response = self
            .inner
            .stream_client
            .get(url)
            .header(ACCEPT, EVENT_STREAM_MEDIA_TYPE)
            .header(ACCEPT_LANGUAGE, self.inner.language.as_str())
            .header(AUTHORIZATION, token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProtocolError::Status(status.as_u16()));
        }

        Ok(EventStream::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn invalid_config_is_rejected() {
        let err = ApiClient::new(&ClientConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingRefreshToken)
        ));
    }

    #[test]
    fn exposes_configuration() {
        let config = ClientConfig::new("token")
            .with_base_url("http://127.0.0.1:8080/")
            .with_language("fr-FR")
            .with_stream_idle_timeout(Duration::from_secs(5));
        let client = ApiClient::new(&config).unwrap();

        assert_eq!(client.endpoints().base_url(), "http://127.0.0.1:8080");
        assert_eq!(client.language(), "fr-FR");
        assert_eq!(client.stream_idle_timeout(), Duration::from_secs(5));
        assert_eq!(client.backoff_policy(), &BackoffPolicy::default());
        assert!(client.tokens().cached().is_none());
    }

    #[test]
    fn clones_share_token_cache() {
        let client = ApiClient::new(&ClientConfig::new("token")).unwrap();
        let clone = client.clone();
        let _ = client.tokens().clone().with_access_token("Bearer x");
        assert_eq!(clone.tokens().cached().as_deref(), Some("Bearer x"));
    }
}
