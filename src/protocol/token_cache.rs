// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OAuth bearer token cache with coalesced refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use reqwest::Client;
use tokio::sync::watch;

use crate::error::ProtocolError;
use crate::protocol::Endpoints;
use crate::response::TokenResponse;

/// Caches the `Authorization` header value and refreshes it on demand.
///
/// At most one refresh request is in flight at any time. Callers that ask
/// for a token while a refresh is running wait for that refresh and all
/// observe the same outcome, including a failed one (`None`).
///
/// The cache is cheap to clone; clones share the same token.
///
/// # Examples
///
/// ```no_run
/// use hconnect_lib::protocol::{Endpoints, TokenCache};
///
/// # async fn example() {
/// let tokens = TokenCache::new(
///     reqwest::Client::new(),
///     &Endpoints::new("https://api.home-connect.com"),
///     "my-refresh-token",
/// );
///
/// let token = tokens.token(None).await;
///
/// // After a 401, force a refresh unless someone already replaced it.
/// if let Some(rejected) = token.as_deref() {
///     let _fresh = tokens.token(Some(rejected)).await;
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    token_url: String,
    refresh_token: String,
    state: Mutex<TokenState>,
    refresh_count: AtomicU64,
}

#[derive(Default)]
struct TokenState {
    access_token: Option<String>,
    in_flight: Option<watch::Receiver<Option<String>>>,
}

enum Step {
    Cached(String),
    Wait(watch::Receiver<Option<String>>),
    Refresh(watch::Sender<Option<String>>),
}

impl TokenCache {
    /// Creates an empty cache that refreshes against `endpoints`.
    #[must_use]
    pub fn new(client: Client, endpoints: &Endpoints, refresh_token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                token_url: endpoints.token(),
                refresh_token: refresh_token.into(),
                state: Mutex::new(TokenState::default()),
                refresh_count: AtomicU64::new(0),
            }),
        }
    }

    /// Seeds the cache with an existing `Authorization` header value.
    #[must_use]
    pub fn with_access_token(self, token: impl Into<String>) -> Self {
        self.inner.state.lock().access_token = Some(token.into());
        self
    }

    /// Returns the cached token without refreshing.
    #[must_use]
    pub fn cached(&self) -> Option<String> {
        self.inner.state.lock().access_token.clone()
    }

    /// Returns how many refresh requests were issued.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh_count.load(Ordering::Relaxed)
    }

    /// Returns a bearer token, refreshing if needed.
    ///
    /// Pass the token that was just rejected as `invalidate` to force a
    /// refresh. If the cache already holds a different token (because
    /// another caller refreshed in the meantime), that token is returned
    /// without a new request.
    ///
    /// Returns `None` if the refresh failed. A refresh is attempted once per
    /// call; retrying is up to the caller.
    pub async fn token(&self, invalidate: Option<&str>) -> Option<String> {
        let step = {
            let mut state = self.inner.state.lock();
            let current = state
                .access_token
                .clone()
                .filter(|token| invalidate != Some(token.as_str()));
            if let Some(token) = current {
                Step::Cached(token)
            } else if let Some(rx) = state.in_flight.clone() {
                Step::Wait(rx)
            } else {
                let (tx, rx) = watch::channel(None);
                state.access_token = None;
                state.in_flight = Some(rx);
                Step::Refresh(tx)
            }
        };

        match step {
            Step::Cached(token) => Some(token),
            Step::Wait(mut rx) => match rx.changed().await {
                Ok(()) => rx.borrow_and_update().clone(),
                // The refreshing caller was dropped before it finished.
                Err(_) => self.cached(),
            },
            Step::Refresh(tx) => {
                let guard = RefreshGuard {
                    inner: &self.inner,
                    tx: Some(tx),
                };
                let token = match self.refresh().await {
                    Ok(token) => Some(token),
                    Err(e) => {
                        tracing::error!(error = %e, "Access token refresh failed");
                        None
                    }
                };
                guard.complete(token.clone());
                token
            }
        }
    }

    async fn refresh(&self) -> Result<String, ProtocolError> {
        self.inner.refresh_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(url = %self.inner.token_url, "Refreshing access token");

        let response = self
            .inner
            .client
            .post(&self.inner.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.inner.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProtocolError::Status(status.as_u16()));
        }

        let body: TokenResponse = response.json().await?;
        tracing::info!(expires_in = ?body.expires_in, "Access token refreshed");
        Ok(body.bearer())
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("TokenCache")
            .field("token_url", &self.inner.token_url)
            .field("has_token", &state.access_token.is_some())
            .field("refreshing", &state.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

/// Publishes the refresh outcome exactly once.
///
/// If the refreshing future is dropped, the in-flight marker is cleared and
/// the sender is dropped, which wakes every waiter.
struct RefreshGuard<'a> {
    inner: &'a Inner,
    tx: Option<watch::Sender<Option<String>>>,
}

impl RefreshGuard<'_> {
    fn complete(mut self, token: Option<String>) {
        {
            let mut state = self.inner.state.lock();
            state.access_token.clone_from(&token);
            state.in_flight = None;
        }
        if let Some(tx) = self.tx.take() {
            tx.send_replace(token);
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.inner.state.lock().in_flight = None;
        }
    }
}
