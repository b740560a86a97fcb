// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One long-lived event stream per appliance.

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ProtocolError;
use crate::protocol::{ApiClient, Backoff, EventStream, SseEvent};
use crate::response::EventPayload;
use crate::session::{ApplianceHandle, SessionStatus, reconcile};

/// Heartbeat event type.
pub const KEEP_ALIVE_EVENT: &str = "KEEP-ALIVE";
/// Sent when the appliance comes online.
pub const CONNECTED_EVENT: &str = "CONNECTED";
/// Sent when the appliance goes offline.
pub const DISCONNECTED_EVENT: &str = "DISCONNECTED";

/// Keeps an appliance's event stream open and feeds it into its handle.
///
/// The session reconnects after every failure, waiting
/// `min(max_delay, unit * 2^attempt)` between attempts. Any event received
/// resets the attempt counter. A stream that stays silent longer than the
/// client's idle limit is treated as broken. The session stops only when its
/// cancellation token fires.
///
/// At most one reconciliation runs per session: starting a new one (on
/// connect or on a `CONNECTED` event) cancels the previous one.
///
/// # Examples
///
/// ```no_run
/// use hconnect_lib::{ApiClient, ClientConfig};
/// use hconnect_lib::session::{ApplianceHandle, StreamSession};
/// use hconnect_lib::state::StateReducer;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> hconnect_lib::Result<()> {
/// let client = ApiClient::new(&ClientConfig::new("my-refresh-token"))?;
/// let handle = ApplianceHandle::new("SIEMENS-HB676G5S6-68A40E000001", StateReducer::default());
/// let cancel = CancellationToken::new();
///
/// let task = StreamSession::new(client, handle.clone(), cancel.clone()).spawn();
///
/// // ... later
/// cancel.cancel();
/// task.await.ok();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StreamSession {
    client: ApiClient,
    handle: ApplianceHandle,
    cancel: CancellationToken,
    reconciling: Mutex<Option<CancellationToken>>,
}

impl StreamSession {
    /// Creates a session for the appliance behind `handle`.
    #[must_use]
    pub fn new(client: ApiClient, handle: ApplianceHandle, cancel: CancellationToken) -> Self {
        Self {
            client,
            handle,
            cancel,
            reconciling: Mutex::new(None),
        }
    }

    /// Runs the session on a new task.
    #[must_use = "dropping the JoinHandle detaches the session; cancel it to stop"]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Connects, reads, and reconnects until cancelled.
    pub async fn run(self) {
        let ha_id = self.handle.ha_id().to_string();
        let mut backoff = Backoff::new(self.client.backoff_policy().clone());

        loop {
            self.handle.set_status(SessionStatus::Connecting);

            let error = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                error = self.connect_and_read(&mut backoff) => error,
            };

            let delay = backoff.next_delay();
            tracing::warn!(
                ha_id = %ha_id,
                error = %error,
                attempt = backoff.attempt(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Event stream failed, reconnecting"
            );
            self.handle.set_status(SessionStatus::Backoff {
                attempt: backoff.attempt(),
                delay,
            });

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(ha_id = %ha_id, "Event stream session stopped");
        self.handle.set_status(SessionStatus::Stopped);
    }

    /// Opens the stream and reads it until it fails. Always ends in an error;
    /// a clean close is [`ProtocolError::StreamEnded`].
    async fn connect_and_read(&self, backoff: &mut Backoff) -> ProtocolError {
        let ha_id = self.handle.ha_id();
        let tokens = self.client.tokens();

        let Some(token) = tokens.token(None).await else {
            return ProtocolError::MissingToken;
        };

        let url = self.client.endpoints().events(ha_id);
        let mut events = match self.client.open_event_stream(&url, &token).await {
            Ok(events) => events,
            Err(ProtocolError::Unauthorized) => {
                tracing::debug!(ha_id, "Event stream unauthorized, refreshing access token");
                tokens.token(Some(&token)).await;
                return ProtocolError::Unauthorized;
            }
            Err(e) => return e,
        };

        tracing::info!(ha_id, "Event stream connected");
        self.handle.set_status(SessionStatus::Streaming);
        self.spawn_reconcile();

        self.read_events(&mut events, backoff).await
    }

    /// Dispatches events until the stream breaks, closes, or goes silent.
    async fn read_events(&self, events: &mut EventStream, backoff: &mut Backoff) -> ProtocolError {
        let idle = self.client.stream_idle_timeout();
        loop {
            match tokio::time::timeout(idle, events.next_event()).await {
                Ok(Ok(event)) => {
                    backoff.reset();
                    self.dispatch(&event);
                }
                Ok(Err(e)) => return e,
                Err(_) => return ProtocolError::IdleTimeout(idle),
            }
        }
    }

    fn dispatch(&self, event: &SseEvent) {
        let ha_id = self.handle.ha_id();

        match event.kind() {
            KEEP_ALIVE_EVENT => tracing::trace!(ha_id, "Keep-alive"),
            CONNECTED_EVENT => {
                tracing::info!(ha_id, "Appliance connected");
                self.spawn_reconcile();
            }
            DISCONNECTED_EVENT => {
                tracing::info!(ha_id, "Appliance disconnected");
                self.handle.disconnect();
            }
            kind => {
                tracing::debug!(ha_id, kind, data = %event.data, "Received event");
                if event.data.is_empty() {
                    return;
                }
                match serde_json::from_str::<EventPayload>(&event.data) {
                    Ok(payload) => {
                        self.handle.apply_items(&payload.items);
                    }
                    Err(e) => {
                        tracing::warn!(ha_id, kind, error = %e, "Failed to parse event payload");
                    }
                }
            }
        }
    }

    fn spawn_reconcile(&self) {
        let cancel = self.cancel.child_token();
        if let Some(previous) = self.reconciling.lock().replace(cancel.clone()) {
            previous.cancel();
        }
        // Dropping the JoinHandle detaches the task; the token ends it.
        let _task = reconcile::spawn(self.client.clone(), self.handle.clone(), cancel);
    }
}
