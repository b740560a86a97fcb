// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of discovered appliances and their sessions.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::event::{ApplianceEvent, EventBus};
use crate::protocol::ApiClient;
use crate::response::ApplianceInfo;
use crate::session::{ApplianceHandle, StreamSession};
use crate::state::StateReducer;

use super::{ApplianceKind, ApplianceSensor};

/// Discovers appliances and keeps one stream session per appliance running.
///
/// All sessions share one [`ApiClient`] and therefore one token cache.
/// Dropping the registry cancels every session; [`shutdown`](Self::shutdown)
/// also waits for them to finish.
///
/// # Examples
///
/// ```no_run
/// use hconnect_lib::ClientConfig;
/// use hconnect_lib::manager::ApplianceRegistry;
/// use hconnect_lib::subscription::Subscribable;
///
/// #[tokio::main]
/// async fn main() -> hconnect_lib::Result<()> {
///     let registry = ApplianceRegistry::new(&ClientConfig::from_env()?)?;
///
///     for sensor in registry.discover().await? {
///         let reader = sensor.clone();
///         sensor.on_changed(move || println!("{} = {}", reader.name(), reader.value()));
///     }
///
///     tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
///     registry.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ApplianceRegistry {
    client: ApiClient,
    reducer: StateReducer,
    event_bus: EventBus,
    appliances: RwLock<HashMap<String, RegisteredAppliance>>,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct RegisteredAppliance {
    info: ApplianceInfo,
    kind: ApplianceKind,
    handle: ApplianceHandle,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ApplianceRegistry {
    /// Creates a registry from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let client = ApiClient::new(config)?;
        Ok(Self::with_client(
            client,
            StateReducer::new(config.disconnect_policy().clone()),
        ))
    }

    /// Creates a registry around an existing client.
    #[must_use]
    pub fn with_client(client: ApiClient, reducer: StateReducer) -> Self {
        Self {
            client,
            reducer,
            event_bus: EventBus::new(),
            appliances: RwLock::new(HashMap::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns the shared API client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Subscribes to events of every appliance.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApplianceEvent> {
        self.event_bus.subscribe()
    }

    /// Lists the account's appliances and starts a session for each new,
    /// supported one.
    ///
    /// Returns the sensors of the appliances added by this call. Appliances
    /// already registered and unsupported types are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the appliance list is malformed.
    pub async fn discover(&self) -> Result<Vec<ApplianceSensor>, Error> {
        let appliances = self.client.appliances().await?;
        tracing::info!(count = appliances.len(), "Discovered appliances");

        let mut sensors = Vec::new();
        for info in appliances {
            let kind = match info.kind.parse::<ApplianceKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    tracing::debug!(ha_id = %info.ha_id, kind = %info.kind, "Skipping unsupported appliance");
                    continue;
                }
            };
            if let Some(added) = self.register(info, kind) {
                sensors.extend(added);
            }
        }
        Ok(sensors)
    }

    fn register(&self, info: ApplianceInfo, kind: ApplianceKind) -> Option<Vec<ApplianceSensor>> {
        let mut appliances = self.appliances.write();
        if appliances.contains_key(&info.ha_id) {
            return None;
        }

        let handle = ApplianceHandle::with_event_bus(
            info.ha_id.clone(),
            self.reducer.clone(),
            self.event_bus.clone(),
        );
        let sensors = ApplianceSensor::for_appliance(&handle, &info, kind);
        let cancel = self.cancel.child_token();
        let task = StreamSession::new(self.client.clone(), handle.clone(), cancel.clone()).spawn();

        tracing::info!(ha_id = %info.ha_id, kind = %kind, sensors = sensors.len(), "Registered appliance");
        self.event_bus
            .publish(ApplianceEvent::discovered(&info.ha_id, kind.as_str()));

        appliances.insert(
            info.ha_id.clone(),
            RegisteredAppliance {
                info,
                kind,
                handle,
                cancel,
                task,
            },
        );
        Some(sensors)
    }

    /// Returns the handle of a registered appliance.
    #[must_use]
    pub fn handle(&self, ha_id: &str) -> Option<ApplianceHandle> {
        self.appliances
            .read()
            .get(ha_id)
            .map(|appliance| appliance.handle.clone())
    }

    /// Returns the discovery record of a registered appliance.
    #[must_use]
    pub fn info(&self, ha_id: &str) -> Option<ApplianceInfo> {
        self.appliances
            .read()
            .get(ha_id)
            .map(|appliance| appliance.info.clone())
    }

    /// Returns the sensors of a registered appliance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApplianceNotFound`] if `ha_id` is not registered.
    pub fn sensors(&self, ha_id: &str) -> Result<Vec<ApplianceSensor>, Error> {
        let appliances = self.appliances.read();
        let appliance = appliances
            .get(ha_id)
            .ok_or_else(|| Error::ApplianceNotFound(ha_id.to_string()))?;
        Ok(ApplianceSensor::for_appliance(
            &appliance.handle,
            &appliance.info,
            appliance.kind,
        ))
    }

    /// Returns the ids of all registered appliances, sorted.
    #[must_use]
    pub fn appliance_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.appliances.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered appliances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.appliances.read().len()
    }

    /// Returns true if no appliance is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.appliances.read().is_empty()
    }

    /// Stops one appliance's session and forgets it.
    ///
    /// Once its tasks have ended, its sensors read unavailable. Returns
    /// `false` if the appliance was not registered.
    pub async fn remove(&self, ha_id: &str) -> bool {
        let Some(appliance) = self.appliances.write().remove(ha_id) else {
            return false;
        };
        appliance.cancel.cancel();
        if let Err(e) = appliance.task.await {
            tracing::warn!(ha_id, error = %e, "Session task failed");
        }
        tracing::info!(ha_id, "Removed appliance");
        true
    }

    /// Cancels every session and waits for them to stop.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let appliances: Vec<RegisteredAppliance> =
            self.appliances.write().drain().map(|(_, a)| a).collect();

        for appliance in appliances {
            if let Err(e) = appliance.task.await {
                tracing::warn!(ha_id = %appliance.info.ha_id, error = %e, "Session task failed");
            }
        }
        tracing::info!("Appliance registry shut down");
    }
}

impl Drop for ApplianceRegistry {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
