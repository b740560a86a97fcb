// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! REST snapshot run whenever the event stream (re)connects.
//!
//! Events only describe changes, so after every connect the current state is
//! fetched explicitly:
//!
//! 1. The appliance detail. A disconnected appliance is reset and nothing
//!    else is fetched.
//! 2. The status list, applied item by item.
//! 3. If the appliance is busy, the active program and its options.
//!    Otherwise only the selected program.
//!
//! `SDK.Error.NoProgramSelected` is recorded as a "no program selected"
//! placeholder.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ParseError;
use crate::protocol::ApiClient;
use crate::response::{ApiEnvelope, ApplianceInfo, KeyValue, Program, StatusList};
use crate::session::ApplianceHandle;
use crate::state::{NO_PROGRAM_SELECTED, SELECTED_PROGRAM_KEY};

/// Operation states in which only the selected program is fetched.
pub const IDLE_STATES: [&str; 3] = ["inactive", "ready", "finished"];

/// Fetches the current state of the appliance and applies it to `handle`.
///
/// Requests retry until they get an answer, so this only returns early when
/// a body has an unexpected shape.
///
/// # Errors
///
/// Returns a [`ParseError`] if a response body is malformed.
pub async fn reconcile(client: &ApiClient, handle: &ApplianceHandle) -> Result<(), ParseError> {
    let ha_id = handle.ha_id();
    let endpoints = client.endpoints();
    tracing::debug!(ha_id, "Fetching appliance snapshot");

    let detail: ApplianceInfo = client
        .get_typed(&endpoints.appliance(ha_id))
        .await?
        .into_data()?;
    if detail.connected == Some(false) {
        tracing::info!(ha_id, "Appliance is offline");
        handle.disconnect();
        return Ok(());
    }

    let status: StatusList = client
        .get_typed(&endpoints.status(ha_id))
        .await?
        .into_data()?;
    handle.apply_items(&status.status);

    let operation_state = handle.operation_state();
    let idle = operation_state
        .as_deref()
        .is_some_and(|state| IDLE_STATES.contains(&state));
    tracing::debug!(ha_id, operation_state = ?operation_state, idle, "Fetching program");

    if idle {
        let program: ApiEnvelope<Program> =
            client.get_typed(&endpoints.selected_program(ha_id)).await?;
        apply_program(handle, program, false);
    } else {
        let program: ApiEnvelope<Program> =
            client.get_typed(&endpoints.active_program(ha_id)).await?;
        apply_program(handle, program, true);
    }

    Ok(())
}

fn apply_program(handle: &ApplianceHandle, envelope: ApiEnvelope<Program>, with_options: bool) {
    if envelope.is_no_program_selected() {
        handle.apply(SELECTED_PROGRAM_KEY, NO_PROGRAM_SELECTED);
        return;
    }

    match envelope.data {
        Some(program) => {
            let mut items = vec![KeyValue::new(SELECTED_PROGRAM_KEY, program.key)];
            if with_options {
                items.extend(program.options);
            }
            handle.apply_items(&items);
        }
        None => {
            tracing::debug!(
                ha_id = handle.ha_id(),
                error = ?envelope.error_key(),
                "No program information available"
            );
        }
    }
}

/// Runs [`reconcile`] in the background until it finishes or `cancel` fires.
pub(crate) fn spawn(
    client: ApiClient,
    handle: ApplianceHandle,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(ha_id = handle.ha_id(), "Reconciliation cancelled");
            }
            result = reconcile(&client, &handle) => {
                if let Err(e) = result {
                    tracing::warn!(ha_id = handle.ha_id(), error = %e, "Reconciliation failed");
                }
            }
        }
    })
}
