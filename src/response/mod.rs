// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for Home Connect JSON payloads.
//!
//! Every REST endpoint answers with either `{"data": ...}` or
//! `{"error": {"key": ...}}`. [`ApiEnvelope`] captures both shapes; the
//! remaining types describe the `data` bodies used by discovery,
//! reconciliation, token refresh, and the event stream.

mod appliance;
mod envelope;
mod event;
mod program;
mod token;

pub use appliance::{ApplianceInfo, ApplianceList, StatusList};
pub use envelope::{ApiEnvelope, ApiErrorBody, NO_PROGRAM_SELECTED_ERROR};
pub use event::{EventPayload, KeyValue};
pub use program::Program;
pub use token::TokenResponse;
