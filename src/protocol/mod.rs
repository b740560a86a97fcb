// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Communication with the Home Connect cloud API.
//!
//! - [`ApiClient`]: authenticated REST requests that retry until they succeed
//! - [`TokenCache`]: bearer token cache with a single in-flight refresh
//! - [`EventStream`] and [`SseDecoder`]: server-sent event framing
//! - [`BackoffPolicy`] and [`Backoff`]: exponential delays between attempts
//! - [`Endpoints`]: URL construction
//!
//! All appliances share one [`ApiClient`], and therefore one [`TokenCache`].
//! A `401` seen by any session or request refreshes the token for everyone.

mod api_client;
mod backoff;
mod endpoints;
mod sse;
mod token_cache;

pub use api_client::{ApiClient, EVENT_STREAM_MEDIA_TYPE, VENDOR_MEDIA_TYPE};
pub use backoff::{Backoff, BackoffPolicy};
pub use endpoints::Endpoints;
pub use sse::{DEFAULT_EVENT_TYPE, EventStream, SseDecoder, SseEvent};
pub use token_cache::TokenCache;
