// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Active and selected program bodies.

use serde::Deserialize;

use super::KeyValue;

/// Body of `/programs/active` and `/programs/selected`.
#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    /// Dotted program key, e.g. `Cooking.Oven.Program.HeatingMode.HotAir`.
    pub key: String,
    /// Program options (remaining time, progress, ...).
    #[serde(default, deserialize_with = "super::event::lenient_items")]
    pub options: Vec<KeyValue>,
}
