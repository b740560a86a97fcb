// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance state management types.
//!
//! [`ApplianceState`] is the normalized snapshot of one appliance, and
//! [`StateReducer`] folds vendor key/value pairs into it using a static
//! table of [`Rule`]s.
//!
//! # Examples
//!
//! ```
//! use hconnect_lib::state::{ApplianceState, Field, FieldValue, StateReducer};
//!
//! let reducer = StateReducer::default();
//! let mut state = ApplianceState::new();
//!
//! reducer.apply(&mut state, "BSH.Common.Option.RemainingProgramTime", "120");
//! assert_eq!(state.get(Field::Remaining), &FieldValue::Integer(120));
//!
//! reducer.disconnect(&mut state);
//! assert_eq!(state.get(Field::Remaining), &FieldValue::Unavailable);
//! ```

mod appliance_state;
mod field;
mod reducer;

pub use appliance_state::ApplianceState;
pub use field::{Field, FieldValue};
pub use reducer::{
    DISCONNECTED_KEY, DISCONNECTED_STATE, DisconnectPolicy, NO_PROGRAM_SELECTED, RESET_FIELDS,
    ResetValue, Rule, SELECTED_PROGRAM_KEY, StateReducer, rule_for,
};
