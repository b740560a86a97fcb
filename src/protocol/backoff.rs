// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exponential backoff for request retries and stream reconnects.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for exponential backoff.
///
/// The delay after `attempt` consecutive failures is
/// `min(max_delay, unit * multiplier^attempt)`. With the defaults this is
/// `min(600 s, 2^attempt s)`. There is no retry limit.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hconnect_lib::protocol::BackoffPolicy;
///
/// let policy = BackoffPolicy::default();
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
/// assert_eq!(policy.delay_for_attempt(20), Duration::from_secs(600));
///
/// // Fast policy for tests
/// let fast = BackoffPolicy::new().with_unit(Duration::from_millis(1));
/// assert_eq!(fast.delay_for_attempt(4), Duration::from_millis(16));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Delay for attempt zero; every later attempt multiplies it.
    #[serde(with = "crate::config::millis")]
    pub unit: Duration,
    /// Upper bound on a single delay.
    #[serde(with = "crate::config::millis")]
    pub max_delay: Duration,
    /// Growth factor per attempt.
    pub multiplier: u32,
}

impl BackoffPolicy {
    /// Default cap on a single delay.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(600);

    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base unit.
    #[must_use]
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the growth factor.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Calculates the delay after `attempt` consecutive failures.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.multiplier
            .checked_pow(attempt)
            .and_then(|factor| self.unit.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: 2,
        }
    }
}

/// Attempt counter for one retry loop.
///
/// Each failure increments the counter before the delay is computed, so the
/// first wait after a success is `unit * multiplier`.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    /// Creates a counter at attempt zero.
    #[must_use]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Records a failure and returns how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        self.policy.delay_for_attempt(self.attempt)
    }

    /// Records a success.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Returns the number of consecutive failures recorded.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
