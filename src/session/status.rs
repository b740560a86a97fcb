// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::time::Duration;

/// Connection status of a stream session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Obtaining a token and opening the event stream.
    #[default]
    Connecting,
    /// The event stream is open.
    Streaming,
    /// Waiting before the next connection attempt.
    Backoff {
        /// Number of consecutive failures.
        attempt: u32,
        /// How long the session waits.
        delay: Duration,
    },
    /// The session was cancelled and will not reconnect.
    Stopped,
}

impl SessionStatus {
    /// Returns true if the event stream is open.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    /// Returns true if the session has ended.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Streaming => f.write_str("streaming"),
            Self::Backoff { attempt, delay } => {
                write!(f, "backoff (attempt {attempt}, {}s)", delay.as_secs())
            }
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(SessionStatus::Streaming.to_string(), "streaming");
        let status = SessionStatus::Backoff {
            attempt: 3,
            delay: Duration::from_secs(8),
        };
        assert_eq!(status.to_string(), "backoff (attempt 3, 8s)");
    }

    #[test]
    fn predicates() {
        assert!(SessionStatus::Streaming.is_streaming());
        assert!(!SessionStatus::Connecting.is_streaming());
        assert!(SessionStatus::Stopped.is_stopped());
        assert_eq!(SessionStatus::default(), SessionStatus::Connecting);
    }
}
