// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconnect backoff: doubles on each consecutive failure, capped.

use std::time::Duration;

/// Exponential reconnect delay.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    current: Duration,
    attempts: u32,
}

impl ReconnectBackoff {
    /// Creates a backoff starting at `base` and never exceeding `max`.
    pub fn new(base: Duration, max: Duration) -> Self {
        let max = max.max(base);
        ReconnectBackoff {
            base,
            max,
            current: base,
            attempts: 0,
        }
    }

    /// Returns the delay for the next reconnect and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Delay the next failure will get, without advancing.
    pub fn peek(&self) -> Duration {
        self.current
    }

    /// Consecutive failures since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Back to the initial delay. Called when the channel opens.
    pub fn reset(&mut self) {
        self.current = self.base;
        self.attempts = 0;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_doubles_then_caps() {
        let mut backoff = ReconnectBackoff::default();
        let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 8, 8]);
        assert_eq!(backoff.attempts(), 6);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = ReconnectBackoff::default();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.attempts(), 1);
    }

    #[test]
    fn test_max_below_base_is_clamped() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }
}
