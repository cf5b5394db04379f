//! Rate Limiting Infrastructure
//!
//! Sliding-window counting over event timestamps. Storage is the caller's
//! concern: callers load the events they want counted and ask for a decision.

use std::time::Duration;

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum events allowed in the window
    pub max_requests: u32,
    /// Trailing window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    /// Exclusive lower bound of the window ending at `now_ms`
    ///
    /// An event at exactly this instant is outside the window.
    pub fn window_start_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.window_ms())
    }

    /// Evaluate a sliding window over the given event timestamps (Unix ms)
    ///
    /// Only events strictly after `now_ms - window` are counted. The event
    /// iterator does not need to be sorted.
    pub fn evaluate<I>(&self, now_ms: i64, events_ms: I) -> RateLimitResult
    where
        I: IntoIterator<Item = i64>,
    {
        let start = self.window_start_ms(now_ms);
        let mut counted: Vec<i64> = events_ms.into_iter().filter(|&ts| ts > start).collect();
        counted.sort_unstable();

        let count = u32::try_from(counted.len()).unwrap_or(u32::MAX);
        let allowed = count < self.max_requests;
        let remaining = self.max_requests.saturating_sub(count);

        // The decision flips once enough of the oldest events age out.
        let reset_at_ms = if allowed {
            counted
                .first()
                .map_or(now_ms, |oldest| oldest.saturating_add(self.window_ms()))
        } else {
            let excess = (count - self.max_requests) as usize;
            counted
                .get(excess)
                .map_or(now_ms, |ts| ts.saturating_add(self.window_ms()))
        };

        RateLimitResult {
            allowed,
            count,
            remaining,
            reset_at_ms,
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Events counted inside the window
    pub count: u32,
    pub remaining: u32,
    /// When the current decision may change (Unix ms)
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Milliseconds until `reset_at_ms`, zero if already passed
    pub fn retry_after_ms(&self, now_ms: i64) -> i64 {
        (self.reset_at_ms - now_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;
    const NOW: i64 = 10 * HOUR_MS;

    fn hourly(max: u32) -> RateLimitConfig {
        RateLimitConfig::new(max, 3600)
    }

    #[test]
    fn test_empty_window_allows() {
        let result = hourly(5).evaluate(NOW, []);
        assert!(result.allowed);
        assert_eq!(result.count, 0);
        assert_eq!(result.remaining, 5);
        assert_eq!(result.reset_at_ms, NOW);
    }

    #[test]
    fn test_threshold_denies() {
        let events = (1..=5).map(|i| NOW - i * 1000);
        let result = hourly(5).evaluate(NOW, events);
        assert!(!result.allowed);
        assert_eq!(result.count, 5);
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn test_below_threshold_allows() {
        let events = (1..=4).map(|i| NOW - i * 1000);
        let result = hourly(5).evaluate(NOW, events);
        assert!(result.allowed);
        assert_eq!(result.remaining, 1);
    }

    #[test]
    fn test_boundary_event_is_excluded() {
        // Four inside, one exactly at now - window
        let mut events: Vec<i64> = (1..=4).map(|i| NOW - i * 1000).collect();
        events.push(NOW - HOUR_MS);
        let result = hourly(5).evaluate(NOW, events);
        assert!(result.allowed);
        assert_eq!(result.count, 4);
    }

    #[test]
    fn test_just_inside_boundary_is_counted() {
        let mut events: Vec<i64> = (1..=4).map(|i| NOW - i * 1000).collect();
        events.push(NOW - HOUR_MS + 1);
        let result = hourly(5).evaluate(NOW, events);
        assert!(!result.allowed);
    }

    #[test]
    fn test_reset_at_tracks_oldest_needed_event() {
        // Six events, threshold five: denial lasts until the two oldest age out
        let events = vec![
            NOW - 60_000,
            NOW - 50_000,
            NOW - 40_000,
            NOW - 30_000,
            NOW - 20_000,
            NOW - 10_000,
        ];
        let result = hourly(5).evaluate(NOW, events);
        assert!(!result.allowed);
        assert_eq!(result.reset_at_ms, NOW - 50_000 + HOUR_MS);
        assert_eq!(result.retry_after_ms(NOW), HOUR_MS - 50_000);
    }

    #[test]
    fn test_unsorted_input() {
        let events = vec![NOW - 10, NOW - 30, NOW - 20];
        let result = hourly(3).evaluate(NOW, events);
        assert!(!result.allowed);
        assert_eq!(result.reset_at_ms, NOW - 30 + HOUR_MS);
    }
}
