//! Fixed window counter limiter.

use parking_lot::Mutex;

use super::window::{TimestampMs, WindowLimiter, WindowPolicy};

/// Mutable state guarded by the limiter's lock.
#[derive(Debug, Default)]
struct FixedWindowState {
    /// When the current window started
    window_start_ms: TimestampMs,
    /// Requests admitted in the current window
    count: usize,
}

/// A limiter that counts admissions in non-overlapping windows.
///
/// A window opens at the first request that arrives at or after the end of
/// the previous one. Because windows do not overlap, up to twice the limit
/// can be admitted in a window-length interval that straddles a boundary.
///
/// The state starts zeroed, so the first window is `[0, window_ms)` until a
/// request lands at or past its end.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    policy: WindowPolicy,
    state: Mutex<FixedWindowState>,
}

impl FixedWindowLimiter {
    /// Create a new fixed window limiter.
    pub fn new(policy: WindowPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(FixedWindowState::default()),
        }
    }

    /// Requests admitted in the current window.
    pub fn current_count(&self) -> usize {
        self.state.lock().count
    }

    /// Start of the current window.
    pub fn window_start(&self) -> TimestampMs {
        self.state.lock().window_start_ms
    }
}

impl WindowLimiter for FixedWindowLimiter {
    fn process_request(&self, timestamp_ms: TimestampMs) -> bool {
        let mut state = self.state.lock();
        let window_end = state.window_start_ms.saturating_add(self.policy.window_ms);

        if state.count >= self.policy.limit && window_end > timestamp_ms {
            return false;
        }

        if window_end <= timestamp_ms {
            state.window_start_ms = timestamp_ms;
            state.count = 0;
        }

        state.count += 1;
        true
    }
}
