//! Sliding window log limiter.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::window::{TimestampMs, WindowLimiter, WindowPolicy};

/// A limiter that keeps the exact timestamps of admitted requests.
///
/// The log holds at most `limit` entries, newest at the front and oldest at
/// the back. A request is admitted when the log has room, or when the oldest
/// entry has fallen more than `window_ms` behind the request and can be
/// evicted to make room.
///
/// At most one entry is evicted per call. With non-decreasing timestamps this
/// is enough: a full log whose oldest entry is still in range means every
/// entry is in range, so the rejection is exact, and a single eviction always
/// frees the one slot the current request needs. Stale entries behind the
/// oldest simply wait for later calls.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    policy: WindowPolicy,
    log: Mutex<VecDeque<TimestampMs>>,
}

impl SlidingWindowLimiter {
    /// Create a new sliding window limiter.
    pub fn new(policy: WindowPolicy) -> Self {
        Self {
            policy,
            log: Mutex::new(VecDeque::with_capacity(policy.limit)),
        }
    }

    /// Number of timestamps currently held in the log.
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }
}

impl WindowLimiter for SlidingWindowLimiter {
    fn process_request(&self, timestamp_ms: TimestampMs) -> bool {
        let mut log = self.log.lock();

        if log.len() == self.policy.limit {
            if let Some(&oldest) = log.back() {
                if oldest.saturating_add(self.policy.window_ms) < timestamp_ms {
                    log.pop_back();
                }
            }
        }

        if log.len() >= self.policy.limit {
            return false;
        }

        log.push_front(timestamp_ms);
        true
    }
}
