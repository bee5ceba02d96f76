//! Window policy, algorithm selection and the limiter trait.

use std::fmt;
use std::sync::Arc;

use super::fixed::FixedWindowLimiter;
use super::sliding::SlidingWindowLimiter;

/// Identifier of a request source, as parsed by the transport.
pub type ClientId = i32;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = u64;

/// Maximum admitted requests per window.
pub const LIMIT: usize = 5;
/// Window duration in milliseconds.
pub const WINDOW_MS: u64 = 5000;

/// The limit and window a family of limiters is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Maximum admitted requests per window
    pub limit: usize,
    /// Window duration in milliseconds
    pub window_ms: u64,
}

impl WindowPolicy {
    /// Create a policy with explicit values.
    pub const fn new(limit: usize, window_ms: u64) -> Self {
        Self { limit, window_ms }
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::new(LIMIT, WINDOW_MS)
    }
}

/// A per-client limiter that decides on one request arrival at a time.
///
/// Implementations own their synchronization: concurrent calls on the same
/// instance are serialized internally, so callers never lock around them.
///
/// Callers must present non-decreasing timestamps to a given instance. The
/// decisions for out-of-order timestamps are unspecified.
pub trait WindowLimiter: Send + Sync {
    /// Record an arrival at `timestamp_ms`, returning `true` if admitted.
    fn process_request(&self, timestamp_ms: TimestampMs) -> bool;
}

/// Which window algorithm a service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimiterKind {
    /// Fixed window counter
    Fixed,
    /// Sliding window log
    Sliding,
}

impl LimiterKind {
    /// Build a fresh limiter of this kind.
    pub fn build(&self, policy: WindowPolicy) -> Arc<dyn WindowLimiter> {
        match self {
            LimiterKind::Fixed => Arc::new(FixedWindowLimiter::new(policy)),
            LimiterKind::Sliding => Arc::new(SlidingWindowLimiter::new(policy)),
        }
    }

    /// Route segment the transport serves this kind under.
    pub fn route_name(&self) -> &'static str {
        match self {
            LimiterKind::Fixed => "fixed-window",
            LimiterKind::Sliding => "sliding-window",
        }
    }
}

impl fmt::Display for LimiterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimiterKind::Fixed => write!(f, "fixed"),
            LimiterKind::Sliding => write!(f, "sliding"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = WindowPolicy::default();
        assert_eq!(policy.limit, 5);
        assert_eq!(policy.window_ms, 5000);
    }

    #[test]
    fn test_build_yields_independent_limiters() {
        let policy = WindowPolicy::new(1, 1000);
        for kind in [LimiterKind::Fixed, LimiterKind::Sliding] {
            let a = kind.build(policy);
            let b = kind.build(policy);

            assert!(a.process_request(10));
            assert!(!a.process_request(10));
            // b has seen nothing yet
            assert!(b.process_request(10));
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(LimiterKind::Fixed.to_string(), "fixed");
        assert_eq!(LimiterKind::Sliding.route_name(), "sliding-window");
    }
}
