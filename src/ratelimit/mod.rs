//! Rate limiting algorithms and per-client state management.

mod admission;
mod fixed;
mod registry;
mod sliding;
mod window;

pub use admission::AdmissionService;
pub use fixed::FixedWindowLimiter;
pub use registry::LimiterRegistry;
pub use sliding::SlidingWindowLimiter;
pub use window::{
    ClientId, LimiterKind, TimestampMs, WindowLimiter, WindowPolicy, LIMIT, WINDOW_MS,
};
