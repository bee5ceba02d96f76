//! Turnstile - Per-client Admission Control
//!
//! This crate decides, per client, whether an incoming request is admitted
//! or rejected under a rate limit evaluated over a fixed or sliding time
//! window. The decision engine lives in [`ratelimit`]; [`http`] is a thin
//! transport that feeds it client identifiers and wall-clock timestamps.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
