//! HTTP transport for the admission service.
//!
//! Each window algorithm is served under its own route. A request carries
//! the client identifier in its `clientId` query parameter and is answered
//! `200 OK` when admitted or `503 Service Unavailable` when rejected.

mod handlers;
mod server;

pub use handlers::{AdmissionQuery, AppState, HealthResponse};
pub use server::{router, HttpServer};
