//! Shared plumbing for Pedalstar services: health check, request-id and CORS
//! middleware, tracing setup and timestamp serialization.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
