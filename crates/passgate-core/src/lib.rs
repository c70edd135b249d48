//! Shared ambient pieces for Passgate services: health endpoints,
//! request-id middleware and tracing setup.

pub mod health;
pub mod middleware;
pub mod tracing;
