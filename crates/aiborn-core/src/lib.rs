//! Shared HTTP plumbing for AI-Born services: health probes, request ids,
//! tracing setup, and wire serializers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
