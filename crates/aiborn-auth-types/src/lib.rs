//! Identity types shared across AI-Born services.
//!
//! Authentication itself happens at the gateway; services only read the
//! identity headers it injects through the `IdentityHeaders` extractor.

pub mod identity;
