//! Test utilities for AI-Born services.
//!
//! Dev-dependency only.

pub mod auth;
