//! Domain types shared across all AI-Born services.
//!
//! Pure types with no framework dependencies.

pub mod code;
pub mod entitlement;
pub mod member;
pub mod pagination;
pub mod user;

/// Returned when a stored or wire string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
