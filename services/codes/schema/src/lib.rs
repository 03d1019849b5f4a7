//! sea-orm entities for the codes service.
//!
//! Enum-valued columns (`code_type`, `status`, `role`, `entitlement_type`) hold the
//! SCREAMING_SNAKE_CASE spelling of the matching `aiborn-domain` enum.

pub mod code_redemptions;
pub mod codes;
pub mod entitlements;
pub mod organization_members;
pub mod organizations;
