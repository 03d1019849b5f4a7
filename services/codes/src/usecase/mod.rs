pub mod access;
pub mod catalog;
pub mod entitlement;
pub mod generate;
pub mod organization;
pub mod rate_limit;
pub mod redeem;
pub mod validate;
