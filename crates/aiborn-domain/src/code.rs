//! VIP code types and the canonical code format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Length of a normalized VIP code.
pub const CODE_LEN: usize = 6;

/// Campaign a code belongs to. Decides which entitlements a redemption grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeType {
    VipPreview,
    VipBonus,
    VipLaunch,
    Partner,
    Media,
    Influencer,
}

impl CodeType {
    pub const ALL: [CodeType; 6] = [
        Self::VipPreview,
        Self::VipBonus,
        Self::VipLaunch,
        Self::Partner,
        Self::Media,
        Self::Influencer,
    ];

    /// Storage and wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VipPreview => "VIP_PREVIEW",
            Self::VipBonus => "VIP_BONUS",
            Self::VipLaunch => "VIP_LAUNCH",
            Self::Partner => "PARTNER",
            Self::Media => "MEDIA",
            Self::Influencer => "INFLUENCER",
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("code type", s))
    }
}

/// Lifecycle state of a code.
///
/// Only `Active` may transition, and only forward to one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeStatus {
    Active,
    Redeemed,
    Expired,
    Revoked,
}

impl CodeStatus {
    pub const ALL: [CodeStatus; 4] = [
        Self::Active,
        Self::Redeemed,
        Self::Expired,
        Self::Revoked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Redeemed => "REDEEMED",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
        }
    }

    /// Whether `self -> next` is a legal status change.
    pub fn can_transition_to(self, next: CodeStatus) -> bool {
        self == Self::Active && next != Self::Active
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("code status", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("code must be {CODE_LEN} letters or digits")]
pub struct InvalidCodeFormat;

/// Normalize user input into the stored code form.
///
/// Whitespace and hyphens are dropped and letters upper-cased; the result must
/// be exactly [`CODE_LEN`] ASCII letters or digits.
pub fn normalize_code(raw: &str) -> Result<String, InvalidCodeFormat> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.len() == CODE_LEN && normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(normalized)
    } else {
        Err(InvalidCodeFormat)
    }
}
