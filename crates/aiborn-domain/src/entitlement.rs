//! Entitlements and the code type → entitlement mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;
use crate::code::CodeType;

/// Named permission gating a piece of bonus content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntitlementType {
    EarlyExcerpt,
    EnhancedBonus,
    LaunchEvent,
    BonusPack,
    BulkDiscount,
    PrioritySupport,
}

impl EntitlementType {
    pub const ALL: [EntitlementType; 6] = [
        Self::EarlyExcerpt,
        Self::EnhancedBonus,
        Self::LaunchEvent,
        Self::BonusPack,
        Self::BulkDiscount,
        Self::PrioritySupport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarlyExcerpt => "EARLY_EXCERPT",
            Self::EnhancedBonus => "ENHANCED_BONUS",
            Self::LaunchEvent => "LAUNCH_EVENT",
            Self::BonusPack => "BONUS_PACK",
            Self::BulkDiscount => "BULK_DISCOUNT",
            Self::PrioritySupport => "PRIORITY_SUPPORT",
        }
    }
}

impl fmt::Display for EntitlementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntitlementType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("entitlement type", s))
    }
}

/// Entitlements granted by redeeming a code of type `code_type`.
pub fn entitlements_for(code_type: CodeType) -> &'static [EntitlementType] {
    use EntitlementType::*;
    match code_type {
        CodeType::VipPreview => &[EarlyExcerpt],
        CodeType::VipBonus => &[EnhancedBonus],
        CodeType::VipLaunch => &[LaunchEvent],
        CodeType::Partner => &[BonusPack, BulkDiscount],
        CodeType::Media => &[EarlyExcerpt, PrioritySupport],
        CodeType::Influencer => &[EnhancedBonus, PrioritySupport],
    }
}
