use chrono::{DateTime, Utc};
use uuid::Uuid;

use aiborn_domain::code::{CodeStatus, CodeType};
use aiborn_domain::entitlement::EntitlementType;
use aiborn_domain::member::{MemberRole, MemberStatus};

use crate::error::CodesServiceError;

/// Redeemable VIP code as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub id: Uuid,
    /// Normalized form: 6 uppercase letters/digits.
    pub code: String,
    pub code_type: CodeType,
    pub status: CodeStatus,
    pub description: Option<String>,
    /// `None` means unlimited.
    pub max_redemptions: Option<u32>,
    pub redemption_count: u32,
    pub valid_from: DateTime<Utc>,
    /// `None` means the code never expires.
    pub valid_until: Option<DateTime<Utc>>,
    pub org_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Code {
    /// Remaining redemption slots, `None` for unlimited codes.
    pub fn redemptions_remaining(&self) -> Option<u32> {
        self.max_redemptions
            .map(|max| max.saturating_sub(self.redemption_count))
    }

    /// Whether one more redemption is allowed at `now`.
    ///
    /// Checks run in a fixed order and stop at the first failure: status, start of the
    /// validity window, end of the validity window, redemption limit. A code already
    /// flipped to REDEEMED or EXPIRED reports the reason for that flip.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), CodesServiceError> {
        match self.status {
            CodeStatus::Active => {}
            CodeStatus::Redeemed => return Err(CodesServiceError::RedemptionLimitReached),
            CodeStatus::Expired => return Err(CodesServiceError::Expired),
            CodeStatus::Revoked => return Err(CodesServiceError::NotActive),
        }
        if self.valid_from > now {
            return Err(CodesServiceError::NotYetValid);
        }
        if self.valid_until.is_some_and(|until| until < now) {
            return Err(CodesServiceError::Expired);
        }
        if self
            .max_redemptions
            .is_some_and(|max| self.redemption_count >= max)
        {
            return Err(CodesServiceError::RedemptionLimitReached);
        }
        Ok(())
    }

    /// Status the code takes once one more redemption is recorded.
    pub fn status_after_redemption(&self) -> CodeStatus {
        match self.max_redemptions {
            Some(max) if self.redemption_count + 1 >= max => CodeStatus::Redeemed,
            _ => CodeStatus::Active,
        }
    }

    /// The code with one more redemption applied.
    pub fn redeemed_once(&self, now: DateTime<Utc>) -> Code {
        Code {
            redemption_count: self.redemption_count + 1,
            status: self.status_after_redemption(),
            updated_at: now,
            ..self.clone()
        }
    }
}

/// Result of a successful (or repeated) redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    /// Code state after the redemption committed.
    pub code: Code,
    /// Entitlements the code grants.
    pub granted: Vec<EntitlementType>,
    /// The user had redeemed this code before; nothing changed.
    pub already_redeemed: bool,
}

/// Outcome of one transactional redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemAttempt {
    Done(Redemption),
    /// Another redemption changed the code between read and write; the attempt rolled back.
    Conflict,
}

/// Admin list filters. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    pub code_type: Option<CodeType>,
    pub status: Option<CodeStatus>,
    pub org_id: Option<Uuid>,
    /// Case-insensitive substring of the code or its description.
    pub search: Option<String>,
}

/// Aggregates over the codes matching a [`CodeFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeStats {
    pub active: u64,
    pub redeemed: u64,
    pub expired: u64,
    pub revoked: u64,
    /// Sum of redemption counts.
    pub total_redemptions: u64,
    /// Codes redeemed at least once.
    pub used_codes: u64,
}

impl CodeStats {
    pub fn total(&self) -> u64 {
        self.active + self.redeemed + self.expired + self.revoked
    }

    /// Share of codes redeemed at least once, in `0.0..=1.0`.
    pub fn redemption_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.used_codes as f64 / total as f64,
        }
    }

    pub fn add_status(&mut self, status: CodeStatus, count: u64) {
        match status {
            CodeStatus::Active => self.active += count,
            CodeStatus::Redeemed => self.redeemed += count,
            CodeStatus::Expired => self.expired += count,
            CodeStatus::Revoked => self.revoked += count,
        }
    }
}

/// Who is performing an admin or organization action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    /// Site-wide admin; may act on every organization.
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn can_manage(&self) -> bool {
        self.is_active() && self.role.can_manage()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMemberOutcome {
    Added,
    /// A previously removed member was restored with the requested role.
    Reactivated,
    /// Already an active member; nothing changed.
    AlreadyMember,
}

/// Characters used for generated codes. Excludes 0/O and 1/I.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Maximum number of codes per generation request.
pub const MAX_GENERATE_COUNT: u32 = 1000;

/// Largest redemption limit the storage column holds.
pub const MAX_REDEMPTIONS_LIMIT: u32 = i32::MAX as u32;

/// Rounds of collision re-rolls before generation gives up.
pub const MAX_GENERATE_ROUNDS: usize = 8;

/// Transactional attempts per redemption request when unlimited codes race.
pub const MAX_REDEEM_ATTEMPTS: usize = 3;

/// Lowercase letters, digits and inner hyphens, 3–48 characters.
pub fn validate_slug(slug: &str) -> bool {
    (3..=48).contains(&slug.len())
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
