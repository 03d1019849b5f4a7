#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use aiborn_domain::code::CodeStatus;
use aiborn_domain::entitlement::EntitlementType;
use aiborn_domain::member::MemberStatus;
use aiborn_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Code, CodeFilter, CodeStats, Member, Organization, RedeemAttempt};
use crate::error::CodesServiceError;

/// Repository for VIP code records.
pub trait CodeRepository: Send + Sync {
    /// Find by normalized code string.
    async fn find_by_code(&self, code: &str) -> Result<Option<Code>, CodesServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Code>, CodesServiceError>;

    /// The subset of `candidates` already used by stored codes.
    async fn find_taken(&self, candidates: &[String]) -> Result<Vec<String>, CodesServiceError>;

    /// Insert all codes atomically.
    async fn create_many(&self, codes: &[Code]) -> Result<(), CodesServiceError>;

    /// Newest first.
    async fn list(
        &self,
        filter: &CodeFilter,
        page: PageRequest,
    ) -> Result<Page<Code>, CodesServiceError>;

    async fn stats(&self, filter: &CodeFilter) -> Result<CodeStats, CodesServiceError>;

    /// Move a code from ACTIVE to `to`. Returns `false` if the code was not ACTIVE.
    async fn transition_from_active(
        &self,
        id: Uuid,
        to: CodeStatus,
    ) -> Result<bool, CodesServiceError>;

    /// Mark ACTIVE codes whose `valid_until` is before `now` as EXPIRED.
    /// Returns the number of codes changed.
    async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<u64, CodesServiceError>;
}

/// Transactional redemption of a code for a user.
pub trait RedemptionRepository: Send + Sync {
    /// Run one redemption attempt in a single transaction.
    ///
    /// Reads the code, returns `already_redeemed` if the user has redeemed it before,
    /// re-runs [`Code::check_redeemable`], then compare-and-swaps the redemption count
    /// and grants the mapped entitlements. Returns [`RedeemAttempt::Conflict`] with
    /// nothing written if the count changed underneath.
    async fn try_redeem(
        &self,
        code: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemAttempt, CodesServiceError>;
}

/// Read side of the user ↔ entitlement relation.
pub trait EntitlementRepository: Send + Sync {
    async fn has(
        &self,
        user_id: Uuid,
        entitlement: EntitlementType,
    ) -> Result<bool, CodesServiceError>;

    async fn list_by_user(&self, user_id: Uuid)
    -> Result<Vec<EntitlementType>, CodesServiceError>;
}

/// Repository for organizations and their members.
pub trait OrganizationRepository: Send + Sync {
    /// Insert the organization and its OWNER membership in one transaction.
    /// Fails with `OrganizationAlreadyExists` when the slug is taken.
    async fn create_with_owner(
        &self,
        org: &Organization,
        owner: &Member,
    ) -> Result<(), CodesServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, CodesServiceError>;

    async fn find_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, CodesServiceError>;

    /// All memberships of the organization, removed ones included.
    async fn list_members(&self, org_id: Uuid) -> Result<Vec<Member>, CodesServiceError>;

    /// Insert or overwrite role/status of a membership.
    async fn upsert_member(&self, member: &Member) -> Result<(), CodesServiceError>;

    /// Returns `true` if a membership row was updated.
    async fn set_member_status(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        status: MemberStatus,
    ) -> Result<bool, CodesServiceError>;
}

/// Fixed-window attempt counter.
pub trait RateLimiter: Send + Sync {
    /// Record one attempt under `key` and return the attempts counted in the current window.
    async fn hit(&self, key: &str, window_secs: u64) -> Result<u64, CodesServiceError>;
}
