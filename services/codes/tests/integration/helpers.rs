use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use aiborn_codes::domain::repository::{
    CodeRepository, EntitlementRepository, OrganizationRepository, RedemptionRepository,
};
use aiborn_codes::domain::types::{
    Actor, Code, CodeFilter, CodeStats, Member, Organization, RedeemAttempt, Redemption,
};
use aiborn_codes::error::CodesServiceError;
use aiborn_domain::code::{CodeStatus, CodeType};
use aiborn_domain::entitlement::{EntitlementType, entitlements_for};
use aiborn_domain::member::{MemberRole, MemberStatus};
use aiborn_domain::pagination::{Page, PageRequest};

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Active, already-valid code with no expiry.
pub fn test_code(code: &str, code_type: CodeType, max_redemptions: Option<u32>) -> Code {
    let now = Utc::now();
    Code {
        id: Uuid::now_v7(),
        code: code.to_owned(),
        code_type,
        status: CodeStatus::Active,
        description: None,
        max_redemptions,
        redemption_count: 0,
        valid_from: now - Duration::days(1),
        valid_until: None,
        org_id: None,
        created_by: Uuid::nil(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_org(slug: &str) -> Organization {
    Organization {
        id: Uuid::now_v7(),
        name: slug.to_uppercase(),
        slug: slug.to_owned(),
        created_at: Utc::now(),
    }
}

pub fn test_member(org_id: Uuid, user_id: Uuid, role: MemberRole) -> Member {
    let now = Utc::now();
    Member {
        org_id,
        user_id,
        role,
        status: MemberStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn admin() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        is_admin: true,
    }
}

pub fn reader() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        is_admin: false,
    }
}

// ── MockStore ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Store {
    pub codes: Vec<Code>,
    /// (code_id, user_id) ledger.
    pub redemptions: HashSet<(Uuid, Uuid)>,
    /// One row per (user, entitlement), like the table's primary key.
    pub entitlements: Vec<(Uuid, EntitlementType)>,
    pub orgs: Vec<Organization>,
    pub members: Vec<Member>,
    /// `find_taken` reports every candidate as taken for this many calls.
    pub taken_rounds: usize,
    pub find_taken_calls: usize,
}

/// In-memory implementation of every repository, shared through clones.
#[derive(Clone, Default)]
pub struct MockStore {
    pub inner: Arc<Mutex<Store>>,
}

impl MockStore {
    pub fn with_codes(codes: Vec<Code>) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().codes = codes;
        store
    }

    pub fn code(&self, code: &str) -> Code {
        self.inner
            .lock()
            .unwrap()
            .codes
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .expect("code seeded")
    }

    pub fn codes(&self) -> Vec<Code> {
        self.inner.lock().unwrap().codes.clone()
    }

    /// Raw entitlement rows of one user, in insertion order.
    pub fn entitlement_rows(&self, user_id: Uuid) -> Vec<EntitlementType> {
        self.inner
            .lock()
            .unwrap()
            .entitlements
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, e)| *e)
            .collect()
    }

    pub fn grant(&self, user_id: Uuid, entitlement: EntitlementType) {
        self.inner
            .lock()
            .unwrap()
            .entitlements
            .push((user_id, entitlement));
    }

    pub fn seed_org(&self, org: Organization, members: Vec<Member>) {
        let mut store = self.inner.lock().unwrap();
        store.orgs.push(org);
        store.members.extend(members);
    }

    pub fn member(&self, org_id: Uuid, user_id: Uuid) -> Option<Member> {
        self.inner
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|m| m.org_id == org_id && m.user_id == user_id)
            .cloned()
    }

    pub fn set_taken_rounds(&self, rounds: usize) {
        self.inner.lock().unwrap().taken_rounds = rounds;
    }

    pub fn find_taken_calls(&self) -> usize {
        self.inner.lock().unwrap().find_taken_calls
    }
}

fn matches_filter(code: &Code, filter: &CodeFilter) -> bool {
    filter.code_type.is_none_or(|t| code.code_type == t)
        && filter.status.is_none_or(|s| code.status == s)
        && filter.org_id.is_none_or(|o| code.org_id == Some(o))
        && filter.search.as_deref().is_none_or(|needle| {
            code.code.contains(&needle.to_uppercase())
                || code
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle.to_lowercase()))
        })
}

impl CodeRepository for MockStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Code>, CodesServiceError> {
        let store = self.inner.lock().unwrap();
        Ok(store.codes.iter().find(|c| c.code == code).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Code>, CodesServiceError> {
        let store = self.inner.lock().unwrap();
        Ok(store.codes.iter().find(|c| c.id == id).cloned())
    }

    async fn find_taken(&self, candidates: &[String]) -> Result<Vec<String>, CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        store.find_taken_calls += 1;
        if store.find_taken_calls <= store.taken_rounds {
            return Ok(candidates.to_vec());
        }
        Ok(candidates
            .iter()
            .filter(|c| store.codes.iter().any(|stored| &stored.code == *c))
            .cloned()
            .collect())
    }

    async fn create_many(&self, codes: &[Code]) -> Result<(), CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        store.codes.extend(codes.iter().cloned());
        Ok(())
    }

    async fn list(
        &self,
        filter: &CodeFilter,
        page: PageRequest,
    ) -> Result<Page<Code>, CodesServiceError> {
        let page = page.clamped();
        let store = self.inner.lock().unwrap();
        let mut matching: Vec<Code> = store
            .codes
            .iter()
            .filter(|c| matches_filter(c, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn stats(&self, filter: &CodeFilter) -> Result<CodeStats, CodesServiceError> {
        let store = self.inner.lock().unwrap();
        let mut stats = CodeStats::default();
        for code in store.codes.iter().filter(|c| matches_filter(c, filter)) {
            stats.add_status(code.status, 1);
            stats.total_redemptions += u64::from(code.redemption_count);
            if code.redemption_count > 0 {
                stats.used_codes += 1;
            }
        }
        Ok(stats)
    }

    async fn transition_from_active(
        &self,
        id: Uuid,
        to: CodeStatus,
    ) -> Result<bool, CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        match store
            .codes
            .iter_mut()
            .find(|c| c.id == id && c.status == CodeStatus::Active)
        {
            Some(code) => {
                code.status = to;
                code.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<u64, CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        let mut expired = 0;
        for code in store.codes.iter_mut() {
            if code.status == CodeStatus::Active && code.valid_until.is_some_and(|u| u < now) {
                code.status = CodeStatus::Expired;
                code.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

impl RedemptionRepository for MockStore {
    /// Read, yield, then compare-and-swap, so concurrent callers interleave.
    async fn try_redeem(
        &self,
        code: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemAttempt, CodesServiceError> {
        let (current, already) = {
            let store = self.inner.lock().unwrap();
            let current = store
                .codes
                .iter()
                .find(|c| c.code == code)
                .cloned()
                .ok_or(CodesServiceError::NotFound)?;
            let already = store.redemptions.contains(&(current.id, user_id));
            (current, already)
        };
        let granted = entitlements_for(current.code_type).to_vec();
        if already {
            return Ok(RedeemAttempt::Done(Redemption {
                code: current,
                granted,
                already_redeemed: true,
            }));
        }
        current.check_redeemable(now)?;

        tokio::task::yield_now().await;

        let mut store = self.inner.lock().unwrap();
        let Some(stored) = store.codes.iter_mut().find(|c| c.id == current.id) else {
            return Ok(RedeemAttempt::Conflict);
        };
        if stored.redemption_count != current.redemption_count
            || stored.status != CodeStatus::Active
        {
            return Ok(RedeemAttempt::Conflict);
        }
        let next = current.redeemed_once(now);
        *stored = next.clone();
        store.redemptions.insert((current.id, user_id));
        for entitlement in &granted {
            if !store.entitlements.contains(&(user_id, *entitlement)) {
                store.entitlements.push((user_id, *entitlement));
            }
        }
        Ok(RedeemAttempt::Done(Redemption {
            code: next,
            granted,
            already_redeemed: false,
        }))
    }
}

impl EntitlementRepository for MockStore {
    async fn has(
        &self,
        user_id: Uuid,
        entitlement: EntitlementType,
    ) -> Result<bool, CodesServiceError> {
        let store = self.inner.lock().unwrap();
        Ok(store.entitlements.contains(&(user_id, entitlement)))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EntitlementType>, CodesServiceError> {
        Ok(self.entitlement_rows(user_id))
    }
}

impl OrganizationRepository for MockStore {
    async fn create_with_owner(
        &self,
        org: &Organization,
        owner: &Member,
    ) -> Result<(), CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        if store.orgs.iter().any(|o| o.slug == org.slug) {
            return Err(CodesServiceError::OrganizationAlreadyExists);
        }
        store.orgs.push(org.clone());
        store.members.push(owner.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, CodesServiceError> {
        let store = self.inner.lock().unwrap();
        Ok(store.orgs.iter().find(|o| o.id == id).cloned())
    }

    async fn find_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, CodesServiceError> {
        Ok(self.member(org_id, user_id))
    }

    async fn list_members(&self, org_id: Uuid) -> Result<Vec<Member>, CodesServiceError> {
        let store = self.inner.lock().unwrap();
        Ok(store
            .members
            .iter()
            .filter(|m| m.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn upsert_member(&self, member: &Member) -> Result<(), CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        match store
            .members
            .iter_mut()
            .find(|m| m.org_id == member.org_id && m.user_id == member.user_id)
        {
            Some(existing) => {
                existing.role = member.role;
                existing.status = member.status;
                existing.updated_at = member.updated_at;
            }
            None => store.members.push(member.clone()),
        }
        Ok(())
    }

    async fn set_member_status(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        status: MemberStatus,
    ) -> Result<bool, CodesServiceError> {
        let mut store = self.inner.lock().unwrap();
        match store
            .members
            .iter_mut()
            .find(|m| m.org_id == org_id && m.user_id == user_id)
        {
            Some(member) => {
                member.status = status;
                member.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
