use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use aiborn_domain::code::CodeStatus;
use aiborn_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{CodeRepository, OrganizationRepository};
use crate::domain::types::{Actor, Code, CodeFilter, CodeStats};
use crate::error::CodesServiceError;
use crate::usecase::access::authorize_code_admin;

pub struct ListCodesInput {
    pub filter: CodeFilter,
    pub page: PageRequest,
    pub with_stats: bool,
    pub actor: Actor,
}

#[derive(Debug)]
pub struct CodeListing {
    pub page: Page<Code>,
    pub stats: Option<CodeStats>,
}

pub struct ListCodesUseCase<C, O>
where
    C: CodeRepository,
    O: OrganizationRepository,
{
    pub codes: C,
    pub orgs: O,
}

impl<C, O> ListCodesUseCase<C, O>
where
    C: CodeRepository,
    O: OrganizationRepository,
{
    pub async fn execute(&self, input: ListCodesInput) -> Result<CodeListing, CodesServiceError> {
        authorize_code_admin(&self.orgs, &input.actor, input.filter.org_id).await?;

        let mut filter = input.filter;
        filter.search = filter
            .search
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        let page = self.codes.list(&filter, input.page.clamped()).await?;
        let stats = if input.with_stats {
            Some(self.codes.stats(&filter).await?)
        } else {
            None
        };
        Ok(CodeListing { page, stats })
    }
}

pub struct RevokeCodeUseCase<C, O>
where
    C: CodeRepository,
    O: OrganizationRepository,
{
    pub codes: C,
    pub orgs: O,
}

impl<C, O> RevokeCodeUseCase<C, O>
where
    C: CodeRepository,
    O: OrganizationRepository,
{
    pub async fn execute(&self, id: Uuid, actor: Actor) -> Result<(), CodesServiceError> {
        let code = self
            .codes
            .find_by_id(id)
            .await?
            .ok_or(CodesServiceError::NotFound)?;

        authorize_code_admin(&self.orgs, &actor, code.org_id).await?;

        if !code.status.can_transition_to(CodeStatus::Revoked) {
            return Err(CodesServiceError::NotActive);
        }
        // Lost a race with a redemption, sweep or another revoke.
        if !self
            .codes
            .transition_from_active(id, CodeStatus::Revoked)
            .await?
        {
            return Err(CodesServiceError::NotActive);
        }

        info!(code_id = %id, revoked_by = %actor.user_id, "code revoked");
        Ok(())
    }
}

pub struct ExpireCodesUseCase<C: CodeRepository> {
    pub codes: C,
}

impl<C: CodeRepository> ExpireCodesUseCase<C> {
    pub async fn execute(&self, actor: Actor, now: DateTime<Utc>) -> Result<u64, CodesServiceError> {
        if !actor.is_admin {
            return Err(CodesServiceError::Forbidden);
        }
        let expired = self.codes.expire_lapsed(now).await?;
        info!(expired, "expiry sweep finished");
        Ok(expired)
    }
}
