use uuid::Uuid;

use crate::domain::repository::OrganizationRepository;
use crate::domain::types::{Actor, Member};
use crate::error::CodesServiceError;

/// Allow `actor` to manage codes scoped to `org_id` (`None` = site-wide codes).
///
/// Site admins manage everything; anyone else needs an active OWNER or ADMIN
/// membership in the organization, and never gets site-wide codes.
pub async fn authorize_code_admin<O: OrganizationRepository>(
    orgs: &O,
    actor: &Actor,
    org_id: Option<Uuid>,
) -> Result<(), CodesServiceError> {
    if actor.is_admin {
        if let Some(org_id) = org_id {
            orgs.find_by_id(org_id)
                .await?
                .ok_or(CodesServiceError::OrganizationNotFound)?;
        }
        return Ok(());
    }
    let org_id = org_id.ok_or(CodesServiceError::Forbidden)?;
    require_manager(orgs, actor, org_id).await.map(|_| ())
}

/// The actor's membership if it may manage `org_id`'s members and codes.
/// Site admins pass without a membership (`None`).
pub async fn require_manager<O: OrganizationRepository>(
    orgs: &O,
    actor: &Actor,
    org_id: Uuid,
) -> Result<Option<Member>, CodesServiceError> {
    let membership = orgs.find_member(org_id, actor.user_id).await?;
    match membership {
        Some(m) if m.can_manage() => Ok(Some(m)),
        _ if actor.is_admin => Ok(None),
        _ => Err(CodesServiceError::Forbidden),
    }
}
