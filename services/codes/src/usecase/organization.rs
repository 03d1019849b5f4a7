use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use aiborn_domain::member::{MemberRole, MemberStatus};

use crate::domain::repository::OrganizationRepository;
use crate::domain::types::{Actor, AddMemberOutcome, Member, Organization, validate_slug};
use crate::error::CodesServiceError;
use crate::usecase::access::require_manager;

pub struct CreateOrganizationInput {
    pub name: String,
    pub slug: String,
    pub actor: Actor,
    pub now: DateTime<Utc>,
}

pub struct CreateOrganizationUseCase<O: OrganizationRepository> {
    pub orgs: O,
}

impl<O: OrganizationRepository> CreateOrganizationUseCase<O> {
    pub async fn execute(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<Organization, CodesServiceError> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > 120 {
            return Err(CodesServiceError::InvalidRequest(
                "name must be 1 to 120 characters",
            ));
        }
        if !validate_slug(&input.slug) {
            return Err(CodesServiceError::InvalidRequest(
                "slug must be 3 to 48 lowercase letters, digits or inner hyphens",
            ));
        }

        let org = Organization {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            slug: input.slug,
            created_at: input.now,
        };
        let owner = Member {
            org_id: org.id,
            user_id: input.actor.user_id,
            role: MemberRole::Owner,
            status: MemberStatus::Active,
            created_at: input.now,
            updated_at: input.now,
        };
        self.orgs.create_with_owner(&org, &owner).await?;

        info!(org_id = %org.id, slug = %org.slug, owner = %owner.user_id, "organization created");
        Ok(org)
    }
}

async fn existing_org<O: OrganizationRepository>(
    orgs: &O,
    org_id: Uuid,
) -> Result<Organization, CodesServiceError> {
    orgs.find_by_id(org_id)
        .await?
        .ok_or(CodesServiceError::OrganizationNotFound)
}

pub struct ListMembersUseCase<O: OrganizationRepository> {
    pub orgs: O,
}

impl<O: OrganizationRepository> ListMembersUseCase<O> {
    /// Active members of the organization, visible to its active members and site admins.
    pub async fn execute(&self, org_id: Uuid, actor: Actor) -> Result<Vec<Member>, CodesServiceError> {
        existing_org(&self.orgs, org_id).await?;

        if !actor.is_admin {
            let membership = self.orgs.find_member(org_id, actor.user_id).await?;
            if !membership.is_some_and(|m| m.is_active()) {
                return Err(CodesServiceError::Forbidden);
            }
        }

        let mut members: Vec<Member> = self
            .orgs
            .list_members(org_id)
            .await?
            .into_iter()
            .filter(Member::is_active)
            .collect();
        members.sort_by_key(|m| m.created_at);
        Ok(members)
    }
}

pub struct AddMemberInput {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub actor: Actor,
    pub now: DateTime<Utc>,
}

pub struct AddMemberUseCase<O: OrganizationRepository> {
    pub orgs: O,
}

impl<O: OrganizationRepository> AddMemberUseCase<O> {
    pub async fn execute(
        &self,
        input: AddMemberInput,
    ) -> Result<(Member, AddMemberOutcome), CodesServiceError> {
        if input.role == MemberRole::Owner {
            return Err(CodesServiceError::InvalidRequest(
                "role must be ADMIN or MEMBER",
            ));
        }
        existing_org(&self.orgs, input.org_id).await?;
        require_manager(&self.orgs, &input.actor, input.org_id).await?;

        let (member, outcome) = match self.orgs.find_member(input.org_id, input.user_id).await? {
            Some(existing) if existing.is_active() => {
                return Ok((existing, AddMemberOutcome::AlreadyMember));
            }
            Some(removed) => (
                Member {
                    role: input.role,
                    status: MemberStatus::Active,
                    updated_at: input.now,
                    ..removed
                },
                AddMemberOutcome::Reactivated,
            ),
            None => (
                Member {
                    org_id: input.org_id,
                    user_id: input.user_id,
                    role: input.role,
                    status: MemberStatus::Active,
                    created_at: input.now,
                    updated_at: input.now,
                },
                AddMemberOutcome::Added,
            ),
        };
        self.orgs.upsert_member(&member).await?;

        info!(
            org_id = %member.org_id,
            user_id = %member.user_id,
            role = %member.role,
            outcome = ?outcome,
            added_by = %input.actor.user_id,
            "member added"
        );
        Ok((member, outcome))
    }
}

pub struct RemoveMemberUseCase<O: OrganizationRepository> {
    pub orgs: O,
}

impl<O: OrganizationRepository> RemoveMemberUseCase<O> {
    pub async fn execute(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        actor: Actor,
    ) -> Result<(), CodesServiceError> {
        existing_org(&self.orgs, org_id).await?;
        require_manager(&self.orgs, &actor, org_id).await?;

        let target = self
            .orgs
            .find_member(org_id, user_id)
            .await?
            .filter(Member::is_active)
            .ok_or(CodesServiceError::MemberNotFound)?;
        if target.role == MemberRole::Owner {
            return Err(CodesServiceError::Forbidden);
        }

        if !self
            .orgs
            .set_member_status(org_id, user_id, MemberStatus::Removed)
            .await?
        {
            return Err(CodesServiceError::MemberNotFound);
        }

        info!(%org_id, %user_id, removed_by = %actor.user_id, "member removed");
        Ok(())
    }
}
