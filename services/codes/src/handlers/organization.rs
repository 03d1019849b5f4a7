use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aiborn_auth_types::identity::IdentityHeaders;
use aiborn_domain::member::{MemberRole, MemberStatus};

use crate::domain::types::{AddMemberOutcome, Member};
use crate::error::CodesServiceError;
use crate::state::AppState;
use crate::usecase::organization::{
    AddMemberInput, AddMemberUseCase, CreateOrganizationInput, CreateOrganizationUseCase,
    ListMembersUseCase, RemoveMemberUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub status: MemberStatus,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            org_id: member.org_id,
            user_id: member.user_id,
            role: member.role,
            status: member.status,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub already_member: bool,
}

// ── POST /orgs ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub slug: String,
}

pub async fn create_organization(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationResponse>), CodesServiceError> {
    let usecase = CreateOrganizationUseCase {
        orgs: state.organization_repo(),
    };
    let org = usecase
        .execute(CreateOrganizationInput {
            name: body.name,
            slug: body.slug,
            actor: identity.into(),
            now: Utc::now(),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(OrganizationResponse {
            id: org.id,
            name: org.name,
            slug: org.slug,
            created_at: org.created_at,
        }),
    ))
}

// ── GET /orgs/{org_id}/members ───────────────────────────────────────────────

pub async fn list_members(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<MemberResponse>>, CodesServiceError> {
    let usecase = ListMembersUseCase {
        orgs: state.organization_repo(),
    };
    let members = usecase.execute(org_id, identity.into()).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

// ── POST /orgs/{org_id}/members ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: MemberRole,
}

pub async fn add_member(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<AddMemberResponse>), CodesServiceError> {
    let usecase = AddMemberUseCase {
        orgs: state.organization_repo(),
    };
    let (member, outcome) = usecase
        .execute(AddMemberInput {
            org_id,
            user_id: body.user_id,
            role: body.role,
            actor: identity.into(),
            now: Utc::now(),
        })
        .await?;

    let (status, already_member) = match outcome {
        AddMemberOutcome::AlreadyMember => (StatusCode::OK, true),
        AddMemberOutcome::Added | AddMemberOutcome::Reactivated => (StatusCode::CREATED, false),
    };
    Ok((
        status,
        Json(AddMemberResponse {
            member: member.into(),
            already_member,
        }),
    ))
}

// ── DELETE /orgs/{org_id}/members/{user_id} ──────────────────────────────────

pub async fn remove_member(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((org_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, CodesServiceError> {
    let usecase = RemoveMemberUseCase {
        orgs: state.organization_repo(),
    };
    usecase.execute(org_id, user_id, identity.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}
