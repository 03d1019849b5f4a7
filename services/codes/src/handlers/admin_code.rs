use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aiborn_auth_types::identity::IdentityHeaders;
use aiborn_domain::code::{CodeStatus, CodeType};
use aiborn_domain::pagination::PageRequest;

use crate::domain::types::{Code, CodeFilter, CodeStats};
use crate::error::CodesServiceError;
use crate::export::codes_to_csv;
use crate::state::AppState;
use crate::usecase::catalog::{
    ExpireCodesUseCase, ListCodesInput, ListCodesUseCase, RevokeCodeUseCase,
};
use crate::usecase::generate::{GenerateCodesInput, GenerateCodesUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    pub id: Uuid,
    pub code: String,
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub status: CodeStatus,
    pub description: Option<String>,
    pub max_redemptions: Option<u32>,
    pub redemption_count: u32,
    pub redemptions_remaining: Option<u32>,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms")]
    pub valid_from: DateTime<Utc>,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms_opt")]
    pub valid_until: Option<DateTime<Utc>>,
    pub org_id: Option<Uuid>,
    pub created_by: Uuid,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "aiborn_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Code> for CodeResponse {
    fn from(code: Code) -> Self {
        Self {
            redemptions_remaining: code.redemptions_remaining(),
            id: code.id,
            code: code.code,
            code_type: code.code_type,
            status: code.status,
            description: code.description,
            max_redemptions: code.max_redemptions,
            redemption_count: code.redemption_count,
            valid_from: code.valid_from,
            valid_until: code.valid_until,
            org_id: code.org_id,
            created_by: code.created_by,
            created_at: code.created_at,
            updated_at: code.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct GeneratedCodesResponse {
    pub codes: Vec<CodeResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: u64,
    pub active: u64,
    pub redeemed: u64,
    pub expired: u64,
    pub revoked: u64,
    pub total_redemptions: u64,
    pub redemption_rate: f64,
}

impl From<CodeStats> for StatsResponse {
    fn from(stats: CodeStats) -> Self {
        Self {
            total: stats.total(),
            active: stats.active,
            redeemed: stats.redeemed,
            expired: stats.expired,
            revoked: stats.revoked,
            total_redemptions: stats.total_redemptions,
            redemption_rate: stats.redemption_rate(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeListResponse {
    pub items: Vec<CodeResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsResponse>,
}

#[derive(Serialize)]
pub struct ExpireResponse {
    pub expired: u64,
}

// ── POST /admin/codes ────────────────────────────────────────────────────────

#[derive(Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodesRequest {
    pub count: u32,
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub description: Option<String>,
    pub max_redemptions: Option<u32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub org_id: Option<Uuid>,
    #[serde(default)]
    pub format: ExportFormat,
}

pub async fn generate_codes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<GenerateCodesRequest>,
) -> Result<Response, CodesServiceError> {
    let now = Utc::now();
    let usecase = GenerateCodesUseCase {
        codes: state.code_repo(),
        orgs: state.organization_repo(),
    };
    let codes = usecase
        .execute(GenerateCodesInput {
            count: body.count,
            code_type: body.code_type,
            description: body.description,
            max_redemptions: body.max_redemptions,
            valid_from: body.valid_from,
            valid_until: body.valid_until,
            org_id: body.org_id,
            actor: identity.into(),
            now,
        })
        .await?;

    let response = match body.format {
        ExportFormat::Json => (
            StatusCode::CREATED,
            Json(GeneratedCodesResponse {
                codes: codes.into_iter().map(CodeResponse::from).collect(),
            }),
        )
            .into_response(),
        ExportFormat::Csv => (
            StatusCode::CREATED,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"codes-{}.csv\"",
                        now.format("%Y%m%d%H%M%S")
                    ),
                ),
            ],
            codes_to_csv(&codes),
        )
            .into_response(),
    };
    Ok(response)
}

// ── GET /admin/codes ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CodeListQuery {
    #[serde(rename = "type")]
    pub code_type: Option<CodeType>,
    pub status: Option<CodeStatus>,
    pub org_id: Option<Uuid>,
    pub search: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub stats: Option<bool>,
}

pub async fn list_codes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<CodeListResponse>, CodesServiceError> {
    let query: CodeListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| CodesServiceError::InvalidRequest("malformed query string"))?
        .unwrap_or_default();

    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let usecase = ListCodesUseCase {
        codes: state.code_repo(),
        orgs: state.organization_repo(),
    };
    let listing = usecase
        .execute(ListCodesInput {
            filter: CodeFilter {
                code_type: query.code_type,
                status: query.status,
                org_id: query.org_id,
                search: query.search,
            },
            page,
            with_stats: query.stats.unwrap_or(false),
            actor: identity.into(),
        })
        .await?;

    Ok(Json(CodeListResponse {
        items: listing
            .page
            .items
            .into_iter()
            .map(CodeResponse::from)
            .collect(),
        total: listing.page.total,
        page: listing.page.page,
        per_page: listing.page.per_page,
        stats: listing.stats.map(StatsResponse::from),
    }))
}

// ── POST /admin/codes/{id}/revoke ────────────────────────────────────────────

pub async fn revoke_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CodesServiceError> {
    let usecase = RevokeCodeUseCase {
        codes: state.code_repo(),
        orgs: state.organization_repo(),
    };
    usecase.execute(id, identity.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /admin/codes/expire ─────────────────────────────────────────────────

pub async fn expire_codes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ExpireResponse>, CodesServiceError> {
    let usecase = ExpireCodesUseCase {
        codes: state.code_repo(),
    };
    let expired = usecase.execute(identity.into(), Utc::now()).await?;
    Ok(Json(ExpireResponse { expired }))
}
