use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use aiborn_auth_types::identity::IdentityHeaders;
use aiborn_domain::code::CodeType;
use aiborn_domain::entitlement::EntitlementType;

use crate::domain::types::Code;
use crate::error::CodesServiceError;
use crate::state::AppState;
use crate::usecase::redeem::{RedeemCodeInput, RedeemCodeUseCase};
use crate::usecase::validate::ValidateCodeUseCase;

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSummary {
    #[serde(rename = "type")]
    pub code_type: CodeType,
    /// `null` for unlimited codes.
    pub redemptions_remaining: Option<u32>,
}

impl From<&Code> for CodeSummary {
    fn from(code: &Code) -> Self {
        Self {
            code_type: code.code_type,
            redemptions_remaining: code.redemptions_remaining(),
        }
    }
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub code: CodeSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub valid: bool,
    pub code: CodeSummary,
    pub entitlements: Vec<EntitlementType>,
    pub already_redeemed: bool,
}

/// Rate-limit key for anonymous callers: first `x-forwarded-for` hop.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .unwrap_or("anonymous")
        .to_owned()
}

/// An unreadable body is answered like an unreadable code.
fn code_body(
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<CodeRequest, CodesServiceError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected code request body");
        CodesServiceError::InvalidFormat
    })
}

// ── POST /codes/validate ─────────────────────────────────────────────────────

pub async fn validate_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, CodesServiceError> {
    state
        .validate_limit()
        .execute(&format!("validate:{}", client_key(&headers)))
        .await?;
    let body = code_body(payload)?;

    let usecase = ValidateCodeUseCase {
        codes: state.code_repo(),
    };
    let code = usecase.execute(&body.code, Utc::now()).await?;
    Ok(Json(ValidateResponse {
        valid: true,
        code: CodeSummary::from(&code),
    }))
}

// ── POST /codes/redeem ───────────────────────────────────────────────────────

pub async fn redeem_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<RedeemResponse>, CodesServiceError> {
    state
        .redeem_limit()
        .execute(&format!("redeem:{}", identity.user_id))
        .await?;
    let body = code_body(payload)?;

    let usecase = RedeemCodeUseCase {
        redemptions: state.redemption_repo(),
    };
    let redemption = usecase
        .execute(RedeemCodeInput {
            code: body.code,
            user_id: identity.user_id,
            now: Utc::now(),
        })
        .await?;
    Ok(Json(RedeemResponse {
        valid: true,
        code: CodeSummary::from(&redemption.code),
        entitlements: redemption.granted,
        already_redeemed: redemption.already_redeemed,
    }))
}
