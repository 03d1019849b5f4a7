use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use aiborn_auth_types::identity::IdentityHeaders;
use aiborn_domain::entitlement::EntitlementType;

use crate::error::CodesServiceError;
use crate::state::AppState;
use crate::usecase::entitlement::{CheckEntitlementUseCase, ListEntitlementsUseCase};

#[derive(Serialize)]
pub struct EntitlementsResponse {
    pub entitlements: Vec<EntitlementType>,
}

#[derive(Serialize)]
pub struct EntitlementCheckResponse {
    #[serde(rename = "type")]
    pub entitlement_type: EntitlementType,
    pub granted: bool,
}

// ── GET /entitlements/@me ────────────────────────────────────────────────────

pub async fn list_my_entitlements(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<EntitlementsResponse>, CodesServiceError> {
    let usecase = ListEntitlementsUseCase {
        entitlements: state.entitlement_repo(),
    };
    let entitlements = usecase.execute(identity.user_id).await?;
    Ok(Json(EntitlementsResponse { entitlements }))
}

// ── GET /entitlements/@me/{type} ─────────────────────────────────────────────

pub async fn check_my_entitlement(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
) -> Result<Json<EntitlementCheckResponse>, CodesServiceError> {
    let entitlement_type: EntitlementType = raw_type
        .parse()
        .map_err(|_| CodesServiceError::InvalidEntitlementType)?;

    let usecase = CheckEntitlementUseCase {
        entitlements: state.entitlement_repo(),
    };
    let granted = usecase.execute(identity.user_id, entitlement_type).await?;
    Ok(Json(EntitlementCheckResponse {
        entitlement_type,
        granted,
    }))
}
