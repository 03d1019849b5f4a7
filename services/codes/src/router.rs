use axum::{
    Router,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;

use aiborn_core::health::{healthz, readyz};
use aiborn_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    admin_code::{expire_codes, generate_codes, list_codes, revoke_code},
    code::{redeem_code, validate_code},
    entitlement::{check_my_entitlement, list_my_entitlements},
    organization::{add_member, create_organization, list_members, remove_member},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Codes
        .route("/codes/validate", post(validate_code))
        .route("/codes/redeem", post(redeem_code))
        // Entitlements
        .route("/entitlements/@me", get(list_my_entitlements))
        .route("/entitlements/@me/{type}", get(check_my_entitlement))
        // Admin codes
        .route("/admin/codes", post(generate_codes).get(list_codes))
        .route("/admin/codes/expire", post(expire_codes))
        .route("/admin/codes/{id}/revoke", post(revoke_code))
        // Organizations
        .route("/orgs", post(create_organization))
        .route(
            "/orgs/{org_id}/members",
            get(list_members).post(add_member),
        )
        .route("/orgs/{org_id}/members/{user_id}", delete(remove_member))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
