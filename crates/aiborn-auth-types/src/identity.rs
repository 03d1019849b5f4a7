//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use aiborn_domain::user::UserRole;

pub const X_AIBORN_USER_ID: &str = "x-aiborn-user-id";
pub const X_AIBORN_USER_ROLE: &str = "x-aiborn-user-role";

/// Caller identity injected by the gateway via `x-aiborn-user-id` and `x-aiborn-user-role`.
///
/// Extraction fails with 401 `UNAUTHENTICATED` if either header is absent or malformed.
/// Role enforcement (403) is done by use cases after extraction.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

impl IdentityHeaders {
    pub fn is_admin(&self) -> bool {
        self.user_role >= UserRole::Admin
    }
}

/// Rejection for a request without a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unauthenticated")]
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHENTICATED",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    // Header values are read synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = header_str(parts, X_AIBORN_USER_ID).and_then(|s| s.parse::<Uuid>().ok());
        let user_role = header_str(parts, X_AIBORN_USER_ROLE)
            .and_then(|s| s.parse::<u8>().ok())
            .map(UserRole::from_u8);

        async move {
            let user_id = user_id.ok_or(Unauthenticated)?;
            let user_role = user_role.ok_or(Unauthenticated)?;
            Ok(Self { user_id, user_role })
        }
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}
