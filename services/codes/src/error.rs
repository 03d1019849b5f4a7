use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Codes service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CodesServiceError {
    #[error("code must be 6 letters or digits")]
    InvalidFormat,
    #[error("code not found")]
    NotFound,
    #[error("code is no longer active")]
    NotActive,
    #[error("code is not valid yet")]
    NotYetValid,
    #[error("code has expired")]
    Expired,
    #[error("code redemption limit reached")]
    RedemptionLimitReached,
    #[error("code is busy, try again")]
    RedemptionContention,
    #[error("invalid entitlement type")]
    InvalidEntitlementType,
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error("organization not found")]
    OrganizationNotFound,
    #[error("member not found")]
    MemberNotFound,
    #[error("organization already exists")]
    OrganizationAlreadyExists,
    #[error("forbidden")]
    Forbidden,
    #[error("too many attempts")]
    TooManyAttempts,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CodesServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::NotFound => "NOT_FOUND",
            Self::NotActive => "NOT_ACTIVE",
            Self::NotYetValid => "NOT_YET_VALID",
            Self::Expired => "EXPIRED",
            Self::RedemptionLimitReached => "REDEMPTION_LIMIT_REACHED",
            Self::RedemptionContention => "REDEMPTION_CONTENTION",
            Self::InvalidEntitlementType => "INVALID_ENTITLEMENT_TYPE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            Self::MemberNotFound => "MEMBER_NOT_FOUND",
            Self::OrganizationAlreadyExists => "ORGANIZATION_ALREADY_EXISTS",
            Self::Forbidden => "FORBIDDEN",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error is a verdict on a presented code. Those are rendered in the
    /// `{ valid: false, error }` envelope the validate/redeem endpoints promise.
    pub fn is_code_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat
                | Self::NotFound
                | Self::NotActive
                | Self::NotYetValid
                | Self::Expired
                | Self::RedemptionLimitReached
                | Self::RedemptionContention
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidFormat | Self::InvalidEntitlementType | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound | Self::OrganizationNotFound | Self::MemberNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::NotActive
            | Self::RedemptionLimitReached
            | Self::RedemptionContention
            | Self::OrganizationAlreadyExists => StatusCode::CONFLICT,
            Self::Expired => StatusCode::GONE,
            Self::NotYetValid => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CodesServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client outcomes and already visible in the request trace.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = if self.is_code_rejection() {
            serde_json::json!({
                "valid": false,
                "error": self.to_string(),
                "kind": self.kind(),
            })
        } else {
            serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
            })
        };
        (status, axum::Json(body)).into_response()
    }
}
