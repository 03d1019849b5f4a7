//! Mock identity helpers for HTTP tests.
//!
//! Services behind the gateway receive `x-aiborn-user-id` + `x-aiborn-user-role`
//! headers. `MockAuth` produces those headers directly so no gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use aiborn_auth_types::identity::{X_AIBORN_USER_ID, X_AIBORN_USER_ROLE};
use aiborn_domain::user::UserRole;

/// Identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn reader() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Reader)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Admin)
    }

    /// Headers as the gateway would inject them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_AIBORN_USER_ID),
            HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
        );
        map.insert(
            HeaderName::from_static(X_AIBORN_USER_ROLE),
            HeaderValue::from(u16::from(self.user_role.as_u8())),
        );
        map
    }
}
