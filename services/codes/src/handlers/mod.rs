pub mod admin_code;
pub mod code;
pub mod entitlement;
pub mod organization;

use aiborn_auth_types::identity::IdentityHeaders;

use crate::domain::types::Actor;

impl From<IdentityHeaders> for Actor {
    fn from(identity: IdentityHeaders) -> Self {
        Actor {
            user_id: identity.user_id,
            is_admin: identity.is_admin(),
        }
    }
}
