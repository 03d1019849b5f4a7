use uuid::Uuid;

use aiborn_domain::entitlement::EntitlementType;

use crate::domain::repository::EntitlementRepository;
use crate::error::CodesServiceError;

// ── CheckEntitlement ─────────────────────────────────────────────────────────

pub struct CheckEntitlementUseCase<R: EntitlementRepository> {
    pub entitlements: R,
}

impl<R: EntitlementRepository> CheckEntitlementUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        entitlement: EntitlementType,
    ) -> Result<bool, CodesServiceError> {
        self.entitlements.has(user_id, entitlement).await
    }
}

// ── ListEntitlements ─────────────────────────────────────────────────────────

pub struct ListEntitlementsUseCase<R: EntitlementRepository> {
    pub entitlements: R,
}

impl<R: EntitlementRepository> ListEntitlementsUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<EntitlementType>, CodesServiceError> {
        let mut held = self.entitlements.list_by_user(user_id).await?;
        held.sort();
        held.dedup();
        Ok(held)
    }
}
