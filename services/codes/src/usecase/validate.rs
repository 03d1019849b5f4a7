use chrono::{DateTime, Utc};

use aiborn_domain::code::normalize_code;

use crate::domain::repository::CodeRepository;
use crate::domain::types::Code;
use crate::error::CodesServiceError;

// ── ValidateCode ─────────────────────────────────────────────────────────────

pub struct ValidateCodeUseCase<R: CodeRepository> {
    pub codes: R,
}

impl<R: CodeRepository> ValidateCodeUseCase<R> {
    /// Check that `raw` names a code redeemable at `now`. Read-only.
    pub async fn execute(&self, raw: &str, now: DateTime<Utc>) -> Result<Code, CodesServiceError> {
        let normalized = normalize_code(raw).map_err(|_| CodesServiceError::InvalidFormat)?;
        let code = self
            .codes
            .find_by_code(&normalized)
            .await?
            .ok_or(CodesServiceError::NotFound)?;
        code.check_redeemable(now)?;
        Ok(code)
    }
}
