use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use aiborn_domain::code::normalize_code;

use crate::domain::repository::RedemptionRepository;
use crate::domain::types::{MAX_REDEEM_ATTEMPTS, RedeemAttempt, Redemption};
use crate::error::CodesServiceError;

pub struct RedeemCodeInput {
    pub code: String,
    pub user_id: Uuid,
    pub now: DateTime<Utc>,
}

pub struct RedeemCodeUseCase<R: RedemptionRepository> {
    pub redemptions: R,
}

impl<R: RedemptionRepository> RedeemCodeUseCase<R> {
    /// Redeem a code for a user, granting its entitlements.
    ///
    /// Each attempt re-validates inside its own transaction. A lost compare-and-swap
    /// re-reads the code, so a limited code whose last slot went to someone else fails
    /// with `RedemptionLimitReached`; only codes with slots left are attempted again.
    pub async fn execute(&self, input: RedeemCodeInput) -> Result<Redemption, CodesServiceError> {
        let normalized = normalize_code(&input.code).map_err(|_| CodesServiceError::InvalidFormat)?;

        for attempt in 1..=MAX_REDEEM_ATTEMPTS {
            match self
                .redemptions
                .try_redeem(&normalized, input.user_id, input.now)
                .await?
            {
                RedeemAttempt::Done(redemption) => {
                    if redemption.already_redeemed {
                        debug!(code_id = %redemption.code.id, user_id = %input.user_id, "code already redeemed by user");
                    } else {
                        info!(
                            code_id = %redemption.code.id,
                            user_id = %input.user_id,
                            code_type = %redemption.code.code_type,
                            status = %redemption.code.status,
                            "code redeemed"
                        );
                    }
                    return Ok(redemption);
                }
                RedeemAttempt::Conflict => {
                    debug!(attempt, user_id = %input.user_id, "redemption lost compare-and-swap");
                }
            }
        }
        Err(CodesServiceError::RedemptionContention)
    }
}
