use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use aiborn_domain::code::{CODE_LEN, CodeStatus, CodeType};

use crate::domain::repository::{CodeRepository, OrganizationRepository};
use crate::domain::types::{
    Actor, CODE_ALPHABET, Code, MAX_GENERATE_COUNT, MAX_GENERATE_ROUNDS, MAX_REDEMPTIONS_LIMIT,
};
use crate::error::CodesServiceError;
use crate::usecase::access::authorize_code_admin;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Add fresh random codes to `pool` until it holds `target` distinct entries.
fn fill_candidates(pool: &mut HashSet<String>, target: usize) {
    while pool.len() < target {
        pool.insert(generate_code());
    }
}

pub struct GenerateCodesInput {
    pub count: u32,
    pub code_type: CodeType,
    pub description: Option<String>,
    pub max_redemptions: Option<u32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub org_id: Option<Uuid>,
    pub actor: Actor,
    pub now: DateTime<Utc>,
}

pub struct GenerateCodesUseCase<C, O>
where
    C: CodeRepository,
    O: OrganizationRepository,
{
    pub codes: C,
    pub orgs: O,
}

impl<C, O> GenerateCodesUseCase<C, O>
where
    C: CodeRepository,
    O: OrganizationRepository,
{
    pub async fn execute(&self, input: GenerateCodesInput) -> Result<Vec<Code>, CodesServiceError> {
        // 1. Reject malformed batches before touching storage
        if !(1..=MAX_GENERATE_COUNT).contains(&input.count) {
            return Err(CodesServiceError::InvalidRequest(
                "count must be between 1 and 1000",
            ));
        }
        if input
            .max_redemptions
            .is_some_and(|max| !(1..=MAX_REDEMPTIONS_LIMIT).contains(&max))
        {
            return Err(CodesServiceError::InvalidRequest(
                "maxRedemptions must be between 1 and 2147483647",
            ));
        }
        let valid_from = input.valid_from.unwrap_or(input.now);
        if input.valid_until.is_some_and(|until| until <= valid_from) {
            return Err(CodesServiceError::InvalidRequest(
                "validUntil must be after validFrom",
            ));
        }
        let description = input
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        // 2. Site admin, or manager of the target organization
        authorize_code_admin(&self.orgs, &input.actor, input.org_id).await?;

        // 3. Draw distinct codes, re-rolling any that are already stored
        let target = input.count as usize;
        let mut pool = HashSet::with_capacity(target);
        let mut settled = false;
        for _ in 0..MAX_GENERATE_ROUNDS {
            fill_candidates(&mut pool, target);
            let candidates: Vec<String> = pool.iter().cloned().collect();
            let taken = self.codes.find_taken(&candidates).await?;
            if taken.is_empty() {
                settled = true;
                break;
            }
            for code in &taken {
                pool.remove(code);
            }
        }
        if !settled {
            return Err(CodesServiceError::Internal(anyhow::anyhow!(
                "could not draw {target} unused codes"
            )));
        }

        // 4. Persist the batch
        let mut strings: Vec<String> = pool.into_iter().collect();
        strings.sort();
        let codes: Vec<Code> = strings
            .into_iter()
            .map(|code| Code {
                id: Uuid::now_v7(),
                code,
                code_type: input.code_type,
                status: CodeStatus::Active,
                description: description.clone(),
                max_redemptions: input.max_redemptions,
                redemption_count: 0,
                valid_from,
                valid_until: input.valid_until,
                org_id: input.org_id,
                created_by: input.actor.user_id,
                created_at: input.now,
                updated_at: input.now,
            })
            .collect();
        self.codes.create_many(&codes).await?;

        info!(
            count = codes.len(),
            code_type = %input.code_type,
            org_id = ?input.org_id,
            created_by = %input.actor.user_id,
            "generated codes"
        );
        Ok(codes)
    }
}
