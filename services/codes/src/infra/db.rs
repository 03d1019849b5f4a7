use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
    TransactionError, TransactionTrait,
};
use uuid::Uuid;

use aiborn_codes_schema::{code_redemptions, codes, entitlements, organization_members, organizations};
use aiborn_domain::code::{CodeStatus, CodeType};
use aiborn_domain::entitlement::{EntitlementType, entitlements_for};
use aiborn_domain::member::{MemberRole, MemberStatus};
use aiborn_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    CodeRepository, EntitlementRepository, OrganizationRepository, RedemptionRepository,
};
use crate::domain::types::{
    Code, CodeFilter, CodeStats, Member, Organization, RedeemAttempt, Redemption,
};
use crate::error::CodesServiceError;

// ── Code repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
}

/// Escape `%`, `_` and `\` for a Postgres LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn filtered(filter: &CodeFilter) -> Select<codes::Entity> {
    let mut query = codes::Entity::find();
    if let Some(code_type) = filter.code_type {
        query = query.filter(codes::Column::CodeType.eq(code_type.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(codes::Column::Status.eq(status.as_str()));
    }
    if let Some(org_id) = filter.org_id {
        query = query.filter(codes::Column::OrgId.eq(org_id));
    }
    if let Some(search) = &filter.search {
        let escaped = escape_like(search);
        query = query.filter(
            Condition::any()
                .add(codes::Column::Code.like(format!("%{}%", escaped.to_uppercase())))
                .add(
                    Expr::expr(Func::lower(Expr::col(codes::Column::Description)))
                        .like(format!("%{}%", escaped.to_lowercase())),
                ),
        );
    }
    query
}

impl CodeRepository for DbCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Code>, CodesServiceError> {
        let model = codes::Entity::find()
            .filter(codes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find code by string")?;
        model.map(code_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Code>, CodesServiceError> {
        let model = codes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find code by id")?;
        model.map(code_from_model).transpose()
    }

    async fn find_taken(&self, candidates: &[String]) -> Result<Vec<String>, CodesServiceError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let taken = codes::Entity::find()
            .select_only()
            .column(codes::Column::Code)
            .filter(codes::Column::Code.is_in(candidates.iter().cloned()))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .context("find taken codes")?;
        Ok(taken)
    }

    async fn create_many(&self, batch: &[Code]) -> Result<(), CodesServiceError> {
        if batch.is_empty() {
            return Ok(());
        }
        let rows = batch
            .iter()
            .map(|code| -> Result<codes::ActiveModel, CodesServiceError> {
                Ok(codes::ActiveModel {
                    id: Set(code.id),
                    code: Set(code.code.clone()),
                    code_type: Set(code.code_type.as_str().to_owned()),
                    status: Set(code.status.as_str().to_owned()),
                    description: Set(code.description.clone()),
                    max_redemptions: Set(code.max_redemptions.map(count_column).transpose()?),
                    redemption_count: Set(count_column(code.redemption_count)?),
                    valid_from: Set(code.valid_from),
                    valid_until: Set(code.valid_until),
                    org_id: Set(code.org_id),
                    created_by: Set(code.created_by),
                    created_at: Set(code.created_at),
                    updated_at: Set(code.updated_at),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        codes::Entity::insert_many(rows)
            .exec_without_returning(&self.db)
            .await
            .context("insert generated codes")?;
        Ok(())
    }

    async fn list(
        &self,
        filter: &CodeFilter,
        page: PageRequest,
    ) -> Result<Page<Code>, CodesServiceError> {
        let page = page.clamped();
        let total = filtered(filter)
            .count(&self.db)
            .await
            .context("count codes")?;
        let models = filtered(filter)
            .order_by_desc(codes::Column::CreatedAt)
            .order_by_desc(codes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list codes")?;
        let items = models
            .into_iter()
            .map(code_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn stats(&self, filter: &CodeFilter) -> Result<CodeStats, CodesServiceError> {
        #[derive(Debug, FromQueryResult)]
        struct StatusRow {
            status: String,
            codes: i64,
            redemptions: Option<i64>,
            used: i64,
        }

        let rows = filtered(filter)
            .select_only()
            .column(codes::Column::Status)
            .column_as(Expr::col(codes::Column::Id).count(), "codes")
            .column_as(Expr::col(codes::Column::RedemptionCount).sum(), "redemptions")
            .column_as(
                Expr::cust("COUNT(*) FILTER (WHERE redemption_count > 0)"),
                "used",
            )
            .group_by(codes::Column::Status)
            .into_model::<StatusRow>()
            .all(&self.db)
            .await
            .context("aggregate code stats")?;

        let mut stats = CodeStats::default();
        for row in rows {
            let status = row.status.parse::<CodeStatus>().context("code status column")?;
            stats.add_status(status, row.codes as u64);
            stats.total_redemptions += row.redemptions.unwrap_or(0) as u64;
            stats.used_codes += row.used as u64;
        }
        Ok(stats)
    }

    async fn transition_from_active(
        &self,
        id: Uuid,
        to: CodeStatus,
    ) -> Result<bool, CodesServiceError> {
        let result = codes::Entity::update_many()
            .col_expr(codes::Column::Status, Expr::value(to.as_str()))
            .col_expr(codes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(codes::Column::Id.eq(id))
            .filter(codes::Column::Status.eq(CodeStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .context("transition code status")?;
        Ok(result.rows_affected > 0)
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<u64, CodesServiceError> {
        let result = codes::Entity::update_many()
            .col_expr(codes::Column::Status, Expr::value(CodeStatus::Expired.as_str()))
            .col_expr(codes::Column::UpdatedAt, Expr::value(now))
            .filter(codes::Column::Status.eq(CodeStatus::Active.as_str()))
            .filter(codes::Column::ValidUntil.lt(now))
            .exec(&self.db)
            .await
            .context("expire lapsed codes")?;
        Ok(result.rows_affected)
    }
}

/// Narrow a count to the `INTEGER` column type.
fn count_column(value: u32) -> Result<i32, CodesServiceError> {
    Ok(i32::try_from(value).context("count exceeds integer column")?)
}

fn code_from_model(model: codes::Model) -> Result<Code, CodesServiceError> {
    Ok(Code {
        id: model.id,
        code_type: model.code_type.parse::<CodeType>().context("code type column")?,
        status: model.status.parse::<CodeStatus>().context("code status column")?,
        code: model.code,
        description: model.description,
        max_redemptions: model.max_redemptions.map(|max| max.max(0) as u32),
        redemption_count: model.redemption_count.max(0) as u32,
        valid_from: model.valid_from,
        valid_until: model.valid_until,
        org_id: model.org_id,
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Redemption repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRedemptionRepository {
    pub db: DatabaseConnection,
}

impl RedemptionRepository for DbRedemptionRepository {
    async fn try_redeem(
        &self,
        code: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemAttempt, CodesServiceError> {
        // Every early return drops `txn`, which rolls it back.
        let txn = self.db.begin().await.context("begin redemption")?;

        let model = codes::Entity::find()
            .filter(codes::Column::Code.eq(code))
            .one(&txn)
            .await
            .context("read code for redemption")?
            .ok_or(CodesServiceError::NotFound)?;
        let current = code_from_model(model)?;
        let granted = entitlements_for(current.code_type).to_vec();

        let prior = code_redemptions::Entity::find_by_id((current.id, user_id))
            .one(&txn)
            .await
            .context("read redemption ledger")?;
        if prior.is_some() {
            return Ok(RedeemAttempt::Done(Redemption {
                code: current,
                granted,
                already_redeemed: true,
            }));
        }

        current.check_redeemable(now)?;
        let next = current.redeemed_once(now);
        let current_count = count_column(current.redemption_count)?;
        let next_count = count_column(next.redemption_count)?;

        let swapped = codes::Entity::update_many()
            .col_expr(
                codes::Column::RedemptionCount,
                Expr::value(next_count),
            )
            .col_expr(codes::Column::Status, Expr::value(next.status.as_str()))
            .col_expr(codes::Column::UpdatedAt, Expr::value(now))
            .filter(codes::Column::Id.eq(current.id))
            .filter(codes::Column::RedemptionCount.eq(current_count))
            .filter(codes::Column::Status.eq(CodeStatus::Active.as_str()))
            .exec(&txn)
            .await
            .context("compare-and-swap redemption count")?;
        if swapped.rows_affected == 0 {
            return Ok(RedeemAttempt::Conflict);
        }

        code_redemptions::Entity::insert(code_redemptions::ActiveModel {
            code_id: Set(current.id),
            user_id: Set(user_id),
            redeemed_at: Set(now),
        })
        .exec_without_returning(&txn)
        .await
        .context("record redemption")?;

        let grants = granted.iter().map(|entitlement| entitlements::ActiveModel {
            user_id: Set(user_id),
            entitlement_type: Set(entitlement.as_str().to_owned()),
            granted_by: Set(Some(current.id)),
            created_at: Set(now),
        });
        entitlements::Entity::insert_many(grants)
            .on_conflict(
                OnConflict::columns([
                    entitlements::Column::UserId,
                    entitlements::Column::EntitlementType,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("grant entitlements")?;

        txn.commit().await.context("commit redemption")?;

        Ok(RedeemAttempt::Done(Redemption {
            code: next,
            granted,
            already_redeemed: false,
        }))
    }
}

// ── Entitlement repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEntitlementRepository {
    pub db: DatabaseConnection,
}

impl EntitlementRepository for DbEntitlementRepository {
    async fn has(
        &self,
        user_id: Uuid,
        entitlement: EntitlementType,
    ) -> Result<bool, CodesServiceError> {
        let count = entitlements::Entity::find()
            .filter(entitlements::Column::UserId.eq(user_id))
            .filter(entitlements::Column::EntitlementType.eq(entitlement.as_str()))
            .count(&self.db)
            .await
            .context("check entitlement")?;
        Ok(count > 0)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EntitlementType>, CodesServiceError> {
        let names = entitlements::Entity::find()
            .select_only()
            .column(entitlements::Column::EntitlementType)
            .filter(entitlements::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .context("list entitlements")?;
        let held = names
            .iter()
            .map(|name| name.parse::<EntitlementType>().context("entitlement type column"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(held)
    }
}

// ── Organization repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrganizationRepository {
    pub db: DatabaseConnection,
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn member_active_model(member: &Member) -> organization_members::ActiveModel {
    organization_members::ActiveModel {
        org_id: Set(member.org_id),
        user_id: Set(member.user_id),
        role: Set(member.role.as_str().to_owned()),
        status: Set(member.status.as_str().to_owned()),
        created_at: Set(member.created_at),
        updated_at: Set(member.updated_at),
    }
}

impl OrganizationRepository for DbOrganizationRepository {
    async fn create_with_owner(
        &self,
        org: &Organization,
        owner: &Member,
    ) -> Result<(), CodesServiceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let org = org.clone();
                let owner = member_active_model(owner);
                Box::pin(async move {
                    organizations::Entity::insert(organizations::ActiveModel {
                        id: Set(org.id),
                        name: Set(org.name),
                        slug: Set(org.slug),
                        created_at: Set(org.created_at),
                    })
                    .exec_without_returning(txn)
                    .await?;
                    organization_members::Entity::insert(owner)
                        .exec_without_returning(txn)
                        .await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(CodesServiceError::OrganizationAlreadyExists)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("create organization with owner")
                .into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, CodesServiceError> {
        let model = organizations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find organization by id")?;
        Ok(model.map(|m| Organization {
            id: m.id,
            name: m.name,
            slug: m.slug,
            created_at: m.created_at,
        }))
    }

    async fn find_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, CodesServiceError> {
        let model = organization_members::Entity::find_by_id((org_id, user_id))
            .one(&self.db)
            .await
            .context("find organization member")?;
        model.map(member_from_model).transpose()
    }

    async fn list_members(&self, org_id: Uuid) -> Result<Vec<Member>, CodesServiceError> {
        let models = organization_members::Entity::find()
            .filter(organization_members::Column::OrgId.eq(org_id))
            .order_by_asc(organization_members::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list organization members")?;
        models.into_iter().map(member_from_model).collect()
    }

    async fn upsert_member(&self, member: &Member) -> Result<(), CodesServiceError> {
        organization_members::Entity::insert(member_active_model(member))
            .on_conflict(
                OnConflict::columns([
                    organization_members::Column::OrgId,
                    organization_members::Column::UserId,
                ])
                .update_columns([
                    organization_members::Column::Role,
                    organization_members::Column::Status,
                    organization_members::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert organization member")?;
        Ok(())
    }

    async fn set_member_status(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        status: MemberStatus,
    ) -> Result<bool, CodesServiceError> {
        let result = organization_members::Entity::update_many()
            .col_expr(organization_members::Column::Status, Expr::value(status.as_str()))
            .col_expr(organization_members::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(organization_members::Column::OrgId.eq(org_id))
            .filter(organization_members::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("set organization member status")?;
        Ok(result.rows_affected > 0)
    }
}

fn member_from_model(model: organization_members::Model) -> Result<Member, CodesServiceError> {
    Ok(Member {
        org_id: model.org_id,
        user_id: model.user_id,
        role: model.role.parse::<MemberRole>().context("member role column")?,
        status: model.status.parse::<MemberStatus>().context("member status column")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
