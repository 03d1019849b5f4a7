use sea_orm::entity::prelude::*;

/// Redeemable VIP code. Never deleted; only its status moves forward from ACTIVE.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub code_type: String,
    pub status: String,
    pub description: Option<String>,
    pub max_redemptions: Option<i32>,
    pub redemption_count: i32,
    pub valid_from: chrono::DateTime<chrono::Utc>,
    pub valid_until: Option<chrono::DateTime<chrono::Utc>>,
    pub org_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrgId",
        to = "super::organizations::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::code_redemptions::Entity")]
    CodeRedemptions,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::code_redemptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CodeRedemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
