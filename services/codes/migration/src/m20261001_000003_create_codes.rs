use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Codes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Codes::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Codes::Code)
                            .string_len(6)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Codes::CodeType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Codes::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(Codes::Description).text())
                    .col(ColumnDef::new(Codes::MaxRedemptions).integer())
                    .col(
                        ColumnDef::new(Codes::RedemptionCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Codes::ValidFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Codes::ValidUntil).timestamp_with_time_zone())
                    .col(ColumnDef::new(Codes::OrgId).uuid())
                    .col(ColumnDef::new(Codes::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Codes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Codes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // redemption_count <= max_redemptions
                    .check(Expr::cust(
                        "max_redemptions IS NULL OR redemption_count <= max_redemptions",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Codes::Table, Codes::OrgId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::OrgId)
                    .name("idx_codes_org_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::Status)
                    .col(Codes::ValidUntil)
                    .name("idx_codes_status_valid_until")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Codes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Codes {
    Table,
    Id,
    Code,
    CodeType,
    Status,
    Description,
    MaxRedemptions,
    RedemptionCount,
    ValidFrom,
    ValidUntil,
    OrgId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Organizations {
    Table,
    Id,
}
