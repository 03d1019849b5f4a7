use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entitlements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entitlements::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Entitlements::EntitlementType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entitlements::GrantedBy).uuid())
                    .col(
                        ColumnDef::new(Entitlements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Entitlements::UserId)
                            .col(Entitlements::EntitlementType),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Entitlements::Table, Entitlements::GrantedBy)
                            .to(Codes::Table, Codes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entitlements::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Entitlements {
    Table,
    UserId,
    EntitlementType,
    GrantedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Codes {
    Table,
    Id,
}
