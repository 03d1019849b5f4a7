use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CodeRedemptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CodeRedemptions::CodeId).uuid().not_null())
                    .col(ColumnDef::new(CodeRedemptions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CodeRedemptions::RedeemedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(CodeRedemptions::CodeId)
                            .col(CodeRedemptions::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CodeRedemptions::Table, CodeRedemptions::CodeId)
                            .to(Codes::Table, Codes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CodeRedemptions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CodeRedemptions {
    Table,
    CodeId,
    UserId,
    RedeemedAt,
}

#[derive(Iden)]
enum Codes {
    Table,
    Id,
}
