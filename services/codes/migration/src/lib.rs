use sea_orm_migration::prelude::*;

mod m20261001_000001_create_organizations;
mod m20261001_000002_create_organization_members;
mod m20261001_000003_create_codes;
mod m20261001_000004_create_code_redemptions;
mod m20261001_000005_create_entitlements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_organizations::Migration),
            Box::new(m20261001_000002_create_organization_members::Migration),
            Box::new(m20261001_000003_create_codes::Migration),
            Box::new(m20261001_000004_create_code_redemptions::Migration),
            Box::new(m20261001_000005_create_entitlements::Migration),
        ]
    }
}
