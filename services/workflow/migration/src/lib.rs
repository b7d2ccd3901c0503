use sea_orm_migration::prelude::*;

mod m20261018_000001_create_submissions;
mod m20261018_000002_create_auth_codes;
mod m20261018_000003_create_leader_approvals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261018_000001_create_submissions::Migration),
            Box::new(m20261018_000002_create_auth_codes::Migration),
            Box::new(m20261018_000003_create_leader_approvals::Migration),
        ]
    }
}
