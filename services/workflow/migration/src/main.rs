use sea_orm_migration::prelude::*;

use dmrt_workflow_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
