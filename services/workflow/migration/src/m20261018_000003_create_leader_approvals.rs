use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaderApprovals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaderApprovals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeaderApprovals::SubmissionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderApprovals::LeaderEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderApprovals::Approved)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeaderApprovals::Comment).text())
                    .col(
                        ColumnDef::new(LeaderApprovals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LeaderApprovals::Table, LeaderApprovals::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LeaderApprovals::Table)
                    .col(LeaderApprovals::SubmissionId)
                    .col(LeaderApprovals::CreatedAt)
                    .name("idx_leader_approvals_submission_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeaderApprovals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LeaderApprovals {
    Table,
    Id,
    SubmissionId,
    LeaderEmail,
    Approved,
    Comment,
    CreatedAt,
}

#[derive(Iden)]
enum Submissions {
    Table,
    Id,
}
