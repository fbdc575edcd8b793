//! Create submission table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submission::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submission::VoteId).string_len(32).not_null())
                    .col(ColumnDef::new(Submission::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Submission::OptionIndex).integer().not_null())
                    .col(ColumnDef::new(Submission::TxHash).string_len(66).not_null())
                    .col(
                        ColumnDef::new(Submission::Status)
                            .string_len(16)
                            .not_null()
                            .default("confirmed"),
                    )
                    .col(
                        ColumnDef::new(Submission::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_vote")
                            .from(Submission::Table, Submission::VoteId)
                            .to(Vote::Table, Vote::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_user")
                            .from(Submission::Table, Submission::UserId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (vote_id, user_id) - the authoritative one-ballot-per-user
        // guard. Concurrent duplicate submissions fail here, not in application
        // code.
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_vote_id_user_id")
                    .table(Submission::Table)
                    .col(Submission::VoteId)
                    .col(Submission::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: tx_hash
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_tx_hash")
                    .table(Submission::Table)
                    .col(Submission::TxHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (per-user submission history)
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_user_id")
                    .table(Submission::Table)
                    .col(Submission::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Submission {
    Table,
    Id,
    VoteId,
    UserId,
    OptionIndex,
    TxHash,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
