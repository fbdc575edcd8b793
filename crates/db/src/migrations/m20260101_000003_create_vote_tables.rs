//! Create vote and vote_option tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Vote::OrganizationId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::ContractAddress).string_len(128).not_null())
                    .col(ColumnDef::new(Vote::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Vote::Description).text().not_null())
                    .col(ColumnDef::new(Vote::ImageUrl).string_len(1024).not_null())
                    .col(ColumnDef::new(Vote::Network).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Vote::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vote::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vote::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_organization")
                            .from(Vote::Table, Vote::OrganizationId)
                            .to(Organization::Table, Organization::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: organization_id (org vote listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_organization_id")
                    .table(Vote::Table)
                    .col(Vote::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // Index: status (available-vote listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_status")
                    .table(Vote::Table)
                    .col(Vote::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoteOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteOption::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoteOption::VoteId).string_len(32).not_null())
                    .col(ColumnDef::new(VoteOption::OptionName).string_len(256).not_null())
                    .col(ColumnDef::new(VoteOption::OptionIndex).integer().not_null())
                    .col(
                        ColumnDef::new(VoteOption::VotesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_option_vote")
                            .from(VoteOption::Table, VoteOption::VoteId)
                            .to(Vote::Table, Vote::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (vote_id, option_index) - one option per position
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_option_vote_id_option_index")
                    .table(VoteOption::Table)
                    .col(VoteOption::VoteId)
                    .col(VoteOption::OptionIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    OrganizationId,
    ContractAddress,
    Title,
    Description,
    ImageUrl,
    Network,
    StartTime,
    EndTime,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum VoteOption {
    Table,
    Id,
    VoteId,
    OptionName,
    OptionIndex,
    VotesCount,
}

#[derive(Iden)]
enum Organization {
    Table,
    Id,
}
