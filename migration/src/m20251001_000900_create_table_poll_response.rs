/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PollResponse::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollResponse::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PollResponse::PollId).uuid().not_null())
                    .col(ColumnDef::new(PollResponse::UserId).uuid().not_null())
                    .col(ColumnDef::new(PollResponse::OptionId).uuid())
                    .col(ColumnDef::new(PollResponse::Rating).integer())
                    .col(ColumnDef::new(PollResponse::Text).text())
                    .col(
                        ColumnDef::new(PollResponse::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-poll_response-poll")
                            .from(PollResponse::Table, PollResponse::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-poll_response-user")
                            .from(PollResponse::Table, PollResponse::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-poll_response-option")
                            .from(PollResponse::Table, PollResponse::OptionId)
                            .to(PollOption::Table, PollOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: multiple-choice votes keep one row per option.
        manager
            .create_index(
                Index::create()
                    .name("idx-poll_response-poll-user")
                    .table(PollResponse::Table)
                    .col(PollResponse::PollId)
                    .col(PollResponse::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollResponse::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PollResponse {
    Table,
    Id,
    PollId,
    UserId,
    OptionId,
    Rating,
    Text,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Poll {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PollOption {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
