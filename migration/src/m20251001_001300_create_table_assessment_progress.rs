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
                    .table(AssessmentProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentProgress::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AssessmentProgress::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AssessmentProgress::AssessmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentProgress::Answers)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentProgress::CurrentQuestion)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AssessmentProgress::StartedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentProgress::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssessmentProgress::CompletedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_progress-user")
                            .from(AssessmentProgress::Table, AssessmentProgress::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_progress-assessment")
                            .from(
                                AssessmentProgress::Table,
                                AssessmentProgress::AssessmentId,
                            )
                            .to(Assessment::Table, Assessment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assessment_progress-user-assessment")
                    .table(AssessmentProgress::Table)
                    .col(AssessmentProgress::UserId)
                    .col(AssessmentProgress::AssessmentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssessmentProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AssessmentProgress {
    Table,
    Id,
    UserId,
    AssessmentId,
    Answers,
    CurrentQuestion,
    StartedAt,
    UpdatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Assessment {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
