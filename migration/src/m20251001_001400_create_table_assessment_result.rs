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
                    .table(AssessmentResult::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentResult::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AssessmentResult::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AssessmentResult::AssessmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentResult::Outcome)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssessmentResult::Summary).string().not_null())
                    .col(
                        ColumnDef::new(AssessmentResult::CompletedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_result-user")
                            .from(AssessmentResult::Table, AssessmentResult::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_result-assessment")
                            .from(AssessmentResult::Table, AssessmentResult::AssessmentId)
                            .to(Assessment::Table, Assessment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assessment_result-user-assessment")
                    .table(AssessmentResult::Table)
                    .col(AssessmentResult::UserId)
                    .col(AssessmentResult::AssessmentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssessmentResult::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AssessmentResult {
    Table,
    Id,
    UserId,
    AssessmentId,
    Outcome,
    Summary,
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
