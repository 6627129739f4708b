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
                    .table(AssessmentQuestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentQuestion::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestion::AssessmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssessmentQuestion::Text).text().not_null())
                    .col(
                        ColumnDef::new(AssessmentQuestion::Options)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestion::Position)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_question-assessment")
                            .from(AssessmentQuestion::Table, AssessmentQuestion::AssessmentId)
                            .to(Assessment::Table, Assessment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssessmentQuestion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AssessmentQuestion {
    Table,
    Id,
    AssessmentId,
    Text,
    Options,
    Position,
}

#[derive(DeriveIden)]
enum Assessment {
    Table,
    Id,
}
