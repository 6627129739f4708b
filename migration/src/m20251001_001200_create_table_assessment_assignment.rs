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
                    .table(AssessmentAssignment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentAssignment::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentAssignment::AssessmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentAssignment::DepartmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentAssignment::AssignedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_assignment-assessment")
                            .from(
                                AssessmentAssignment::Table,
                                AssessmentAssignment::AssessmentId,
                            )
                            .to(Assessment::Table, Assessment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment_assignment-department")
                            .from(
                                AssessmentAssignment::Table,
                                AssessmentAssignment::DepartmentId,
                            )
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assessment_assignment-assessment-department")
                    .table(AssessmentAssignment::Table)
                    .col(AssessmentAssignment::AssessmentId)
                    .col(AssessmentAssignment::DepartmentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssessmentAssignment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AssessmentAssignment {
    Table,
    Id,
    AssessmentId,
    DepartmentId,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Assessment {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
}
