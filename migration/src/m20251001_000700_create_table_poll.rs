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
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Poll::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Poll::Title).string().not_null())
                    .col(ColumnDef::new(Poll::Description).text())
                    .col(ColumnDef::new(Poll::Kind).small_integer().not_null())
                    .col(ColumnDef::new(Poll::Visibility).small_integer().not_null())
                    .col(ColumnDef::new(Poll::ShowResults).small_integer().not_null())
                    .col(ColumnDef::new(Poll::DepartmentId).uuid())
                    .col(ColumnDef::new(Poll::CreatedById).uuid().not_null())
                    .col(ColumnDef::new(Poll::MinRating).integer())
                    .col(ColumnDef::new(Poll::MaxRating).integer())
                    .col(
                        ColumnDef::new(Poll::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Poll::StartsAt).date_time().not_null())
                    .col(ColumnDef::new(Poll::EndsAt).date_time())
                    .col(ColumnDef::new(Poll::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Poll::UpdatedAt).date_time().not_null())
                    .col(ColumnDef::new(Poll::DeletedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-poll-department")
                            .from(Poll::Table, Poll::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-poll-created_by")
                            .from(Poll::Table, Poll::CreatedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Poll {
    Table,
    Id,
    Title,
    Description,
    Kind,
    Visibility,
    ShowResults,
    DepartmentId,
    CreatedById,
    MinRating,
    MaxRating,
    Active,
    StartsAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
