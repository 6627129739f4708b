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
                    .table(Assessment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessment::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assessment::Title).string().not_null())
                    .col(ColumnDef::new(Assessment::Description).text())
                    .col(ColumnDef::new(Assessment::Kind).small_integer().not_null())
                    .col(ColumnDef::new(Assessment::TimeLimit).integer())
                    .col(
                        ColumnDef::new(Assessment::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Assessment::CreatedById).uuid().not_null())
                    .col(ColumnDef::new(Assessment::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Assessment::UpdatedAt).date_time().not_null())
                    .col(ColumnDef::new(Assessment::DeletedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assessment-created_by")
                            .from(Assessment::Table, Assessment::CreatedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assessment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Assessment {
    Table,
    Id,
    Title,
    Description,
    Kind,
    TimeLimit,
    Active,
    CreatedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
