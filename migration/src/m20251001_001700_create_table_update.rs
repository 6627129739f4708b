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
                    .table(Update::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Update::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Update::Title).string().not_null())
                    .col(ColumnDef::new(Update::Content).text().not_null())
                    .col(ColumnDef::new(Update::Version).string())
                    .col(ColumnDef::new(Update::CreatedById).uuid().not_null())
                    .col(ColumnDef::new(Update::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Update::DeletedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-update-created_by")
                            .from(Update::Table, Update::CreatedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Update::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Update {
    Table,
    Id,
    Title,
    Content,
    Version,
    CreatedById,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
