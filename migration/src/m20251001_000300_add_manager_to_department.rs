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
            .alter_table(
                Table::alter()
                    .table(Department::Table)
                    .add_column(ColumnDef::new(Department::ManagerId).uuid().null())
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk-department-manager")
                            .from_tbl(Department::Table)
                            .from_col(Department::ManagerId)
                            .to_tbl(User::Table)
                            .to_col(User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Department::Table)
                    .drop_foreign_key(Alias::new("fk-department-manager"))
                    .drop_column(Department::ManagerId)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Department {
    Table,
    ManagerId,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
