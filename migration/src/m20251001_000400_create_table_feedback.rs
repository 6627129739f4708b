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
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedback::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedback::Title).string().not_null())
                    .col(ColumnDef::new(Feedback::Content).text().not_null())
                    .col(ColumnDef::new(Feedback::Kind).small_integer().not_null())
                    .col(ColumnDef::new(Feedback::Priority).small_integer().not_null())
                    .col(
                        ColumnDef::new(Feedback::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Feedback::Status).small_integer().not_null())
                    .col(ColumnDef::new(Feedback::DepartmentId).uuid().not_null())
                    .col(ColumnDef::new(Feedback::UserId).uuid().not_null())
                    .col(ColumnDef::new(Feedback::ForwardedToId).uuid())
                    .col(ColumnDef::new(Feedback::Response).text())
                    .col(ColumnDef::new(Feedback::RespondedById).uuid())
                    .col(ColumnDef::new(Feedback::RespondedAt).date_time())
                    .col(
                        ColumnDef::new(Feedback::Attachments)
                            .array(ColumnType::String(StringLen::None))
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(ColumnDef::new(Feedback::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Feedback::UpdatedAt).date_time().not_null())
                    .col(ColumnDef::new(Feedback::DeletedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-department")
                            .from(Feedback::Table, Feedback::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-user")
                            .from(Feedback::Table, Feedback::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-forwarded_to")
                            .from(Feedback::Table, Feedback::ForwardedToId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-responded_by")
                            .from(Feedback::Table, Feedback::RespondedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-feedback-department-deleted_at")
                    .table(Feedback::Table)
                    .col(Feedback::DepartmentId)
                    .col(Feedback::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Feedback {
    Table,
    Id,
    Title,
    Content,
    Kind,
    Priority,
    Anonymous,
    Status,
    DepartmentId,
    UserId,
    ForwardedToId,
    Response,
    RespondedById,
    RespondedAt,
    Attachments,
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
