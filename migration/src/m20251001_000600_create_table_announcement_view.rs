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
                    .table(AnnouncementView::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnnouncementView::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnnouncementView::AnnouncementId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnnouncementView::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AnnouncementView::ViewedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-announcement_view-announcement")
                            .from(AnnouncementView::Table, AnnouncementView::AnnouncementId)
                            .to(Announcement::Table, Announcement::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-announcement_view-user")
                            .from(AnnouncementView::Table, AnnouncementView::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-announcement_view-announcement-user")
                    .table(AnnouncementView::Table)
                    .col(AnnouncementView::AnnouncementId)
                    .col(AnnouncementView::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnnouncementView::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnnouncementView {
    Table,
    Id,
    AnnouncementId,
    UserId,
    ViewedAt,
}

#[derive(DeriveIden)]
enum Announcement {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
