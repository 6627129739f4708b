/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20251001_000100_create_table_department;
mod m20251001_000200_create_table_user;
mod m20251001_000300_add_manager_to_department;
mod m20251001_000400_create_table_feedback;
mod m20251001_000500_create_table_announcement;
mod m20251001_000600_create_table_announcement_view;
mod m20251001_000700_create_table_poll;
mod m20251001_000800_create_table_poll_option;
mod m20251001_000900_create_table_poll_response;
mod m20251001_001000_create_table_assessment;
mod m20251001_001100_create_table_assessment_question;
mod m20251001_001200_create_table_assessment_assignment;
mod m20251001_001300_create_table_assessment_progress;
mod m20251001_001400_create_table_assessment_result;
mod m20251001_001500_create_table_project;
mod m20251001_001600_create_table_notification;
mod m20251001_001700_create_table_update;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000100_create_table_department::Migration),
            Box::new(m20251001_000200_create_table_user::Migration),
            Box::new(m20251001_000300_add_manager_to_department::Migration),
            Box::new(m20251001_000400_create_table_feedback::Migration),
            Box::new(m20251001_000500_create_table_announcement::Migration),
            Box::new(m20251001_000600_create_table_announcement_view::Migration),
            Box::new(m20251001_000700_create_table_poll::Migration),
            Box::new(m20251001_000800_create_table_poll_option::Migration),
            Box::new(m20251001_000900_create_table_poll_response::Migration),
            Box::new(m20251001_001000_create_table_assessment::Migration),
            Box::new(m20251001_001100_create_table_assessment_question::Migration),
            Box::new(m20251001_001200_create_table_assessment_assignment::Migration),
            Box::new(m20251001_001300_create_table_assessment_progress::Migration),
            Box::new(m20251001_001400_create_table_assessment_result::Migration),
            Box::new(m20251001_001500_create_table_project::Migration),
            Box::new(m20251001_001600_create_table_notification::Migration),
            Box::new(m20251001_001700_create_table_update::Migration),
        ]
    }
}
