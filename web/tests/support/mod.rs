/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use chrono::NaiveDateTime;
use common::types::*;
use entity::user::UserRole;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use uuid::Uuid;

pub fn create_mock_cli() -> Cli {
    Cli {
        log_level: "info".to_string(),
        log_json: false,
        ip: "127.0.0.1".to_string(),
        port: 3000,
        serve_url: "http://127.0.0.1:8000".to_string(),
        database_url: Some("mock://test".to_string()),
        database_url_file: None,
        jwt_secret_file: "/nonexistent/jwt_secret".to_string(),
        jwt_lifetime_hours: 24,
        storage_endpoint: None,
        storage_public_url: None,
        storage_token_file: None,
        max_upload_size: 1024 * 1024,
        analytics_keywords: None,
        admin_name: "مدیر سیستم".to_string(),
        admin_mobile: None,
        admin_password_file: None,
        report_errors: false,
        sentry_dsn: None,
    }
}

pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

pub fn create_mock_state(db: DatabaseConnection) -> Arc<ServerState> {
    Arc::new(ServerState {
        db,
        cli: create_mock_cli(),
        storage: None,
    })
}

pub fn timestamp() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-03-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn user(role: UserRole, department_id: Option<Uuid>) -> MUser {
    MUser {
        id: Uuid::new_v4(),
        name: "کاربر آزمایشی".to_string(),
        mobile: "09120000000".to_string(),
        password: String::new(),
        role,
        department_id,
        avatar: None,
        active: true,
        last_login_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
        deleted_at: None,
    }
}

pub fn department(id: Uuid, manager_id: Option<Uuid>, allowed: Vec<Uuid>) -> MDepartment {
    MDepartment {
        id,
        name: "واحد فروش".to_string(),
        description: None,
        manager_id,
        allow_direct_feedback: false,
        allowed_poll_departments: allowed,
        created_at: timestamp(),
        updated_at: timestamp(),
        deleted_at: None,
    }
}
