/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod support;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use entity::user::UserRole;
use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;
use web::endpoints::users::*;
use web::error::WebError;

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let admin = support::user(UserRole::Admin, None);

    let result = delete_user(
        State(support::create_mock_state(support::empty_db())),
        Extension(admin.clone()),
        Path(admin.id),
    )
    .await;

    assert!(matches!(result, Err(WebError::BadRequest(_))));
}

#[tokio::test]
async fn test_admin_cannot_delete_other_admin() {
    let admin = support::user(UserRole::Admin, None);
    let other = support::user(UserRole::Admin, None);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![other.clone()]])
        .into_connection();

    let result = delete_user(
        State(support::create_mock_state(db)),
        Extension(admin),
        Path(other.id),
    )
    .await;

    assert!(matches!(result, Err(WebError::BadRequest(_))));
}

#[tokio::test]
async fn test_manager_cannot_delete_users() {
    let manager = support::user(UserRole::Manager, Some(Uuid::new_v4()));

    let result = delete_user(
        State(support::create_mock_state(support::empty_db())),
        Extension(manager),
        Path(Uuid::new_v4()),
    )
    .await;

    assert!(matches!(result, Err(WebError::Forbidden(_))));
}

#[tokio::test]
async fn test_delete_missing_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<common::types::MUser>::new()])
        .into_connection();

    let result = delete_user(
        State(support::create_mock_state(db)),
        Extension(support::user(UserRole::Admin, None)),
        Path(Uuid::new_v4()),
    )
    .await;

    assert!(matches!(result, Err(WebError::NotFound(_))));
}

#[tokio::test]
async fn test_employee_cannot_change_own_role() {
    let employee = support::user(UserRole::Employee, None);
    let body = PatchUserRequest {
        role: Some(UserRole::Admin),
        ..Default::default()
    };

    let result = patch_user(
        State(support::create_mock_state(support::empty_db())),
        Extension(employee.clone()),
        Path(employee.id),
        Json(body),
    )
    .await;

    assert!(matches!(result, Err(WebError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_cannot_deactivate_self() {
    let admin = support::user(UserRole::Admin, None);
    let body = PatchUserRequest {
        active: Some(false),
        ..Default::default()
    };

    let result = patch_user(
        State(support::create_mock_state(support::empty_db())),
        Extension(admin.clone()),
        Path(admin.id),
        Json(body),
    )
    .await;

    assert!(matches!(result, Err(WebError::BadRequest(_))));
}

#[test]
fn test_patch_user_request_distinguishes_null() {
    let cleared: PatchUserRequest = serde_json::from_str(r#"{"departmentId":null}"#).unwrap();
    assert_eq!(cleared.department_id, Some(None));

    let untouched: PatchUserRequest = serde_json::from_str(r#"{"name":"سارا"}"#).unwrap();
    assert_eq!(untouched.department_id, None);
    assert_eq!(untouched.name.as_deref(), Some("سارا"));
}

#[test]
fn test_make_user_request_deserialization() {
    let request: MakeUserRequest = serde_json::from_str(
        r#"{"name":"علی","mobile":"09121234567","password":"secret123","role":"MANAGER"}"#,
    )
    .unwrap();

    assert_eq!(request.role, UserRole::Manager);
    assert!(request.department_id.is_none());
}
