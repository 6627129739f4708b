/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for user entity

use chrono::NaiveDate;
use entity::*;
use sea_orm::{DatabaseBackend, MockDatabase, entity::prelude::*};
use uuid::Uuid;

fn user_model(id: Uuid, role: user::UserRole) -> user::Model {
    let naive_date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    user::Model {
        id,
        name: "مریم احمدی".to_owned(),
        mobile: "09121234567".to_owned(),
        password: "hashed_password".to_owned(),
        role,
        department_id: None,
        avatar: None,
        active: true,
        last_login_at: None,
        created_at: naive_date,
        updated_at: naive_date,
        deleted_at: None,
    }
}

#[tokio::test]
async fn test_user_entity_basic() -> Result<(), DbErr> {
    let user_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id, user::UserRole::Manager)]])
        .into_connection();

    let result = user::Entity::find_by_id(user_id).one(&db).await?;

    assert!(result.is_some());
    let user = result.unwrap();
    assert_eq!(user.mobile, "09121234567");
    assert!(user.is_manager());
    assert!(!user.is_admin());

    Ok(())
}

#[test]
fn test_user_password_not_serialized() {
    let user = user_model(Uuid::new_v4(), user::UserRole::Employee);
    let json = serde_json::to_value(&user).unwrap();

    assert!(json.get("password").is_none());
    assert_eq!(json["role"], "EMPLOYEE");
    assert!(json.get("departmentId").is_some());
}

#[test]
fn test_user_availability() {
    let mut user = user_model(Uuid::new_v4(), user::UserRole::Employee);
    assert!(user.is_available());

    user.active = false;
    assert!(!user.is_available());

    user.active = true;
    user.deleted_at = Some(user.created_at);
    assert!(!user.is_available());
}
