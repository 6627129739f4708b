/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for role rules

use chrono::NaiveDate;
use common::permission::*;
use common::types::*;
use entity::feedback::{FeedbackPriority, FeedbackStatus, FeedbackType};
use entity::user::UserRole;
use uuid::Uuid;

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn user(role: UserRole, department_id: Option<Uuid>) -> MUser {
    MUser {
        id: Uuid::new_v4(),
        name: "علی رضایی".to_string(),
        mobile: "09121234567".to_string(),
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

fn department(id: Uuid, allowed_poll_departments: Vec<Uuid>) -> MDepartment {
    MDepartment {
        id,
        name: "فناوری اطلاعات".to_string(),
        description: None,
        manager_id: None,
        allow_direct_feedback: false,
        allowed_poll_departments,
        created_at: timestamp(),
        updated_at: timestamp(),
        deleted_at: None,
    }
}

fn feedback(author: Uuid, department_id: Uuid, status: FeedbackStatus) -> MFeedback {
    MFeedback {
        id: Uuid::new_v4(),
        title: "تهویه".to_string(),
        content: "تهویه طبقه دوم کار نمی‌کند".to_string(),
        kind: FeedbackType::Complaint,
        priority: FeedbackPriority::Medium,
        anonymous: false,
        status,
        department_id,
        user_id: author,
        forwarded_to_id: None,
        response: None,
        responded_by_id: None,
        responded_at: None,
        attachments: vec![],
        created_at: timestamp(),
        updated_at: timestamp(),
        deleted_at: None,
    }
}

#[test]
fn test_employee_cannot_create_poll() {
    let own = Uuid::new_v4();
    let employee = user(UserRole::Employee, Some(own));
    let dept = department(own, vec![own]);

    let result = check_poll_creation(&employee, Some(&dept), Some(own));
    assert!(matches!(result, Err(Denied::Forbidden(_))));
}

#[test]
fn test_manager_poll_creation_limited_to_allowed_departments() {
    let own = Uuid::new_v4();
    let allowed = Uuid::new_v4();
    let other = Uuid::new_v4();
    let manager = user(UserRole::Manager, Some(own));
    let dept = department(own, vec![own, allowed]);

    assert!(check_poll_creation(&manager, Some(&dept), Some(own)).is_ok());
    assert!(check_poll_creation(&manager, Some(&dept), Some(allowed)).is_ok());
    assert!(matches!(
        check_poll_creation(&manager, Some(&dept), Some(other)),
        Err(Denied::Forbidden(_))
    ));
    assert!(matches!(
        check_poll_creation(&manager, Some(&dept), None),
        Err(Denied::Forbidden(_))
    ));
}

#[test]
fn test_manager_poll_creation_uses_own_department_only() {
    let own = Uuid::new_v4();
    let target = Uuid::new_v4();
    let manager = user(UserRole::Manager, Some(own));
    let foreign = department(Uuid::new_v4(), vec![target]);

    assert!(check_poll_creation(&manager, Some(&foreign), Some(target)).is_err());
    assert!(check_poll_creation(&manager, None, Some(target)).is_err());
}

#[test]
fn test_admin_can_create_any_poll() {
    let admin = user(UserRole::Admin, None);

    assert!(check_poll_creation(&admin, None, None).is_ok());
    assert!(check_poll_creation(&admin, None, Some(Uuid::new_v4())).is_ok());
}

#[test]
fn test_user_deletion_rules() {
    let admin = user(UserRole::Admin, None);
    let other_admin = user(UserRole::Admin, None);
    let employee = user(UserRole::Employee, None);
    let manager = user(UserRole::Manager, None);

    assert!(check_user_deletion(&admin, &employee).is_ok());
    assert!(check_user_deletion(&admin, &manager).is_ok());
    assert!(matches!(
        check_user_deletion(&admin, &admin),
        Err(Denied::Rejected(_))
    ));
    assert!(matches!(
        check_user_deletion(&admin, &other_admin),
        Err(Denied::Rejected(_))
    ));
    assert!(matches!(
        check_user_deletion(&manager, &employee),
        Err(Denied::Forbidden(_))
    ));
}

#[test]
fn test_department_publishing() {
    let own = Uuid::new_v4();
    let manager = user(UserRole::Manager, Some(own));
    let employee = user(UserRole::Employee, Some(own));
    let admin = user(UserRole::Admin, None);

    assert!(check_department_publishing(&admin, None).is_ok());
    assert!(check_department_publishing(&manager, Some(own)).is_ok());
    assert!(check_department_publishing(&manager, Some(Uuid::new_v4())).is_err());
    assert!(check_department_publishing(&manager, None).is_err());
    assert!(check_department_publishing(&employee, Some(own)).is_err());
}

#[test]
fn test_visibility() {
    let own = Uuid::new_v4();
    let employee = user(UserRole::Employee, Some(own));
    let admin = user(UserRole::Admin, None);

    assert!(is_visible_to(&employee, None));
    assert!(is_visible_to(&employee, Some(own)));
    assert!(!is_visible_to(&employee, Some(Uuid::new_v4())));
    assert!(is_visible_to(&admin, Some(Uuid::new_v4())));
}

#[test]
fn test_feedback_access() {
    let dept = Uuid::new_v4();
    let author = user(UserRole::Employee, Some(dept));
    let stranger = user(UserRole::Employee, Some(dept));
    let manager = user(UserRole::Manager, Some(dept));
    let admin = user(UserRole::Admin, None);

    let mut item = feedback(author.id, dept, FeedbackStatus::Pending);

    assert!(can_view_feedback(&author, &item, &[]));
    assert!(!can_view_feedback(&stranger, &item, &[]));
    assert!(!can_handle_feedback(&manager, &item, &[]));
    assert!(can_handle_feedback(&manager, &item, &[dept]));
    assert!(can_handle_feedback(&admin, &item, &[]));

    item.forwarded_to_id = Some(manager.id);
    assert!(can_handle_feedback(&manager, &item, &[]));
    assert!(!can_handle_feedback(&author, &item, &[]));
}

#[test]
fn test_feedback_deletion() {
    let dept = Uuid::new_v4();
    let author = user(UserRole::Employee, Some(dept));
    let admin = user(UserRole::Admin, None);

    let pending = feedback(author.id, dept, FeedbackStatus::Pending);
    let reviewed = feedback(author.id, dept, FeedbackStatus::Reviewed);

    assert!(can_delete_feedback(&author, &pending));
    assert!(!can_delete_feedback(&author, &reviewed));
    assert!(can_delete_feedback(&admin, &reviewed));
}

#[test]
fn test_owner_or_admin() {
    let owner = user(UserRole::Manager, None);
    let other = user(UserRole::Manager, None);
    let admin = user(UserRole::Admin, None);

    assert!(check_owner_or_admin(&owner, owner.id).is_ok());
    assert!(check_owner_or_admin(&admin, owner.id).is_ok());
    assert!(check_owner_or_admin(&other, owner.id).is_err());
    assert!(require_staff(&other).is_ok());
    assert!(require_admin(&other).is_err());
}
