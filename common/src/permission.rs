/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Role rules shared by the endpoints. Every check is a pure function over
//! already loaded rows so the handlers only decide *what* to load.

use super::types::*;
use entity::user::UserRole;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    /// The caller's role does not allow the action at all.
    #[error("{0}")]
    Forbidden(String),
    /// The action is allowed for the role but not for this target.
    #[error("{0}")]
    Rejected(String),
}

impl Denied {
    pub fn forbidden() -> Self {
        Denied::Forbidden("شما دسترسی لازم برای این عملیات را ندارید".to_string())
    }
}

pub fn require_admin(actor: &MUser) -> Result<(), Denied> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Denied::forbidden())
    }
}

pub fn require_staff(actor: &MUser) -> Result<(), Denied> {
    match actor.role {
        UserRole::Admin | UserRole::Manager => Ok(()),
        UserRole::Employee => Err(Denied::forbidden()),
    }
}

/// `target` is the poll's department, `None` for a company-wide poll.
/// `actor_department` is the department the actor belongs to.
pub fn check_poll_creation(
    actor: &MUser,
    actor_department: Option<&MDepartment>,
    target: Option<Uuid>,
) -> Result<(), Denied> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Employee => Err(Denied::Forbidden(
            "کارمندان امکان ایجاد نظرسنجی ندارند".to_string(),
        )),
        UserRole::Manager => {
            let Some(target) = target else {
                return Err(Denied::Forbidden(
                    "ایجاد نظرسنجی برای کل سازمان فقط توسط مدیر سیستم امکان‌پذیر است".to_string(),
                ));
            };

            let allowed = actor_department
                .filter(|d| Some(d.id) == actor.department_id)
                .is_some_and(|d| d.allowed_poll_departments.contains(&target));

            if allowed {
                Ok(())
            } else {
                Err(Denied::Forbidden(
                    "شما اجازه ایجاد نظرسنجی برای این واحد را ندارید".to_string(),
                ))
            }
        }
    }
}

pub fn check_user_deletion(actor: &MUser, target: &MUser) -> Result<(), Denied> {
    require_admin(actor)?;

    if actor.id == target.id {
        return Err(Denied::Rejected(
            "امکان حذف حساب کاربری خودتان وجود ندارد".to_string(),
        ));
    }

    if target.is_admin() {
        return Err(Denied::Rejected(
            "امکان حذف کاربر با نقش مدیر سیستم وجود ندارد".to_string(),
        ));
    }

    Ok(())
}

/// Announcements and projects: admins publish anywhere, managers only to
/// the department they belong to.
pub fn check_department_publishing(actor: &MUser, target: Option<Uuid>) -> Result<(), Denied> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Manager if target.is_some() && target == actor.department_id => Ok(()),
        UserRole::Manager => Err(Denied::Forbidden(
            "مدیران فقط برای واحد خود امکان انتشار دارند".to_string(),
        )),
        UserRole::Employee => Err(Denied::forbidden()),
    }
}

pub fn check_owner_or_admin(actor: &MUser, owner: Uuid) -> Result<(), Denied> {
    if actor.is_admin() || actor.id == owner {
        Ok(())
    } else {
        Err(Denied::forbidden())
    }
}

/// Whether a department-scoped row is visible to `user`.
pub fn is_visible_to(user: &MUser, department: Option<Uuid>) -> bool {
    user.is_admin() || department.is_none() || department == user.department_id
}

/// `managed` lists the departments whose manager is `actor`.
pub fn can_handle_feedback(actor: &MUser, feedback: &MFeedback, managed: &[Uuid]) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Manager => {
            feedback.forwarded_to_id == Some(actor.id) || managed.contains(&feedback.department_id)
        }
        UserRole::Employee => false,
    }
}

pub fn can_view_feedback(actor: &MUser, feedback: &MFeedback, managed: &[Uuid]) -> bool {
    feedback.user_id == actor.id || can_handle_feedback(actor, feedback, managed)
}

/// Authors may withdraw their own feedback until someone picked it up.
pub fn can_delete_feedback(actor: &MUser, feedback: &MFeedback) -> bool {
    actor.is_admin()
        || (feedback.user_id == actor.id
            && feedback.status == entity::feedback::FeedbackStatus::Pending)
}
