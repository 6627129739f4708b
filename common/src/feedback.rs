/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::{InputError, normalize_persian};
use super::types::*;
use entity::feedback::{FeedbackStatus, FeedbackType};
use entity::user::UserRole;
use sea_orm::{ColumnTrait, Condition, EntityTrait, Iterable, QueryFilter, QueryOrder, Select};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routing {
    pub status: FeedbackStatus,
    pub forwarded_to_id: Option<Uuid>,
}

/// Departments with direct feedback enabled hand new items straight to
/// their manager; everything else waits for an admin.
pub fn route_new_feedback(department: &MDepartment) -> Routing {
    match (department.allow_direct_feedback, department.manager_id) {
        (true, Some(manager)) => Routing {
            status: FeedbackStatus::Reviewed,
            forwarded_to_id: Some(manager),
        },
        _ => Routing {
            status: FeedbackStatus::Pending,
            forwarded_to_id: None,
        },
    }
}

pub fn can_transition(from: FeedbackStatus, to: FeedbackStatus) -> bool {
    use FeedbackStatus::*;

    matches!(
        (from, to),
        (Pending, Reviewed | Deferred)
            | (Reviewed, Deferred | Completed | Archived)
            | (Deferred, Reviewed | Completed | Archived)
            | (Completed, Archived)
    )
}

/// Same-status updates pass as no-ops.
pub fn check_transition(from: FeedbackStatus, to: FeedbackStatus) -> Result<(), InputError> {
    if from == to || can_transition(from, to) {
        Ok(())
    } else {
        Err(InputError::Invalid(format!(
            "تغییر وضعیت از {} به {} مجاز نیست",
            status_label(from),
            status_label(to)
        )))
    }
}

pub fn status_label(status: FeedbackStatus) -> &'static str {
    match status {
        FeedbackStatus::Pending => "در انتظار بررسی",
        FeedbackStatus::Reviewed => "در حال بررسی",
        FeedbackStatus::Deferred => "معوق",
        FeedbackStatus::Completed => "انجام شده",
        FeedbackStatus::Archived => "بایگانی شده",
    }
}

pub fn type_label(kind: FeedbackType) -> &'static str {
    match kind {
        FeedbackType::Suggestion => "پیشنهاد",
        FeedbackType::Complaint => "شکایت",
        FeedbackType::Criticism => "انتقاد",
        FeedbackType::Survey => "نظرسنجی",
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackFilter {
    pub status: Option<FeedbackStatus>,
    #[serde(rename = "type")]
    pub kind: Option<FeedbackType>,
    pub department_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Rows `actor` may list. `trash` selects soft-deleted rows instead of live
/// ones; `managed` lists the departments whose manager is `actor`.
pub fn list_query(
    actor: &MUser,
    managed: &[Uuid],
    trash: bool,
    filter: &FeedbackFilter,
) -> Select<EFeedback> {
    let mut query = if trash {
        EFeedback::find().filter(CFeedback::DeletedAt.is_not_null())
    } else {
        EFeedback::find().filter(CFeedback::DeletedAt.is_null())
    };

    query = match actor.role {
        UserRole::Admin => query,
        UserRole::Manager => query.filter(
            Condition::any()
                .add(CFeedback::UserId.eq(actor.id))
                .add(CFeedback::ForwardedToId.eq(actor.id))
                .add(CFeedback::DepartmentId.is_in(managed.to_vec())),
        ),
        UserRole::Employee => query.filter(CFeedback::UserId.eq(actor.id)),
    };

    if let Some(status) = filter.status {
        query = query.filter(CFeedback::Status.eq(status));
    }

    if let Some(kind) = filter.kind {
        query = query.filter(CFeedback::Kind.eq(kind));
    }

    if let Some(department_id) = filter.department_id {
        query = query.filter(CFeedback::DepartmentId.eq(department_id));
    }

    query.order_by_desc(CFeedback::CreatedAt)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    pub priority: entity::feedback::FeedbackPriority,
    pub anonymous: bool,
    pub status: FeedbackStatus,
    pub department_id: Uuid,
    pub user_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub forwarded_to_id: Option<Uuid>,
    pub response: Option<String>,
    pub responded_by_id: Option<Uuid>,
    pub responded_at: Option<chrono::NaiveDateTime>,
    pub attachments: Vec<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub deleted_at: Option<chrono::NaiveDateTime>,
}

impl FeedbackView {
    /// Anonymous items hide their author from everyone but admins and the
    /// author.
    pub fn new(feedback: MFeedback, viewer: &MUser, author_name: Option<String>) -> Self {
        let reveal =
            !feedback.anonymous || viewer.is_admin() || feedback.user_id == viewer.id;

        Self {
            id: feedback.id,
            title: feedback.title,
            content: feedback.content,
            kind: feedback.kind,
            priority: feedback.priority,
            anonymous: feedback.anonymous,
            status: feedback.status,
            department_id: feedback.department_id,
            user_id: reveal.then_some(feedback.user_id),
            author_name: author_name.filter(|_| reveal),
            forwarded_to_id: feedback.forwarded_to_id,
            response: feedback.response,
            responded_by_id: feedback.responded_by_id,
            responded_at: feedback.responded_at,
            attachments: feedback.attachments,
            created_at: feedback.created_at,
            updated_at: feedback.updated_at,
            deleted_at: feedback.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count<K> {
    pub key: K,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCount {
    pub department_id: Uuid,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAnalytics {
    pub total: u64,
    pub by_status: Vec<Count<FeedbackStatus>>,
    pub by_type: Vec<Count<FeedbackType>>,
    pub by_department: Vec<DepartmentCount>,
    pub keywords: Vec<KeywordCount>,
}

/// Counts items whose normalized text contains each keyword. An item
/// mentioning a keyword twice counts once. Sorted by count, ties keep the
/// configured keyword order; keywords without hits are dropped.
pub fn keyword_hits<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    keywords: &[String],
) -> Vec<KeywordCount> {
    let needles: Vec<String> = keywords.iter().map(|k| normalize_persian(k)).collect();
    let mut counts = vec![0u64; keywords.len()];

    for text in texts {
        let haystack = normalize_persian(text);

        for (i, needle) in needles.iter().enumerate() {
            if !needle.is_empty() && haystack.contains(needle.as_str()) {
                counts[i] += 1;
            }
        }
    }

    let mut hits: Vec<KeywordCount> = keywords
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.clone(),
            count,
        })
        .collect();

    hits.sort_by(|a, b| b.count.cmp(&a.count));
    hits
}

pub fn analyze(
    feedback: &[MFeedback],
    departments: &[MDepartment],
    keywords: &[String],
) -> FeedbackAnalytics {
    let by_status = FeedbackStatus::iter()
        .map(|status| Count {
            key: status,
            count: feedback.iter().filter(|f| f.status == status).count() as u64,
        })
        .collect();

    let by_type = FeedbackType::iter()
        .map(|kind| Count {
            key: kind,
            count: feedback.iter().filter(|f| f.kind == kind).count() as u64,
        })
        .collect();

    let mut per_department: HashMap<Uuid, u64> = HashMap::new();
    for f in feedback {
        *per_department.entry(f.department_id).or_default() += 1;
    }

    let mut by_department: Vec<DepartmentCount> = departments
        .iter()
        .map(|d| DepartmentCount {
            department_id: d.id,
            name: d.name.clone(),
            count: per_department.get(&d.id).copied().unwrap_or_default(),
        })
        .collect();
    by_department.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let texts: Vec<String> = feedback
        .iter()
        .map(|f| format!("{} {}", f.title, f.content))
        .collect();

    FeedbackAnalytics {
        total: feedback.len() as u64,
        by_status,
        by_type,
        by_department,
        keywords: keyword_hits(texts.iter().map(String::as_str), keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn department(allow_direct_feedback: bool, manager_id: Option<Uuid>) -> MDepartment {
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        MDepartment {
            id: Uuid::new_v4(),
            name: "منابع انسانی".to_string(),
            description: None,
            manager_id,
            allow_direct_feedback,
            allowed_poll_departments: vec![],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_direct_feedback_goes_to_manager() {
        let manager = Uuid::new_v4();
        let routing = route_new_feedback(&department(true, Some(manager)));

        assert_eq!(routing.status, FeedbackStatus::Reviewed);
        assert_eq!(routing.forwarded_to_id, Some(manager));
    }

    #[test]
    fn test_direct_feedback_without_manager_waits() {
        let routing = route_new_feedback(&department(true, None));

        assert_eq!(routing.status, FeedbackStatus::Pending);
        assert_eq!(routing.forwarded_to_id, None);
    }

    #[test]
    fn test_manager_without_direct_feedback_waits() {
        let routing = route_new_feedback(&department(false, Some(Uuid::new_v4())));

        assert_eq!(routing.status, FeedbackStatus::Pending);
        assert_eq!(routing.forwarded_to_id, None);
    }

    #[test]
    fn test_transitions() {
        use FeedbackStatus::*;

        assert!(can_transition(Pending, Reviewed));
        assert!(can_transition(Pending, Deferred));
        assert!(!can_transition(Pending, Completed));
        assert!(can_transition(Reviewed, Completed));
        assert!(can_transition(Deferred, Archived));
        assert!(can_transition(Completed, Archived));
        assert!(!can_transition(Archived, Pending));
        assert!(!can_transition(Completed, Reviewed));

        assert!(check_transition(Archived, Archived).is_ok());
        assert!(check_transition(Archived, Reviewed).is_err());
    }
}
