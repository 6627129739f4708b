/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::departments::find_department;
use super::{now, paginate, respond};
use crate::error::{WebError, WebResult};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use common::database::managed_department_ids;
use common::feedback::*;
use common::consts::MAX_CONTENT_LENGTH;
use common::input::{require_text, validate_content, validate_title};
use common::notifications::{NotificationDraft, notify_users};
use common::permission::{
    Denied, can_delete_feedback, can_handle_feedback, can_view_feedback, require_admin,
};
use common::types::*;
use entity::feedback::{FeedbackPriority, FeedbackStatus, FeedbackType};
use entity::notification::NotificationType;
use entity::user::UserRole;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakeFeedbackRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    #[serde(default)]
    pub priority: Option<FeedbackPriority>,
    #[serde(default)]
    pub anonymous: bool,
    pub department_id: Uuid,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchFeedbackRequest {
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ForwardFeedbackRequest {
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RespondFeedbackRequest {
    pub response: String,
    pub status: Option<FeedbackStatus>,
}

fn feedback_link(id: Uuid) -> String {
    format!("/feedback/{}", id)
}

async fn find_feedback(db: &DatabaseConnection, id: Uuid, deleted: bool) -> WebResult<MFeedback> {
    let query = EFeedback::find_by_id(id);
    let query = if deleted {
        query.filter(CFeedback::DeletedAt.is_not_null())
    } else {
        query.filter(CFeedback::DeletedAt.is_null())
    };

    query
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("بازخورد"))
}

async fn managed(db: &DatabaseConnection, user: &MUser) -> WebResult<Vec<Uuid>> {
    if user.role == UserRole::Manager {
        Ok(managed_department_ids(db, user.id).await?)
    } else {
        Ok(vec![])
    }
}

/// Author names for the given rows, used for the views.
async fn author_names(
    db: &DatabaseConnection,
    feedback: &[MFeedback],
) -> WebResult<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = feedback.iter().map(|f| f.user_id).collect();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = EUser::find().filter(CUser::Id.is_in(ids)).all(db).await?;
    Ok(users.into_iter().map(|u| (u.id, u.name)).collect())
}

async fn into_views(
    db: &DatabaseConnection,
    page: Page<MFeedback>,
    viewer: &MUser,
) -> WebResult<Page<FeedbackView>> {
    let names = author_names(db, &page.items).await?;

    Ok(Page {
        items: page
            .items
            .into_iter()
            .map(|f| {
                let name = names.get(&f.user_id).cloned();
                FeedbackView::new(f, viewer, name)
            })
            .collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    })
}

async fn single_view(
    db: &DatabaseConnection,
    feedback: MFeedback,
    viewer: &MUser,
) -> WebResult<FeedbackView> {
    let names = author_names(db, std::slice::from_ref(&feedback)).await?;
    let name = names.get(&feedback.user_id).cloned();
    Ok(FeedbackView::new(feedback, viewer, name))
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<FeedbackFilter>,
) -> WebResult<Json<BaseResponse<Page<FeedbackView>>>> {
    let managed = managed(&state.db, &user).await?;
    let query = list_query(&user, &managed, false, &filter);
    let page = paginate(&state.db, query, filter.page, filter.per_page).await?;

    Ok(respond(into_views(&state.db, page, &user).await?))
}

pub async fn get_trash(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<FeedbackFilter>,
) -> WebResult<Json<BaseResponse<Page<FeedbackView>>>> {
    require_admin(&user)?;

    let query = list_query(&user, &[], true, &filter);
    let page = paginate(&state.db, query, filter.page, filter.per_page).await?;

    Ok(respond(into_views(&state.db, page, &user).await?))
}

pub async fn get_analytics(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<FeedbackFilter>,
) -> WebResult<Json<BaseResponse<FeedbackAnalytics>>> {
    require_admin(&user)?;

    let feedback = list_query(&user, &[], false, &filter).all(&state.db).await?;
    let departments = EDepartment::find()
        .filter(CDepartment::DeletedAt.is_null())
        .all(&state.db)
        .await?;

    Ok(respond(analyze(&feedback, &departments, &state.cli.keywords())))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeFeedbackRequest>,
) -> WebResult<Json<BaseResponse<FeedbackView>>> {
    let title = validate_title(&body.title)?;
    let content = validate_content(&body.content)?;
    let department = find_department(&state.db, body.department_id).await?;
    let routing = route_new_feedback(&department);

    let now = now();
    let afeedback = AFeedback {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        content: Set(content),
        kind: Set(body.kind),
        priority: Set(body.priority.unwrap_or(FeedbackPriority::Medium)),
        anonymous: Set(body.anonymous),
        status: Set(routing.status),
        department_id: Set(department.id),
        user_id: Set(user.id),
        forwarded_to_id: Set(routing.forwarded_to_id),
        response: Set(None),
        responded_by_id: Set(None),
        responded_at: Set(None),
        attachments: Set(body.attachments),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let feedback = afeedback.insert(&state.db).await?;

    if let Some(manager) = routing.forwarded_to_id {
        let draft = NotificationDraft::new(
            NotificationType::Feedback,
            "بازخورد جدید",
            format!("{}: {}", type_label(feedback.kind), feedback.title),
        )
        .with_link(feedback_link(feedback.id));

        notify_users(&state.db, &[manager], &draft).await?;
    }

    tracing::info!("Feedback {} created with status {:?}", feedback.id, feedback.status);
    Ok(respond(single_view(&state.db, feedback, &user).await?))
}

pub async fn get_feedback(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<FeedbackView>>> {
    let feedback = find_feedback(&state.db, id, false).await?;
    let managed = managed(&state.db, &user).await?;

    if !can_view_feedback(&user, &feedback, &managed) {
        return Err(WebError::not_found("بازخورد"));
    }

    Ok(respond(single_view(&state.db, feedback, &user).await?))
}

pub async fn patch_feedback(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchFeedbackRequest>,
) -> WebResult<Json<BaseResponse<FeedbackView>>> {
    let feedback = find_feedback(&state.db, id, false).await?;
    let managed = managed(&state.db, &user).await?;

    if !can_handle_feedback(&user, &feedback, &managed) {
        return Err(Denied::forbidden().into());
    }

    let author = feedback.user_id;
    let previous = feedback.status;
    let mut afeedback = feedback.into_active_model();

    if let Some(status) = body.status {
        check_transition(previous, status)?;
        afeedback.status = Set(status);
    }

    if let Some(priority) = body.priority {
        afeedback.priority = Set(priority);
    }

    afeedback.updated_at = Set(now());
    let feedback = afeedback.update(&state.db).await?;

    if feedback.status != previous {
        let draft = NotificationDraft::new(
            NotificationType::Feedback,
            "تغییر وضعیت بازخورد",
            format!("{}: {}", feedback.title, status_label(feedback.status)),
        )
        .with_link(feedback_link(feedback.id));

        notify_users(&state.db, &[author], &draft).await?;
    }

    Ok(respond(single_view(&state.db, feedback, &user).await?))
}

pub async fn delete_feedback(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let feedback = find_feedback(&state.db, id, false).await?;

    if !can_delete_feedback(&user, &feedback) {
        return Err(Denied::forbidden().into());
    }

    let now = now();
    let mut afeedback = feedback.into_active_model();
    afeedback.deleted_at = Set(Some(now));
    afeedback.updated_at = Set(now);
    afeedback.update(&state.db).await?;

    Ok(respond("بازخورد به سطل بازیافت منتقل شد".to_string()))
}

pub async fn post_forward(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ForwardFeedbackRequest>,
) -> WebResult<Json<BaseResponse<FeedbackView>>> {
    require_admin(&user)?;

    let feedback = find_feedback(&state.db, id, false).await?;
    let target = EUser::find_by_id(body.user_id)
        .one(&state.db)
        .await?
        .filter(|u| u.is_available())
        .ok_or_else(|| WebError::not_found("کاربر"))?;

    if target.role == UserRole::Employee {
        return Err(WebError::BadRequest(
            "بازخورد فقط به مدیران قابل ارجاع است".to_string(),
        ));
    }

    let previous = feedback.status;
    let mut afeedback = feedback.into_active_model();
    afeedback.forwarded_to_id = Set(Some(target.id));
    if previous == FeedbackStatus::Pending {
        afeedback.status = Set(FeedbackStatus::Reviewed);
    }
    afeedback.updated_at = Set(now());
    let feedback = afeedback.update(&state.db).await?;

    let draft = NotificationDraft::new(
        NotificationType::Feedback,
        "ارجاع بازخورد",
        format!("بازخورد «{}» به شما ارجاع شد", feedback.title),
    )
    .with_link(feedback_link(feedback.id));
    notify_users(&state.db, &[target.id], &draft).await?;

    tracing::info!("Feedback {} forwarded to {}", feedback.id, target.id);
    Ok(respond(single_view(&state.db, feedback, &user).await?))
}

pub async fn post_respond(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondFeedbackRequest>,
) -> WebResult<Json<BaseResponse<FeedbackView>>> {
    let feedback = find_feedback(&state.db, id, false).await?;

    if !user.is_admin() && feedback.forwarded_to_id != Some(user.id) {
        return Err(Denied::forbidden().into());
    }

    let response = require_text("پاسخ", &body.response, MAX_CONTENT_LENGTH)?;

    let author = feedback.user_id;
    let previous = feedback.status;
    let mut afeedback = feedback.into_active_model();

    if let Some(status) = body.status {
        check_transition(previous, status)?;
        afeedback.status = Set(status);
    }

    let now = now();
    afeedback.response = Set(Some(response));
    afeedback.responded_by_id = Set(Some(user.id));
    afeedback.responded_at = Set(Some(now));
    afeedback.updated_at = Set(now);
    let feedback = afeedback.update(&state.db).await?;

    let draft = NotificationDraft::new(
        NotificationType::Feedback,
        "پاسخ به بازخورد",
        format!("به بازخورد «{}» پاسخ داده شد", feedback.title),
    )
    .with_link(feedback_link(feedback.id));
    notify_users(&state.db, &[author], &draft).await?;

    Ok(respond(single_view(&state.db, feedback, &user).await?))
}

pub async fn post_restore(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<FeedbackView>>> {
    require_admin(&user)?;

    let feedback = find_feedback(&state.db, id, true).await?;
    let mut afeedback = feedback.into_active_model();
    afeedback.deleted_at = Set(None);
    afeedback.updated_at = Set(now());
    let feedback = afeedback.update(&state.db).await?;

    Ok(respond(single_view(&state.db, feedback, &user).await?))
}

pub async fn delete_purge(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_admin(&user)?;

    let feedback = find_feedback(&state.db, id, true).await?;
    EFeedback::delete_by_id(feedback.id).exec(&state.db).await?;

    tracing::info!("Feedback {} purged by {}", id, user.id);
    Ok(respond("بازخورد برای همیشه حذف شد".to_string()))
}
