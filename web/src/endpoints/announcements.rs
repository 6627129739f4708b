/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::departments::find_department;
use super::{double_option, now, paginate, respond};
use crate::error::{WebError, WebResult};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDateTime;
use common::database::{record_view, target_user_ids};
use common::input::{validate_content, validate_title};
use common::notifications::{NotificationDraft, notify_users};
use common::permission::{check_department_publishing, check_owner_or_admin, is_visible_to};
use common::types::*;
use entity::notification::NotificationType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementFilter {
    pub department_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakeAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<Uuid>>,
    pub attachments: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementItem {
    #[serde(flatten)]
    pub announcement: MAnnouncement,
    pub viewed: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub user_id: Uuid,
    pub name: String,
    pub viewed_at: NaiveDateTime,
}

async fn find_announcement(db: &DatabaseConnection, id: Uuid) -> WebResult<MAnnouncement> {
    EAnnouncement::find_by_id(id)
        .filter(CAnnouncement::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("اطلاعیه"))
}

async fn find_visible(db: &DatabaseConnection, id: Uuid, user: &MUser) -> WebResult<MAnnouncement> {
    let announcement = find_announcement(db, id).await?;

    if !is_visible_to(user, announcement.department_id) {
        return Err(WebError::not_found("اطلاعیه"));
    }

    Ok(announcement)
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<AnnouncementFilter>,
) -> WebResult<Json<BaseResponse<Page<AnnouncementItem>>>> {
    let mut query = EAnnouncement::find().filter(CAnnouncement::DeletedAt.is_null());

    if !user.is_admin() {
        let mut scope = Condition::any().add(CAnnouncement::DepartmentId.is_null());
        if let Some(department_id) = user.department_id {
            scope = scope.add(CAnnouncement::DepartmentId.eq(department_id));
        }
        query = query.filter(scope);
    }

    if let Some(department_id) = filter.department_id {
        query = query.filter(CAnnouncement::DepartmentId.eq(department_id));
    }

    let query = query
        .order_by_desc(CAnnouncement::Pinned)
        .order_by_desc(CAnnouncement::CreatedAt);
    let page = paginate(&state.db, query, filter.page, filter.per_page).await?;

    let ids: Vec<Uuid> = page.items.iter().map(|a| a.id).collect();
    let seen: HashSet<Uuid> = if ids.is_empty() {
        HashSet::new()
    } else {
        EAnnouncementView::find()
            .filter(CAnnouncementView::UserId.eq(user.id))
            .filter(CAnnouncementView::AnnouncementId.is_in(ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|v| v.announcement_id)
            .collect()
    };

    Ok(respond(Page {
        items: page
            .items
            .into_iter()
            .map(|announcement| AnnouncementItem {
                viewed: seen.contains(&announcement.id),
                announcement,
            })
            .collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeAnnouncementRequest>,
) -> WebResult<Json<BaseResponse<MAnnouncement>>> {
    check_department_publishing(&user, body.department_id)?;

    let title = validate_title(&body.title)?;
    let content = validate_content(&body.content)?;

    if let Some(department_id) = body.department_id {
        find_department(&state.db, department_id).await?;
    }

    let now = now();
    let aannouncement = AAnnouncement {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        content: Set(content),
        department_id: Set(body.department_id),
        created_by_id: Set(user.id),
        attachments: Set(body.attachments),
        pinned: Set(body.pinned),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let announcement = aannouncement.insert(&state.db).await?;

    let recipients: Vec<Uuid> = target_user_ids(&state.db, announcement.department_id)
        .await?
        .into_iter()
        .filter(|id| *id != user.id)
        .collect();
    let draft = NotificationDraft::new(
        NotificationType::Announcement,
        "اطلاعیه جدید",
        announcement.title.clone(),
    )
    .with_link(format!("/announcements/{}", announcement.id));
    notify_users(&state.db, &recipients, &draft).await?;

    Ok(respond(announcement))
}

pub async fn get_announcement(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<MAnnouncement>>> {
    Ok(respond(find_visible(&state.db, id, &user).await?))
}

pub async fn patch_announcement(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchAnnouncementRequest>,
) -> WebResult<Json<BaseResponse<MAnnouncement>>> {
    let announcement = find_announcement(&state.db, id).await?;
    check_owner_or_admin(&user, announcement.created_by_id)?;

    let mut aannouncement = announcement.into_active_model();

    if let Some(title) = body.title {
        aannouncement.title = Set(validate_title(&title)?);
    }

    if let Some(content) = body.content {
        aannouncement.content = Set(validate_content(&content)?);
    }

    if let Some(department_id) = body.department_id {
        check_department_publishing(&user, department_id)?;
        if let Some(department_id) = department_id {
            find_department(&state.db, department_id).await?;
        }
        aannouncement.department_id = Set(department_id);
    }

    if let Some(attachments) = body.attachments {
        aannouncement.attachments = Set(attachments);
    }

    if let Some(pinned) = body.pinned {
        aannouncement.pinned = Set(pinned);
    }

    aannouncement.updated_at = Set(now());
    Ok(respond(aannouncement.update(&state.db).await?))
}

pub async fn delete_announcement(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let announcement = find_announcement(&state.db, id).await?;
    check_owner_or_admin(&user, announcement.created_by_id)?;

    let now = now();
    let mut aannouncement = announcement.into_active_model();
    aannouncement.deleted_at = Set(Some(now));
    aannouncement.updated_at = Set(now);
    aannouncement.update(&state.db).await?;

    Ok(respond("اطلاعیه حذف شد".to_string()))
}

pub async fn post_view(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<bool>>> {
    let announcement = find_visible(&state.db, id, &user).await?;
    let first_view = record_view(&state.db, announcement.id, user.id).await?;

    Ok(respond(first_view))
}

pub async fn get_viewers(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<Vec<Viewer>>>> {
    let announcement = find_announcement(&state.db, id).await?;
    check_owner_or_admin(&user, announcement.created_by_id)?;

    let views = EAnnouncementView::find()
        .filter(CAnnouncementView::AnnouncementId.eq(announcement.id))
        .order_by_desc(CAnnouncementView::ViewedAt)
        .all(&state.db)
        .await?;

    let user_ids: Vec<Uuid> = views.iter().map(|v| v.user_id).collect();
    let names: HashMap<Uuid, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        EUser::find()
            .filter(CUser::Id.is_in(user_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    let viewers = views
        .into_iter()
        .map(|v| Viewer {
            name: names.get(&v.user_id).cloned().unwrap_or_default(),
            user_id: v.user_id,
            viewed_at: v.viewed_at,
        })
        .collect();

    Ok(respond(viewers))
}
