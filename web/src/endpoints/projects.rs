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
use chrono::NaiveDate;
use common::input::{check_range, optional_text, validate_title};
use common::permission::{check_department_publishing, check_owner_or_admin, is_visible_to};
use common::types::*;
use entity::project::ProjectStatus;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub department_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakeProjectRequest {
    pub title: String,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub progress: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<Uuid>>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
}

pub fn check_project_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> WebResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(WebError::BadRequest(
            "تاریخ پایان پروژه نمی‌تواند قبل از تاریخ شروع باشد".to_string(),
        )),
        _ => Ok(()),
    }
}

fn check_progress(progress: i32) -> WebResult<()> {
    Ok(check_range("پیشرفت", progress as i64, 0, 100)?)
}

async fn find_project(db: &DatabaseConnection, id: Uuid) -> WebResult<MProject> {
    EProject::find_by_id(id)
        .filter(CProject::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("پروژه"))
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<ProjectFilter>,
) -> WebResult<Json<BaseResponse<Page<MProject>>>> {
    let mut query = EProject::find().filter(CProject::DeletedAt.is_null());

    if !user.is_admin() {
        let mut scope = Condition::any().add(CProject::DepartmentId.is_null());
        if let Some(department_id) = user.department_id {
            scope = scope.add(CProject::DepartmentId.eq(department_id));
        }
        query = query.filter(scope);
    }

    if let Some(status) = filter.status {
        query = query.filter(CProject::Status.eq(status));
    }

    if let Some(department_id) = filter.department_id {
        query = query.filter(CProject::DepartmentId.eq(department_id));
    }

    let page = paginate(
        &state.db,
        query.order_by_desc(CProject::UpdatedAt),
        filter.page,
        filter.per_page,
    )
    .await?;

    Ok(respond(page))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeProjectRequest>,
) -> WebResult<Json<BaseResponse<MProject>>> {
    check_department_publishing(&user, body.department_id)?;

    let title = validate_title(&body.title)?;
    let description = optional_text("توضیحات", body.description.as_deref(), 5000)?;
    check_progress(body.progress)?;
    check_project_dates(body.start_date, body.end_date)?;

    if let Some(department_id) = body.department_id {
        find_department(&state.db, department_id).await?;
    }

    let now = now();
    let project = AProject {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        department_id: Set(body.department_id),
        status: Set(body.status),
        progress: Set(body.progress),
        start_date: Set(body.start_date),
        end_date: Set(body.end_date),
        created_by_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&state.db)
    .await?;

    Ok(respond(project))
}

pub async fn get_project(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<MProject>>> {
    let project = find_project(&state.db, id).await?;

    if !is_visible_to(&user, project.department_id) {
        return Err(WebError::not_found("پروژه"));
    }

    Ok(respond(project))
}

pub async fn patch_project(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchProjectRequest>,
) -> WebResult<Json<BaseResponse<MProject>>> {
    let project = find_project(&state.db, id).await?;
    check_owner_or_admin(&user, project.created_by_id)?;

    let start_date = body.start_date.unwrap_or(project.start_date);
    let end_date = body.end_date.unwrap_or(project.end_date);
    check_project_dates(start_date, end_date)?;

    let mut aproject = project.into_active_model();

    if let Some(title) = body.title {
        aproject.title = Set(validate_title(&title)?);
    }

    if let Some(description) = body.description {
        aproject.description = Set(optional_text("توضیحات", Some(description.as_str()), 5000)?);
    }

    if let Some(department_id) = body.department_id {
        check_department_publishing(&user, department_id)?;
        if let Some(department_id) = department_id {
            find_department(&state.db, department_id).await?;
        }
        aproject.department_id = Set(department_id);
    }

    if let Some(status) = body.status {
        aproject.status = Set(status);
    }

    if let Some(progress) = body.progress {
        check_progress(progress)?;
        aproject.progress = Set(progress);
    }

    aproject.start_date = Set(start_date);
    aproject.end_date = Set(end_date);
    aproject.updated_at = Set(now());

    Ok(respond(aproject.update(&state.db).await?))
}

pub async fn delete_project(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let project = find_project(&state.db, id).await?;
    check_owner_or_admin(&user, project.created_by_id)?;

    let now = now();
    let mut aproject = project.into_active_model();
    aproject.deleted_at = Set(Some(now));
    aproject.updated_at = Set(now);
    aproject.update(&state.db).await?;

    Ok(respond("پروژه حذف شد".to_string()))
}
