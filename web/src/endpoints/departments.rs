/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{double_option, now, respond};
use crate::error::{WebError, WebResult};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use common::database::is_unique_violation;
use common::input::{optional_text, require_text};
use common::permission::require_admin;
use common::types::*;
use entity::user::UserRole;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakeDepartmentRequest {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    #[serde(default)]
    pub allow_direct_feedback: bool,
    #[serde(default)]
    pub allowed_poll_departments: Vec<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchDepartmentRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<Uuid>>,
    pub allow_direct_feedback: Option<bool>,
    pub allowed_poll_departments: Option<Vec<Uuid>>,
}

pub(crate) async fn find_department(db: &DatabaseConnection, id: Uuid) -> WebResult<MDepartment> {
    EDepartment::find_by_id(id)
        .filter(CDepartment::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("واحد"))
}

async fn check_manager(db: &DatabaseConnection, manager_id: Option<Uuid>) -> WebResult<()> {
    let Some(manager_id) = manager_id else {
        return Ok(());
    };

    let manager = EUser::find_by_id(manager_id)
        .one(db)
        .await?
        .filter(|u| u.is_available())
        .ok_or_else(|| WebError::not_found("مدیر"))?;

    if manager.role == UserRole::Employee {
        return Err(WebError::BadRequest(
            "مدیر واحد باید نقش مدیر یا مدیر سیستم داشته باشد".to_string(),
        ));
    }

    Ok(())
}

async fn check_poll_targets(db: &DatabaseConnection, ids: &[Uuid]) -> WebResult<Vec<Uuid>> {
    let mut targets: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !targets.contains(id) {
            targets.push(*id);
        }
    }

    if targets.is_empty() {
        return Ok(targets);
    }

    let found = EDepartment::find()
        .filter(CDepartment::Id.is_in(targets.clone()))
        .filter(CDepartment::DeletedAt.is_null())
        .all(db)
        .await?;

    if found.len() != targets.len() {
        return Err(WebError::not_found("واحد"));
    }

    Ok(targets)
}

fn duplicate_name(err: sea_orm::DbErr) -> WebError {
    if is_unique_violation(&err) {
        WebError::already_exists("نام واحد")
    } else {
        err.into()
    }
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(_user): Extension<MUser>,
) -> WebResult<Json<BaseResponse<Vec<MDepartment>>>> {
    let departments = EDepartment::find()
        .filter(CDepartment::DeletedAt.is_null())
        .order_by_asc(CDepartment::Name)
        .all(&state.db)
        .await?;

    Ok(respond(departments))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeDepartmentRequest>,
) -> WebResult<Json<BaseResponse<MDepartment>>> {
    require_admin(&user)?;

    let name = require_text("نام واحد", &body.name, 100)?;
    let description = optional_text("توضیحات", body.description.as_deref(), 1000)?;
    check_manager(&state.db, body.manager_id).await?;
    let allowed = check_poll_targets(&state.db, &body.allowed_poll_departments).await?;

    let now = now();
    let id = Uuid::new_v4();
    let adepartment = ADepartment {
        id: Set(id),
        name: Set(name),
        description: Set(description),
        manager_id: Set(body.manager_id),
        allow_direct_feedback: Set(body.allow_direct_feedback),
        allowed_poll_departments: Set(allowed),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let department = adepartment.insert(&state.db).await.map_err(duplicate_name)?;

    Ok(respond(department))
}

pub async fn get_department(
    state: State<Arc<ServerState>>,
    Extension(_user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<MDepartment>>> {
    Ok(respond(find_department(&state.db, id).await?))
}

pub async fn patch_department(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchDepartmentRequest>,
) -> WebResult<Json<BaseResponse<MDepartment>>> {
    require_admin(&user)?;

    let department = find_department(&state.db, id).await?;
    let mut adepartment = department.into_active_model();

    if let Some(name) = body.name {
        adepartment.name = Set(require_text("نام واحد", &name, 100)?);
    }

    if let Some(description) = body.description {
        adepartment.description = Set(optional_text("توضیحات", description.as_deref(), 1000)?);
    }

    if let Some(manager_id) = body.manager_id {
        check_manager(&state.db, manager_id).await?;
        adepartment.manager_id = Set(manager_id);
    }

    if let Some(allow_direct_feedback) = body.allow_direct_feedback {
        adepartment.allow_direct_feedback = Set(allow_direct_feedback);
    }

    if let Some(allowed) = body.allowed_poll_departments {
        adepartment.allowed_poll_departments = Set(check_poll_targets(&state.db, &allowed).await?);
    }

    adepartment.updated_at = Set(now());
    let department = adepartment.update(&state.db).await.map_err(duplicate_name)?;

    Ok(respond(department))
}

pub async fn delete_department(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_admin(&user)?;

    let department = find_department(&state.db, id).await?;
    let now = now();
    let mut adepartment = department.into_active_model();
    adepartment.deleted_at = Set(Some(now));
    adepartment.updated_at = Set(now);
    adepartment.update(&state.db).await?;

    tracing::info!("Department {} deleted by {}", id, user.id);
    Ok(respond("واحد حذف شد".to_string()))
}
