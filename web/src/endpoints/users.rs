/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{double_option, now, paginate, respond};
use crate::error::{WebError, WebResult};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use common::database::is_unique_violation;
use common::input::{normalize_mobile, normalize_persian, validate_display_name, validate_password};
use common::permission::{Denied, check_user_deletion, require_admin};
use common::types::*;
use entity::user::UserRole;
use password_auth::generate_hash;
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
pub struct UserFilter {
    pub department_id: Option<Uuid>,
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakeUserRequest {
    pub name: String,
    pub mobile: String,
    pub password: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
    pub avatar: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchUserRequest {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    pub active: Option<bool>,
}

impl PatchUserRequest {
    /// Fields only an admin may change.
    fn touches_account(&self) -> bool {
        self.mobile.is_some()
            || self.password.is_some()
            || self.role.is_some()
            || self.department_id.is_some()
            || self.active.is_some()
    }
}

async fn find_user(db: &DatabaseConnection, id: Uuid) -> WebResult<MUser> {
    EUser::find_by_id(id)
        .filter(CUser::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("کاربر"))
}

async fn check_department(db: &DatabaseConnection, department_id: Option<Uuid>) -> WebResult<()> {
    if let Some(department_id) = department_id {
        EDepartment::find_by_id(department_id)
            .filter(CDepartment::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| WebError::not_found("واحد"))?;
    }

    Ok(())
}

fn duplicate_mobile(err: sea_orm::DbErr) -> WebError {
    if is_unique_violation(&err) {
        WebError::already_exists("شماره موبایل")
    } else {
        err.into()
    }
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<UserFilter>,
) -> WebResult<Json<BaseResponse<Page<MUser>>>> {
    let mut query = EUser::find().filter(CUser::DeletedAt.is_null());

    match user.role {
        UserRole::Admin => {}
        UserRole::Manager => {
            let Some(department_id) = user.department_id else {
                return Err(Denied::forbidden().into());
            };
            query = query.filter(CUser::DepartmentId.eq(department_id));
        }
        UserRole::Employee => return Err(Denied::forbidden().into()),
    }

    if let Some(department_id) = filter.department_id {
        query = query.filter(CUser::DepartmentId.eq(department_id));
    }

    if let Some(role) = filter.role {
        query = query.filter(CUser::Role.eq(role));
    }

    if let Some(search) = filter.search.as_deref().map(normalize_persian) {
        if !search.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(CUser::Name.contains(&search))
                    .add(CUser::Mobile.contains(&search)),
            );
        }
    }

    let page = paginate(
        &state.db,
        query.order_by_asc(CUser::Name),
        filter.page,
        filter.per_page,
    )
    .await?;

    Ok(respond(page))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeUserRequest>,
) -> WebResult<Json<BaseResponse<MUser>>> {
    require_admin(&user)?;

    let name = validate_display_name(&body.name)?;
    let mobile = normalize_mobile(&body.mobile)?;
    validate_password(&body.password)?;
    check_department(&state.db, body.department_id).await?;

    let now = now();
    let auser = AUser {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        mobile: Set(mobile),
        password: Set(generate_hash(&body.password)),
        role: Set(body.role),
        department_id: Set(body.department_id),
        avatar: Set(body.avatar),
        active: Set(true),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let created = auser.insert(&state.db).await.map_err(duplicate_mobile)?;
    tracing::info!("User {} created by {}", created.id, user.id);

    Ok(respond(created))
}

pub async fn get_user(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<MUser>>> {
    if id == user.id {
        return Ok(respond(user));
    }

    let target = find_user(&state.db, id).await?;

    let allowed = user.is_admin()
        || (user.is_manager()
            && user.department_id.is_some()
            && user.department_id == target.department_id);

    if !allowed {
        return Err(Denied::forbidden().into());
    }

    Ok(respond(target))
}

pub async fn patch_user(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchUserRequest>,
) -> WebResult<Json<BaseResponse<MUser>>> {
    if id != user.id || body.touches_account() {
        require_admin(&user)?;
    }

    let target = if id == user.id {
        user.clone()
    } else {
        find_user(&state.db, id).await?
    };

    if target.id == user.id && (body.role.is_some() || body.active == Some(false)) {
        return Err(WebError::BadRequest(
            "امکان تغییر نقش یا غیرفعال کردن حساب خودتان وجود ندارد".to_string(),
        ));
    }

    let mut auser = target.into_active_model();

    if let Some(name) = body.name {
        auser.name = Set(validate_display_name(&name)?);
    }

    if let Some(mobile) = body.mobile {
        auser.mobile = Set(normalize_mobile(&mobile)?);
    }

    if let Some(password) = body.password {
        validate_password(&password)?;
        auser.password = Set(generate_hash(&password));
    }

    if let Some(role) = body.role {
        auser.role = Set(role);
    }

    if let Some(department_id) = body.department_id {
        check_department(&state.db, department_id).await?;
        auser.department_id = Set(department_id);
    }

    if let Some(avatar) = body.avatar {
        auser.avatar = Set(avatar);
    }

    if let Some(active) = body.active {
        auser.active = Set(active);
    }

    auser.updated_at = Set(now());
    let updated = auser.update(&state.db).await.map_err(duplicate_mobile)?;

    Ok(respond(updated))
}

pub async fn delete_user(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_admin(&user)?;

    let target = if id == user.id {
        user.clone()
    } else {
        find_user(&state.db, id).await?
    };

    check_user_deletion(&user, &target)?;

    let now = now();
    let mut auser = target.into_active_model();
    auser.active = Set(false);
    auser.deleted_at = Set(Some(now));
    auser.updated_at = Set(now);
    auser.update(&state.db).await?;

    tracing::info!("User {} deleted by {}", id, user.id);
    Ok(respond("کاربر حذف شد".to_string()))
}
