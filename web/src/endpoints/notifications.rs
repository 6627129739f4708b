/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{paginate, respond};
use crate::error::{WebError, WebResult};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use common::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    pub unread: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PatchNotificationRequest {
    pub read: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UnreadCount {
    pub count: u64,
}

/// Notifications of other users are reported as missing.
async fn find_own(db: &DatabaseConnection, id: Uuid, user: &MUser) -> WebResult<MNotification> {
    ENotification::find_by_id(id)
        .filter(CNotification::UserId.eq(user.id))
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("اعلان"))
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<NotificationFilter>,
) -> WebResult<Json<BaseResponse<Page<MNotification>>>> {
    let mut query = ENotification::find().filter(CNotification::UserId.eq(user.id));

    if filter.unread == Some(true) {
        query = query.filter(CNotification::Read.eq(false));
    }

    let page = paginate(
        &state.db,
        query.order_by_desc(CNotification::CreatedAt),
        filter.page,
        filter.per_page,
    )
    .await?;

    Ok(respond(page))
}

pub async fn get_unread(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
) -> WebResult<Json<BaseResponse<UnreadCount>>> {
    let count = ENotification::find()
        .filter(CNotification::UserId.eq(user.id))
        .filter(CNotification::Read.eq(false))
        .count(&state.db)
        .await?;

    Ok(respond(UnreadCount { count }))
}

pub async fn post_read_all(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
) -> WebResult<Json<BaseResponse<u64>>> {
    let result = ENotification::update_many()
        .col_expr(CNotification::Read, Expr::value(true))
        .filter(CNotification::UserId.eq(user.id))
        .filter(CNotification::Read.eq(false))
        .exec(&state.db)
        .await?;

    Ok(respond(result.rows_affected))
}

pub async fn patch_notification(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchNotificationRequest>,
) -> WebResult<Json<BaseResponse<MNotification>>> {
    let notification = find_own(&state.db, id, &user).await?;

    let mut anotification = notification.into_active_model();
    anotification.read = Set(body.read);

    Ok(respond(anotification.update(&state.db).await?))
}

pub async fn delete_notification(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let notification = find_own(&state.db, id, &user).await?;
    notification.delete(&state.db).await?;

    Ok(respond("اعلان حذف شد".to_string()))
}
