/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{now, paginate, respond};
use crate::error::{WebError, WebResult};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use common::input::{optional_text, validate_content, validate_title};
use common::permission::require_admin;
use common::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFilter {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeUpdateRequest {
    pub title: String,
    pub content: String,
    pub version: Option<String>,
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(_user): Extension<MUser>,
    Query(filter): Query<UpdateFilter>,
) -> WebResult<Json<BaseResponse<Page<MUpdate>>>> {
    let query = EUpdate::find()
        .filter(CUpdate::DeletedAt.is_null())
        .order_by_desc(CUpdate::CreatedAt);

    Ok(respond(paginate(&state.db, query, filter.page, filter.per_page).await?))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeUpdateRequest>,
) -> WebResult<Json<BaseResponse<MUpdate>>> {
    require_admin(&user)?;

    let update = AUpdate {
        id: Set(Uuid::new_v4()),
        title: Set(validate_title(&body.title)?),
        content: Set(validate_content(&body.content)?),
        version: Set(optional_text("نسخه", body.version.as_deref(), 50)?),
        created_by_id: Set(user.id),
        created_at: Set(now()),
        deleted_at: Set(None),
    }
    .insert(&state.db)
    .await?;

    Ok(respond(update))
}

pub async fn delete_update(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_admin(&user)?;

    let update = EUpdate::find_by_id(id)
        .filter(CUpdate::DeletedAt.is_null())
        .one(&state.db)
        .await?
        .ok_or_else(|| WebError::not_found("به‌روزرسانی"))?;

    let mut aupdate = update.into_active_model();
    aupdate.deleted_at = Set(Some(now()));
    aupdate.update(&state.db).await?;

    Ok(respond("به‌روزرسانی حذف شد".to_string()))
}
