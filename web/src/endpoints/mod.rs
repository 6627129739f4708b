/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod announcements;
pub mod assessments;
pub mod auth;
pub mod departments;
pub mod feedback;
pub mod notifications;
pub mod polls;
pub mod projects;
pub mod updates;
pub mod uploads;
pub mod users;

use crate::error::{WebError, WebResult};
use axum::extract::Json;
use chrono::{NaiveDateTime, Utc};
use common::input::page_bounds;
use common::types::{BaseResponse, Page};
use sea_orm::{DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::{Deserialize, Deserializer};

pub async fn handle_404() -> WebError {
    WebError::NotFound("مسیر درخواستی یافت نشد".to_string())
}

pub async fn get_health() -> WebResult<Json<BaseResponse<String>>> {
    let res = BaseResponse {
        error: false,
        message: "200 ALIVE".to_string(),
    };

    Ok(Json(res))
}

pub fn respond<T>(message: T) -> Json<BaseResponse<T>> {
    Json(BaseResponse {
        error: false,
        message,
    })
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub async fn paginate<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: Option<u64>,
    per_page: Option<u64>,
) -> WebResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'static,
{
    let (page, per_page) = page_bounds(page, per_page);
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        items,
        total,
        page,
        per_page,
    })
}
