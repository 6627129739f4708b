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
use chrono::NaiveDateTime;
use common::consts::{MAX_POLL_OPTIONS, RATING_BOUNDS};
use common::database::target_user_ids;
use common::input::{optional_text, require_text, validate_title};
use common::notifications::{NotificationDraft, notify_users};
use common::permission::{Denied, check_owner_or_admin, check_poll_creation, is_visible_to};
use common::polls::*;
use common::types::*;
use entity::notification::NotificationType;
use entity::poll::{PollType, PollVisibility, ResultsVisibility};
use entity::user::UserRole;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PollFilter {
    pub active: Option<bool>,
    pub department_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakePollRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: PollType,
    #[serde(default = "default_visibility")]
    pub visibility: PollVisibility,
    #[serde(default = "default_show_results")]
    pub show_results: ResultsVisibility,
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub options: Vec<String>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}

fn default_visibility() -> PollVisibility {
    PollVisibility::Anonymous
}

fn default_show_results() -> ResultsVisibility {
    ResultsVisibility::AfterVote
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchPollRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub show_results: Option<ResultsVisibility>,
    pub active: Option<bool>,
    pub ends_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PollDetails {
    #[serde(flatten)]
    pub poll: MPoll,
    pub options: Vec<MPollOption>,
    pub has_voted: bool,
    pub open: bool,
}

/// Trimmed, non-empty, distinct option texts.
pub fn validate_options(kind: PollType, options: &[String]) -> WebResult<Vec<String>> {
    if !kind.has_options() {
        return Ok(vec![]);
    }

    let mut texts: Vec<String> = Vec::with_capacity(options.len());
    for option in options {
        let text = require_text("گزینه", option, 200)?;
        if !texts.contains(&text) {
            texts.push(text);
        }
    }

    if texts.len() < 2 || texts.len() > MAX_POLL_OPTIONS {
        return Err(WebError::BadRequest(format!(
            "تعداد گزینه‌ها باید بین ۲ و {} باشد",
            MAX_POLL_OPTIONS
        )));
    }

    Ok(texts)
}

/// Rating bounds for rating polls, `None` for the other types.
pub fn validate_rating_bounds(
    kind: PollType,
    min: Option<i32>,
    max: Option<i32>,
) -> WebResult<(Option<i32>, Option<i32>)> {
    if kind != PollType::RatingScale {
        return Ok((None, None));
    }

    let min = min.unwrap_or(DEFAULT_MIN_RATING);
    let max = max.unwrap_or(DEFAULT_MAX_RATING);

    if !RATING_BOUNDS.contains(&min) || !RATING_BOUNDS.contains(&max) || min >= max {
        return Err(WebError::BadRequest(format!(
            "بازه امتیاز باید بین {} و {} باشد",
            RATING_BOUNDS.start(),
            RATING_BOUNDS.end()
        )));
    }

    Ok((Some(min), Some(max)))
}

async fn find_poll(db: &DatabaseConnection, id: Uuid) -> WebResult<MPoll> {
    EPoll::find_by_id(id)
        .filter(CPoll::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("نظرسنجی"))
}

async fn find_visible(db: &DatabaseConnection, id: Uuid, user: &MUser) -> WebResult<MPoll> {
    let poll = find_poll(db, id).await?;

    if !is_visible_to(user, poll.department_id) && user.id != poll.created_by_id {
        return Err(WebError::not_found("نظرسنجی"));
    }

    Ok(poll)
}

async fn poll_options<C: ConnectionTrait>(db: &C, poll_id: Uuid) -> WebResult<Vec<MPollOption>> {
    Ok(EPollOption::find()
        .filter(CPollOption::PollId.eq(poll_id))
        .order_by_asc(CPollOption::Position)
        .all(db)
        .await?)
}

async fn has_voted<C: ConnectionTrait>(db: &C, poll_id: Uuid, user_id: Uuid) -> WebResult<bool> {
    let count = EPollResponse::find()
        .filter(CPollResponse::PollId.eq(poll_id))
        .filter(CPollResponse::UserId.eq(user_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<PollFilter>,
) -> WebResult<Json<BaseResponse<Page<MPoll>>>> {
    let mut query = EPoll::find().filter(CPoll::DeletedAt.is_null());

    if !user.is_admin() {
        let mut scope = Condition::any()
            .add(CPoll::DepartmentId.is_null())
            .add(CPoll::CreatedById.eq(user.id));
        if let Some(department_id) = user.department_id {
            scope = scope.add(CPoll::DepartmentId.eq(department_id));
        }
        query = query.filter(scope);
    }

    if let Some(active) = filter.active {
        query = query.filter(CPoll::Active.eq(active));
    }

    if let Some(department_id) = filter.department_id {
        query = query.filter(CPoll::DepartmentId.eq(department_id));
    }

    let page = paginate(
        &state.db,
        query.order_by_desc(CPoll::CreatedAt),
        filter.page,
        filter.per_page,
    )
    .await?;

    Ok(respond(page))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakePollRequest>,
) -> WebResult<Json<BaseResponse<PollDetails>>> {
    let actor_department = match (user.role, user.department_id) {
        (UserRole::Manager, Some(department_id)) => EDepartment::find_by_id(department_id)
            .filter(CDepartment::DeletedAt.is_null())
            .one(&state.db)
            .await?,
        _ => None,
    };

    check_poll_creation(&user, actor_department.as_ref(), body.department_id)?;

    let title = validate_title(&body.title)?;
    let description = optional_text("توضیحات", body.description.as_deref(), 2000)?;
    let options = validate_options(body.kind, &body.options)?;
    let (min_rating, max_rating) =
        validate_rating_bounds(body.kind, body.min_rating, body.max_rating)?;

    let now = now();
    let starts_at = body.starts_at.unwrap_or(now);
    if body.ends_at.is_some_and(|end| end <= starts_at) {
        return Err(WebError::BadRequest(
            "زمان پایان باید بعد از زمان شروع باشد".to_string(),
        ));
    }

    if let Some(department_id) = body.department_id {
        find_department(&state.db, department_id).await?;
    }

    let poll_id = Uuid::new_v4();
    let txn = state.db.begin().await?;

    let poll = APoll {
        id: Set(poll_id),
        title: Set(title),
        description: Set(description),
        kind: Set(body.kind),
        visibility: Set(body.visibility),
        show_results: Set(body.show_results),
        department_id: Set(body.department_id),
        created_by_id: Set(user.id),
        min_rating: Set(min_rating),
        max_rating: Set(max_rating),
        active: Set(true),
        starts_at: Set(starts_at),
        ends_at: Set(body.ends_at),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut created_options = Vec::with_capacity(options.len());
    for (position, text) in options.into_iter().enumerate() {
        let option = APollOption {
            id: Set(Uuid::new_v4()),
            poll_id: Set(poll_id),
            text: Set(text),
            position: Set(position as i32),
        }
        .insert(&txn)
        .await?;
        created_options.push(option);
    }

    txn.commit().await?;

    let recipients: Vec<Uuid> = target_user_ids(&state.db, poll.department_id)
        .await?
        .into_iter()
        .filter(|id| *id != user.id)
        .collect();
    let draft = NotificationDraft::new(NotificationType::Poll, "نظرسنجی جدید", poll.title.clone())
        .with_link(format!("/polls/{}", poll.id));
    notify_users(&state.db, &recipients, &draft).await?;

    tracing::info!("Poll {} created by {}", poll.id, user.id);
    Ok(respond(PollDetails {
        open: poll.is_open(now),
        poll,
        options: created_options,
        has_voted: false,
    }))
}

pub async fn get_poll(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<PollDetails>>> {
    let poll = find_visible(&state.db, id, &user).await?;
    let options = poll_options(&state.db, poll.id).await?;
    let has_voted = has_voted(&state.db, poll.id, user.id).await?;

    Ok(respond(PollDetails {
        open: poll.is_open(now()),
        poll,
        options,
        has_voted,
    }))
}

pub async fn patch_poll(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchPollRequest>,
) -> WebResult<Json<BaseResponse<MPoll>>> {
    let poll = find_poll(&state.db, id).await?;
    check_owner_or_admin(&user, poll.created_by_id)?;

    if body.ends_at.is_some_and(|end| end <= poll.starts_at) {
        return Err(WebError::BadRequest(
            "زمان پایان باید بعد از زمان شروع باشد".to_string(),
        ));
    }

    let mut apoll = poll.into_active_model();

    if let Some(title) = body.title {
        apoll.title = Set(validate_title(&title)?);
    }

    if let Some(description) = body.description {
        apoll.description = Set(optional_text("توضیحات", Some(description.as_str()), 2000)?);
    }

    if let Some(show_results) = body.show_results {
        apoll.show_results = Set(show_results);
    }

    if let Some(active) = body.active {
        apoll.active = Set(active);
    }

    if let Some(ends_at) = body.ends_at {
        apoll.ends_at = Set(Some(ends_at));
    }

    apoll.updated_at = Set(now());
    Ok(respond(apoll.update(&state.db).await?))
}

pub async fn delete_poll(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let poll = find_poll(&state.db, id).await?;
    check_owner_or_admin(&user, poll.created_by_id)?;

    let now = now();
    let mut apoll = poll.into_active_model();
    apoll.deleted_at = Set(Some(now));
    apoll.updated_at = Set(now);
    apoll.update(&state.db).await?;

    Ok(respond("نظرسنجی حذف شد".to_string()))
}

pub async fn post_response(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<Ballot>,
) -> WebResult<Json<BaseResponse<String>>> {
    // The poll row lock serializes submissions so the voted check holds until commit.
    let txn = state.db.begin().await?;
    let poll = EPoll::find_by_id(id)
        .filter(CPoll::DeletedAt.is_null())
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| WebError::not_found("نظرسنجی"))?;
    let options = poll_options(&txn, poll.id).await?;
    let already_voted = has_voted(&txn, poll.id, user.id).await?;
    let now = now();

    let vote = validate_vote(&poll, &options, &user, already_voted, now, body)?;

    let blank = |option_id: Option<Uuid>, rating: Option<i32>, text: Option<String>| {
        APollResponse {
            id: Set(Uuid::new_v4()),
            poll_id: Set(poll.id),
            user_id: Set(user.id),
            option_id: Set(option_id),
            rating: Set(rating),
            text: Set(text),
            created_at: Set(now),
        }
    };

    let rows: Vec<APollResponse> = match vote {
        Vote::Choices(ids) => ids.into_iter().map(|id| blank(Some(id), None, None)).collect(),
        Vote::Rating(rating) => vec![blank(None, Some(rating), None)],
        Vote::Text(text) => vec![blank(None, None, Some(text))],
    };

    EPollResponse::insert_many(rows)
        .exec_without_returning(&txn)
        .await?;
    txn.commit().await?;

    Ok(respond("پاسخ شما ثبت شد".to_string()))
}

pub async fn get_results(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<PollResults>>> {
    let poll = find_visible(&state.db, id, &user).await?;
    let has_voted = has_voted(&state.db, poll.id, user.id).await?;

    if !results_visible(&poll, &user, has_voted, now()) {
        return Err(Denied::Forbidden("نتایج این نظرسنجی هنوز قابل مشاهده نیست".to_string()).into());
    }

    let options = poll_options(&state.db, poll.id).await?;
    let responses = EPollResponse::find()
        .filter(CPollResponse::PollId.eq(poll.id))
        .all(&state.db)
        .await?;
    let eligible: HashSet<Uuid> = target_user_ids(&state.db, poll.department_id)
        .await?
        .into_iter()
        .collect();

    let respondents = unique_respondents(&responses);
    let names: HashMap<Uuid, String> =
        if poll.visibility == PollVisibility::Public && !respondents.is_empty() {
            EUser::find()
                .filter(CUser::Id.is_in(respondents.iter().copied().collect::<Vec<Uuid>>()))
                .all(&state.db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect()
        } else {
            HashMap::new()
        };

    let mut results = aggregate(&poll, &options, &responses, &eligible, &names);

    if user.is_admin() && poll.department_id.is_none() {
        let departments = EDepartment::find()
            .filter(CDepartment::DeletedAt.is_null())
            .all(&state.db)
            .await?;

        let mut members: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for department in &departments {
            let ids = target_user_ids(&state.db, Some(department.id)).await?;
            members.insert(department.id, ids.into_iter().collect());
        }

        results.departments = Some(department_rates(&departments, &members, &respondents));
    }

    Ok(respond(results))
}
