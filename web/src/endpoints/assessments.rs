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
use common::assessments::*;
use common::database::{find_progress, save_progress, save_result, target_user_ids};
use common::input::{check_range, optional_text, require_text, validate_title};
use common::notifications::{NotificationDraft, notify_users};
use common::permission::require_admin;
use common::types::*;
use entity::assessment::AssessmentType;
use entity::notification::NotificationType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentFilter {
    #[serde(rename = "type")]
    pub kind: Option<AssessmentType>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MakeQuestionRequest {
    pub text: String,
    pub options: Value,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MakeAssessmentRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub time_limit: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub questions: Vec<MakeQuestionRequest>,
}

fn default_active() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchAssessmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub time_limit: Option<Option<i32>>,
    pub active: Option<bool>,
    /// Replaces every question of the assessment.
    pub questions: Option<Vec<MakeQuestionRequest>>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentsRequest {
    pub department_ids: Vec<Uuid>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    #[serde(default)]
    pub answers: Value,
    pub current_question: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub answers: Value,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetails {
    #[serde(flatten)]
    pub assessment: MAssessment,
    pub question_count: usize,
    pub department_ids: Vec<Uuid>,
    pub completed: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub position: i32,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub answers: Answers,
    pub current_question: i32,
    pub answered: usize,
    pub total_questions: usize,
    pub progress: u32,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

impl ProgressView {
    pub fn new(progress: Option<&MAssessmentProgress>, questions: &[MAssessmentQuestion]) -> Self {
        let answers = progress.map(stored_answers).unwrap_or_default();
        let answered = questions
            .iter()
            .filter(|q| answers.contains_key(&q.id))
            .count();

        Self {
            current_question: progress.map(|p| p.current_question).unwrap_or_default(),
            started_at: progress.map(|p| p.started_at),
            completed_at: progress.and_then(|p| p.completed_at),
            progress: progress_percent(answered, questions.len()),
            total_questions: questions.len(),
            answered,
            answers,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(flatten)]
    pub result: MAssessmentResult,
    pub user_name: Option<String>,
}

/// Validates every question and turns the options into the stored form.
pub fn prepare_questions(
    questions: &[MakeQuestionRequest],
) -> WebResult<Vec<(String, Vec<QuestionOption>)>> {
    questions
        .iter()
        .map(|question| {
            let text = require_text("متن سوال", &question.text, 1000)?;
            let options = normalize_options(&question.options)?;
            Ok((text, options))
        })
        .collect()
}

async fn insert_questions<C: ConnectionTrait>(
    db: &C,
    assessment_id: Uuid,
    questions: Vec<(String, Vec<QuestionOption>)>,
) -> WebResult<()> {
    if questions.is_empty() {
        return Ok(());
    }

    let mut rows = Vec::with_capacity(questions.len());
    for (position, (text, options)) in questions.into_iter().enumerate() {
        rows.push(AAssessmentQuestion {
            id: Set(Uuid::new_v4()),
            assessment_id: Set(assessment_id),
            text: Set(text),
            options: Set(serde_json::to_value(options).map_err(anyhow::Error::from)?),
            position: Set(position as i32),
        });
    }

    EAssessmentQuestion::insert_many(rows)
        .exec_without_returning(db)
        .await?;

    Ok(())
}

fn check_time_limit(time_limit: Option<i32>) -> WebResult<()> {
    if let Some(minutes) = time_limit {
        check_range("مدت زمان", minutes as i64, 1, 600)?;
    }

    Ok(())
}

async fn find_assessment(db: &DatabaseConnection, id: Uuid) -> WebResult<MAssessment> {
    EAssessment::find_by_id(id)
        .filter(CAssessment::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| WebError::not_found("آزمون"))
}

async fn assigned_departments(db: &DatabaseConnection, assessment_id: Uuid) -> WebResult<Vec<Uuid>> {
    Ok(EAssessmentAssignment::find()
        .filter(CAssessmentAssignment::AssessmentId.eq(assessment_id))
        .select_only()
        .column(CAssessmentAssignment::DepartmentId)
        .into_tuple()
        .all(db)
        .await?)
}

/// Loads the assessment and hides it from users it is not available to.
async fn find_available(db: &DatabaseConnection, id: Uuid, user: &MUser) -> WebResult<MAssessment> {
    let assessment = find_assessment(db, id).await?;
    let assigned = assigned_departments(db, assessment.id).await?;

    if !is_available_to(&assessment, user, &assigned) {
        return Err(WebError::not_found("آزمون"));
    }

    Ok(assessment)
}

async fn questions_of(db: &DatabaseConnection, assessment_id: Uuid) -> WebResult<Vec<MAssessmentQuestion>> {
    Ok(EAssessmentQuestion::find()
        .filter(CAssessmentQuestion::AssessmentId.eq(assessment_id))
        .order_by_asc(CAssessmentQuestion::Position)
        .all(db)
        .await?)
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Query(filter): Query<AssessmentFilter>,
) -> WebResult<Json<BaseResponse<Page<MAssessment>>>> {
    let mut query = EAssessment::find().filter(CAssessment::DeletedAt.is_null());

    if !user.is_admin() {
        let assigned: Vec<Uuid> = match user.department_id {
            Some(department_id) => EAssessmentAssignment::find()
                .filter(CAssessmentAssignment::DepartmentId.eq(department_id))
                .select_only()
                .column(CAssessmentAssignment::AssessmentId)
                .into_tuple()
                .all(&state.db)
                .await?,
            None => vec![],
        };

        query = query
            .filter(CAssessment::Active.eq(true))
            .filter(CAssessment::Id.is_in(assigned));
    }

    if let Some(kind) = filter.kind {
        query = query.filter(CAssessment::Kind.eq(kind));
    }

    let page = paginate(
        &state.db,
        query.order_by_desc(CAssessment::CreatedAt),
        filter.page,
        filter.per_page,
    )
    .await?;

    Ok(respond(page))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<MakeAssessmentRequest>,
) -> WebResult<Json<BaseResponse<MAssessment>>> {
    require_admin(&user)?;

    let title = validate_title(&body.title)?;
    let description = optional_text("توضیحات", body.description.as_deref(), 2000)?;
    check_time_limit(body.time_limit)?;
    let questions = prepare_questions(&body.questions)?;

    let now = now();
    let txn = state.db.begin().await?;

    let assessment = AAssessment {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        kind: Set(body.kind),
        time_limit: Set(body.time_limit),
        active: Set(body.active),
        created_by_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    insert_questions(&txn, assessment.id, questions).await?;
    txn.commit().await?;

    tracing::info!("Assessment {} created by {}", assessment.id, user.id);
    Ok(respond(assessment))
}

pub async fn get_assessment(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<AssessmentDetails>>> {
    let assessment = find_available(&state.db, id, &user).await?;
    let questions = questions_of(&state.db, assessment.id).await?;
    let department_ids = assigned_departments(&state.db, assessment.id).await?;
    let completed = EAssessmentResult::find()
        .filter(CAssessmentResult::AssessmentId.eq(assessment.id))
        .filter(CAssessmentResult::UserId.eq(user.id))
        .one(&state.db)
        .await?
        .is_some();

    Ok(respond(AssessmentDetails {
        assessment,
        question_count: questions.len(),
        department_ids,
        completed,
    }))
}

pub async fn patch_assessment(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchAssessmentRequest>,
) -> WebResult<Json<BaseResponse<MAssessment>>> {
    require_admin(&user)?;

    let assessment = find_assessment(&state.db, id).await?;
    let questions = body
        .questions
        .as_deref()
        .map(prepare_questions)
        .transpose()?;

    let mut aassessment = assessment.into_active_model();

    if let Some(title) = body.title {
        aassessment.title = Set(validate_title(&title)?);
    }

    if let Some(description) = body.description {
        aassessment.description = Set(optional_text("توضیحات", Some(description.as_str()), 2000)?);
    }

    if let Some(time_limit) = body.time_limit {
        check_time_limit(time_limit)?;
        aassessment.time_limit = Set(time_limit);
    }

    if let Some(active) = body.active {
        aassessment.active = Set(active);
    }

    aassessment.updated_at = Set(now());

    let txn = state.db.begin().await?;
    let assessment = aassessment.update(&txn).await?;

    if let Some(questions) = questions {
        EAssessmentQuestion::delete_many()
            .filter(CAssessmentQuestion::AssessmentId.eq(assessment.id))
            .exec(&txn)
            .await?;
        insert_questions(&txn, assessment.id, questions).await?;
    }

    txn.commit().await?;
    Ok(respond(assessment))
}

pub async fn delete_assessment(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_admin(&user)?;

    let assessment = find_assessment(&state.db, id).await?;
    let now = now();
    let mut aassessment = assessment.into_active_model();
    aassessment.deleted_at = Set(Some(now));
    aassessment.updated_at = Set(now);
    aassessment.update(&state.db).await?;

    Ok(respond("آزمون حذف شد".to_string()))
}

pub async fn put_assignments(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignmentsRequest>,
) -> WebResult<Json<BaseResponse<Vec<Uuid>>>> {
    require_admin(&user)?;

    let assessment = find_assessment(&state.db, id).await?;
    let previous = assigned_departments(&state.db, assessment.id).await?;

    let mut department_ids: Vec<Uuid> = Vec::with_capacity(body.department_ids.len());
    for department_id in body.department_ids {
        if !department_ids.contains(&department_id) {
            find_department(&state.db, department_id).await?;
            department_ids.push(department_id);
        }
    }

    let now = now();
    let txn = state.db.begin().await?;

    EAssessmentAssignment::delete_many()
        .filter(CAssessmentAssignment::AssessmentId.eq(assessment.id))
        .exec(&txn)
        .await?;

    if !department_ids.is_empty() {
        let rows = department_ids.iter().map(|department_id| AAssessmentAssignment {
            id: Set(Uuid::new_v4()),
            assessment_id: Set(assessment.id),
            department_id: Set(*department_id),
            assigned_at: Set(now),
        });

        EAssessmentAssignment::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    let draft = NotificationDraft::new(
        NotificationType::Assessment,
        "آزمون جدید",
        assessment.title.clone(),
    )
    .with_link(format!("/assessments/{}", assessment.id));

    for department_id in department_ids.iter().filter(|d| !previous.contains(d)) {
        let recipients = target_user_ids(&state.db, Some(*department_id)).await?;
        notify_users(&state.db, &recipients, &draft).await?;
    }

    Ok(respond(department_ids))
}

pub async fn get_questions(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<Vec<QuestionView>>>> {
    let assessment = find_available(&state.db, id, &user).await?;
    let questions = questions_of(&state.db, assessment.id).await?;

    let views = questions
        .iter()
        .map(|question| QuestionView {
            id: question.id,
            text: question.text.clone(),
            options: stored_options(question),
            position: question.position,
        })
        .collect();

    Ok(respond(views))
}

pub async fn get_progress(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<ProgressView>>> {
    let assessment = find_available(&state.db, id, &user).await?;
    let questions = questions_of(&state.db, assessment.id).await?;
    let progress = find_progress(&state.db, user.id, assessment.id).await?;

    Ok(respond(ProgressView::new(progress.as_ref(), &questions)))
}

pub async fn put_progress(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProgressRequest>,
) -> WebResult<Json<BaseResponse<ProgressView>>> {
    let assessment = find_available(&state.db, id, &user).await?;
    let questions = questions_of(&state.db, assessment.id).await?;
    let incoming = normalize_answers(&body.answers, &questions)?;

    let existing = find_progress(&state.db, user.id, assessment.id).await?;
    let mut answers = existing.as_ref().map(stored_answers).unwrap_or_default();
    answers.extend(incoming);

    let last_question = questions.len().saturating_sub(1) as i32;
    let current_question = body
        .current_question
        .or(existing.as_ref().map(|p| p.current_question))
        .unwrap_or_default()
        .clamp(0, last_question);

    let progress = save_progress(&state.db, user.id, assessment.id, &answers, current_question).await?;
    Ok(respond(ProgressView::new(Some(&progress), &questions)))
}

pub async fn post_complete(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompleteRequest>,
) -> WebResult<Json<BaseResponse<MAssessmentResult>>> {
    let assessment = find_available(&state.db, id, &user).await?;
    let questions = questions_of(&state.db, assessment.id).await?;
    let incoming = normalize_answers(&body.answers, &questions)?;

    let mut answers = find_progress(&state.db, user.id, assessment.id)
        .await?
        .as_ref()
        .map(stored_answers)
        .unwrap_or_default();
    answers.extend(incoming);

    let outcome = score(assessment.kind, &questions, &answers)?;
    let txn = state.db.begin().await?;
    save_progress(&txn, user.id, assessment.id, &answers, questions.len().saturating_sub(1) as i32)
        .await?;
    let result = save_result(&txn, user.id, assessment.id, &outcome).await?;
    txn.commit().await?;

    tracing::info!("Assessment {} completed by {}: {}", assessment.id, user.id, result.summary);
    Ok(respond(result))
}

pub async fn get_results(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Path(id): Path<Uuid>,
) -> WebResult<Json<BaseResponse<Vec<ResultView>>>> {
    let assessment = find_available(&state.db, id, &user).await?;

    let mut query = EAssessmentResult::find()
        .filter(CAssessmentResult::AssessmentId.eq(assessment.id));
    if !user.is_admin() {
        query = query.filter(CAssessmentResult::UserId.eq(user.id));
    }

    let results = query
        .order_by_desc(CAssessmentResult::CompletedAt)
        .all(&state.db)
        .await?;

    let user_ids: Vec<Uuid> = results.iter().map(|r| r.user_id).collect();
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

    let views = results
        .into_iter()
        .map(|result| ResultView {
            user_name: names.get(&result.user_id).cloned(),
            result,
        })
        .collect();

    Ok(respond(views))
}
