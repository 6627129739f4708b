/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::assessments::{Answers, Outcome};
use super::input::{load_secret, normalize_mobile, validate_password};
use super::types::*;
use anyhow::{Context, Result};
use chrono::Utc;
use entity::user::UserRole;
use migration::Migrator;
use password_auth::generate_hash;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select,
    SqlErr,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::log::LevelFilter;
use uuid::Uuid;

pub async fn connect_db(cli: &Cli) -> Result<DatabaseConnection> {
    let db_url = if let Some(file) = &cli.database_url_file {
        load_secret(file)
    } else if let Some(url) = &cli.database_url {
        url.clone()
    } else {
        anyhow::bail!("No database url provided")
    };

    if db_url.is_empty() {
        anyhow::bail!("Database url is empty");
    }

    let mut opt = ConnectOptions::new(db_url);

    // SQL statements are only logged at debug level
    if cli.log_level == "debug" {
        opt.sqlx_logging(true).sqlx_logging_level(LevelFilter::Debug);
    } else {
        opt.sqlx_logging(false);
    }

    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300));

    let db = Database::connect(opt)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;
    seed_admin(&db, cli).await?;
    Ok(db)
}

/// Creates the initial admin account when none exists and one is configured.
pub async fn seed_admin(db: &DatabaseConnection, cli: &Cli) -> Result<()> {
    let existing = EUser::find()
        .filter(CUser::Role.eq(UserRole::Admin))
        .filter(CUser::DeletedAt.is_null())
        .count(db)
        .await
        .context("Failed to query admin users")?;

    if existing > 0 {
        return Ok(());
    }

    let (Some(mobile), Some(password_file)) = (&cli.admin_mobile, &cli.admin_password_file) else {
        tracing::warn!("No admin account exists and none is configured");
        return Ok(());
    };

    let mobile = normalize_mobile(mobile).context("Invalid admin mobile number")?;
    let password = load_secret(password_file);
    validate_password(&password).context("Invalid admin password")?;

    let now = Utc::now().naive_utc();
    let auser = AUser {
        id: Set(Uuid::new_v4()),
        name: Set(cli.admin_name.clone()),
        mobile: Set(mobile.clone()),
        password: Set(generate_hash(&password)),
        role: Set(UserRole::Admin),
        department_id: Set(None),
        avatar: Set(None),
        active: Set(true),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    auser
        .insert(db)
        .await
        .context("Failed to create admin user")?;

    tracing::info!("Created admin account for {}", mobile);
    Ok(())
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Active, non-deleted users of `department`, or of the whole company.
pub fn active_users(department: Option<Uuid>) -> Select<EUser> {
    let query = EUser::find()
        .filter(CUser::Active.eq(true))
        .filter(CUser::DeletedAt.is_null());

    match department {
        Some(department) => query.filter(CUser::DepartmentId.eq(department)),
        None => query,
    }
}

pub async fn target_user_ids<C: ConnectionTrait>(
    db: &C,
    department: Option<Uuid>,
) -> Result<Vec<Uuid>, DbErr> {
    active_users(department)
        .select_only()
        .column(CUser::Id)
        .into_tuple()
        .all(db)
        .await
}

/// Departments whose manager is `user_id`.
pub async fn managed_department_ids<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    EDepartment::find()
        .filter(CDepartment::ManagerId.eq(user_id))
        .filter(CDepartment::DeletedAt.is_null())
        .select_only()
        .column(CDepartment::Id)
        .into_tuple()
        .all(db)
        .await
}

pub async fn find_progress<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    assessment_id: Uuid,
) -> Result<Option<MAssessmentProgress>, DbErr> {
    EAssessmentProgress::find()
        .filter(CAssessmentProgress::UserId.eq(user_id))
        .filter(CAssessmentProgress::AssessmentId.eq(assessment_id))
        .one(db)
        .await
}

/// Keeps at most one progress row per user and assessment. The write is a
/// single upsert so it can run inside a caller's transaction on Postgres.
/// Saving progress always reopens the attempt, clearing `completed_at`.
pub async fn save_progress<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    assessment_id: Uuid,
    answers: &Answers,
    current_question: i32,
) -> Result<MAssessmentProgress, DbErr> {
    let now = Utc::now().naive_utc();
    let answers = serde_json::to_value(answers).map_err(|e| DbErr::Json(e.to_string()))?;

    let aprogress = AAssessmentProgress {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        assessment_id: Set(assessment_id),
        answers: Set(answers),
        current_question: Set(current_question),
        started_at: Set(now),
        updated_at: Set(now),
        completed_at: Set(None),
    };

    EAssessmentProgress::insert(aprogress)
        .on_conflict(
            OnConflict::columns([CAssessmentProgress::UserId, CAssessmentProgress::AssessmentId])
                .update_columns([
                    CAssessmentProgress::Answers,
                    CAssessmentProgress::CurrentQuestion,
                    CAssessmentProgress::UpdatedAt,
                    CAssessmentProgress::CompletedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(db)
        .await
}

/// Stores the outcome of a completed assessment, replacing an earlier one,
/// and marks the matching progress row as completed.
pub async fn save_result<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    assessment_id: Uuid,
    outcome: &Outcome,
) -> Result<MAssessmentResult, DbErr> {
    let now = Utc::now().naive_utc();

    let aresult = AAssessmentResult {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        assessment_id: Set(assessment_id),
        outcome: Set(outcome.to_json()),
        summary: Set(outcome.summary.clone()),
        completed_at: Set(now),
    };

    let result = EAssessmentResult::insert(aresult)
        .on_conflict(
            OnConflict::columns([CAssessmentResult::UserId, CAssessmentResult::AssessmentId])
                .update_columns([
                    CAssessmentResult::Outcome,
                    CAssessmentResult::Summary,
                    CAssessmentResult::CompletedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(db)
        .await?;

    EAssessmentProgress::update_many()
        .col_expr(CAssessmentProgress::CompletedAt, Expr::value(Some(now)))
        .col_expr(CAssessmentProgress::UpdatedAt, Expr::value(now))
        .filter(CAssessmentProgress::UserId.eq(user_id))
        .filter(CAssessmentProgress::AssessmentId.eq(assessment_id))
        .exec(db)
        .await?;

    Ok(result)
}

/// Returns `false` when the user had already seen the announcement.
pub async fn record_view<C: ConnectionTrait>(
    db: &C,
    announcement_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    let aview = AAnnouncementView {
        id: Set(Uuid::new_v4()),
        announcement_id: Set(announcement_id),
        user_id: Set(user_id),
        viewed_at: Set(Utc::now().naive_utc()),
    };

    match aview.insert(db).await {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e),
    }
}
