/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for database helpers against a mock connection

use chrono::NaiveDate;
use clap::Parser;
use common::assessments::{Answers, Outcome};
use common::database::*;
use common::types::*;
use entity::assessment::AssessmentType;
use entity::user::UserRole;
use migration::Migrator;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, MockDatabase,
    MockExecResult, QueryTrait, TransactionTrait, Value,
};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn progress(user_id: Uuid, assessment_id: Uuid, completed_at: Option<chrono::NaiveDateTime>) -> MAssessmentProgress {
    MAssessmentProgress {
        id: Uuid::new_v4(),
        user_id,
        assessment_id,
        answers: json!({}),
        current_question: 0,
        started_at: timestamp(),
        updated_at: timestamp(),
        completed_at,
    }
}

fn outcome() -> Outcome {
    Outcome {
        scores: BTreeMap::from([("E".to_string(), 1.0), ("I".to_string(), 0.0)]),
        total_score: 1.0,
        summary: "ESTJ".to_string(),
    }
}

/// Statement log with Debug escaping removed so quoted identifiers match.
fn statement_log(db: DatabaseConnection) -> String {
    format!("{:?}", db.into_transaction_log()).replace("\\\"", "\"")
}

fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(count))])
}

#[test]
fn test_active_users_query() {
    let department = Uuid::new_v4();
    let sql = active_users(Some(department))
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""user"."active" = TRUE"#));
    assert!(sql.contains(r#""user"."deleted_at" IS NULL"#));
    assert!(sql.contains(&department.to_string()));

    let sql = active_users(None).build(DatabaseBackend::Postgres).to_string();
    assert!(!sql.contains("department_id\" ="));
}

#[tokio::test]
async fn test_target_user_ids() -> Result<(), DbErr> {
    let ids = [Uuid::new_v4(), Uuid::new_v4()];
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([ids.map(|id| BTreeMap::from([("id", Value::from(id))]))])
        .into_connection();

    assert_eq!(target_user_ids(&db, None).await?, ids.to_vec());
    Ok(())
}

#[tokio::test]
async fn test_seed_admin_skipped_when_admin_exists() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(1)]])
        .into_connection();

    let cli = Cli::try_parse_from([
        "intranet-server",
        "--jwt-secret-file",
        "/run/secrets/jwt",
        "--admin-mobile",
        "09121234567",
        "--admin-password-file",
        "/nonexistent",
    ])
    .unwrap();

    assert!(seed_admin(&db, &cli).await.is_ok());
    assert_eq!(db.into_transaction_log().len(), 1);
}

#[tokio::test]
async fn test_save_progress_inserts_new_row() -> Result<(), DbErr> {
    let user_id = Uuid::new_v4();
    let assessment_id = Uuid::new_v4();
    let question = Uuid::new_v4();
    let answers: Answers = [(question, "E".to_string())].into_iter().collect();

    let stored = MAssessmentProgress {
        id: Uuid::new_v4(),
        user_id,
        assessment_id,
        answers: json!({ question.to_string(): "E" }),
        current_question: 1,
        started_at: timestamp(),
        updated_at: timestamp(),
        completed_at: None,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .into_connection();

    let progress = save_progress(&db, user_id, assessment_id, &answers, 1).await?;

    assert_eq!(progress, stored);
    Ok(())
}

#[tokio::test]
async fn test_save_progress_upserts_and_reopens_attempt() -> Result<(), DbErr> {
    let user_id = Uuid::new_v4();
    let assessment_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![progress(user_id, assessment_id, None)]])
        .into_connection();

    let saved = save_progress(&db, user_id, assessment_id, &Answers::new(), 0).await?;
    assert_eq!(saved.completed_at, None);

    let log = statement_log(db);
    assert_eq!(log.matches("INSERT INTO").count(), 1);
    assert!(log.contains(r#"ON CONFLICT ("user_id", "assessment_id") DO UPDATE SET"#));
    assert!(log.contains(r#""completed_at" = "excluded"."completed_at""#));
    assert!(log.contains(r#""answers" = "excluded"."answers""#));
    assert!(!log.contains(r#""started_at" = "excluded""#));
    assert!(log.contains("RETURNING"));
    Ok(())
}

#[tokio::test]
async fn test_completion_after_saved_progress_in_one_transaction() -> Result<(), DbErr> {
    let user_id = Uuid::new_v4();
    let assessment_id = Uuid::new_v4();

    let result = MAssessmentResult {
        id: Uuid::new_v4(),
        user_id,
        assessment_id,
        outcome: outcome().to_json(),
        summary: "ESTJ".to_string(),
        completed_at: timestamp(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![progress(user_id, assessment_id, None)]])
        .append_query_results([vec![progress(user_id, assessment_id, None)]])
        .append_query_results([vec![result.clone()]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    // progress saved earlier through PUT /progress
    save_progress(&db, user_id, assessment_id, &Answers::new(), 0).await?;

    let txn = db.begin().await?;
    save_progress(&txn, user_id, assessment_id, &Answers::new(), 3).await?;
    let stored = save_result(&txn, user_id, assessment_id, &outcome()).await?;
    txn.commit().await?;

    assert_eq!(stored, result);

    let log = statement_log(db);
    assert_eq!(log.matches("ON CONFLICT").count(), 3);
    assert!(log.contains(r#"ON CONFLICT ("user_id", "assessment_id") DO UPDATE SET "outcome" = "excluded"."outcome""#));
    assert!(log.contains(r#"UPDATE "assessment_progress" SET "completed_at""#));
    // no lookups that would follow a failed insert
    assert!(!log.contains("SELECT"));
    Ok(())
}

/// Runs only when `INTRANET_TEST_DATABASE_URL` points at a disposable Postgres database.
async fn postgres() -> Option<DatabaseConnection> {
    let url = std::env::var("INTRANET_TEST_DATABASE_URL").ok()?;
    let db = Database::connect(url).await.expect("connect to test database");
    Migrator::up(&db, None).await.expect("run migrations");
    Some(db)
}

#[tokio::test]
async fn test_postgres_completion_after_saved_progress() -> Result<(), DbErr> {
    let Some(db) = postgres().await else {
        return Ok(());
    };

    let now = chrono::Utc::now().naive_utc();
    let user = AUser {
        id: Set(Uuid::new_v4()),
        name: Set("Test User".to_string()),
        mobile: Set(format!("09{:09}", Uuid::new_v4().as_u128() % 1_000_000_000)),
        password: Set(String::new()),
        role: Set(UserRole::Employee),
        department_id: Set(None),
        avatar: Set(None),
        active: Set(true),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&db)
    .await?;

    let assessment = AAssessment {
        id: Set(Uuid::new_v4()),
        title: Set("MBTI".to_string()),
        description: Set(None),
        kind: Set(AssessmentType::Mbti),
        time_limit: Set(None),
        active: Set(true),
        created_by_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&db)
    .await?;

    let question = Uuid::new_v4();
    let answers: Answers = [(question, "E".to_string())].into_iter().collect();

    save_progress(&db, user.id, assessment.id, &Answers::new(), 0).await?;

    for _ in 0..2 {
        let txn = db.begin().await?;
        save_progress(&txn, user.id, assessment.id, &answers, 1).await?;
        save_result(&txn, user.id, assessment.id, &outcome()).await?;
        txn.commit().await?;

        let stored = find_progress(&db, user.id, assessment.id).await?;
        assert!(stored.is_some_and(|p| p.completed_at.is_some()));
    }

    // a retake reopens the attempt
    let reopened = save_progress(&db, user.id, assessment.id, &answers, 1).await?;
    assert_eq!(reopened.completed_at, None);
    Ok(())
}

#[tokio::test]
async fn test_record_view_first_time() -> Result<(), DbErr> {
    let view = MAnnouncementView {
        id: Uuid::new_v4(),
        announcement_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        viewed_at: timestamp(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![view.clone()]])
        .into_connection();

    assert!(record_view(&db, view.announcement_id, view.user_id).await?);
    Ok(())
}

#[test]
fn test_unique_violation_detection_ignores_other_errors() {
    assert!(!is_unique_violation(&DbErr::Custom("duplicate key".to_string())));
    assert!(!is_unique_violation(&DbErr::RecordNotFound("user".to_string())));
}
