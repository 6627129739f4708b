/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod support;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use common::polls::Ballot;
use common::types::*;
use entity::poll::{PollType, PollVisibility, ResultsVisibility};
use entity::user::UserRole;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;
use web::endpoints::polls::*;
use web::error::WebError;

fn poll_request(department_id: Option<Uuid>, options: &[&str]) -> MakePollRequest {
    MakePollRequest {
        title: "ناهار جمعه".to_string(),
        description: None,
        kind: PollType::SingleChoice,
        visibility: PollVisibility::Anonymous,
        show_results: ResultsVisibility::AfterVote,
        department_id,
        options: options.iter().map(|o| o.to_string()).collect(),
        min_rating: None,
        max_rating: None,
        starts_at: None,
        ends_at: None,
    }
}

#[tokio::test]
async fn test_employee_cannot_create_poll() {
    // An empty mock fails every query, so a Forbidden result also proves
    // the request was rejected before touching the database.
    let state = support::create_mock_state(support::empty_db());
    let employee = support::user(UserRole::Employee, Some(Uuid::new_v4()));

    let result = post(
        State(state),
        Extension(employee.clone()),
        Json(poll_request(employee.department_id, &["بله", "خیر"])),
    )
    .await;

    assert!(matches!(result, Err(WebError::Forbidden(_))));
}

#[tokio::test]
async fn test_manager_cannot_target_unlisted_department() {
    let own = Uuid::new_v4();
    let allowed = Uuid::new_v4();
    let manager = support::user(UserRole::Manager, Some(own));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![support::department(own, Some(manager.id), vec![allowed])]])
        .into_connection();

    let result = post(
        State(support::create_mock_state(db)),
        Extension(manager),
        Json(poll_request(Some(Uuid::new_v4()), &["بله", "خیر"])),
    )
    .await;

    assert!(matches!(result, Err(WebError::Forbidden(_))));
}

#[tokio::test]
async fn test_manager_cannot_create_company_wide_poll() {
    let own = Uuid::new_v4();
    let manager = support::user(UserRole::Manager, Some(own));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![support::department(own, Some(manager.id), vec![own])]])
        .into_connection();

    let result = post(
        State(support::create_mock_state(db)),
        Extension(manager),
        Json(poll_request(None, &["بله", "خیر"])),
    )
    .await;

    assert!(matches!(result, Err(WebError::Forbidden(_))));
}

#[tokio::test]
async fn test_manager_listed_department_passes_permission_check() {
    let own = Uuid::new_v4();
    let allowed = Uuid::new_v4();
    let manager = support::user(UserRole::Manager, Some(own));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![support::department(own, Some(manager.id), vec![allowed])]])
        .into_connection();

    // A single option fails validation, which only runs after the role check.
    let result = post(
        State(support::create_mock_state(db)),
        Extension(manager),
        Json(poll_request(Some(allowed), &["تنها گزینه"])),
    )
    .await;

    assert!(matches!(result, Err(WebError::BadRequest(_))));
}

fn open_poll() -> MPoll {
    let now = Utc::now().naive_utc();
    MPoll {
        id: Uuid::new_v4(),
        title: "ناهار جمعه".to_string(),
        description: None,
        kind: PollType::SingleChoice,
        visibility: PollVisibility::Anonymous,
        show_results: ResultsVisibility::AfterVote,
        department_id: None,
        created_by_id: Uuid::new_v4(),
        min_rating: None,
        max_rating: None,
        active: true,
        starts_at: now - Duration::days(1),
        ends_at: None,
        created_at: now - Duration::days(1),
        updated_at: now - Duration::days(1),
        deleted_at: None,
    }
}

fn vote_db(poll: &MPoll, choice: &MPollOption, previous_votes: i64) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll.clone()]])
        .append_query_results([vec![choice.clone()]])
        .append_query_results([[BTreeMap::from([("num_items", Value::from(previous_votes))])]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
}

fn statement_log(state: Arc<ServerState>) -> (usize, String) {
    let state = Arc::into_inner(state).unwrap();
    let log = state.db.into_transaction_log();
    (log.len(), format!("{:?}", log))
}

#[tokio::test]
async fn test_vote_checks_and_inserts_under_poll_lock() {
    let poll = open_poll();
    let choice = MPollOption {
        id: Uuid::new_v4(),
        poll_id: poll.id,
        text: "بله".to_string(),
        position: 1,
    };
    let state = support::create_mock_state(vote_db(&poll, &choice, 0));
    let employee = support::user(UserRole::Employee, Some(Uuid::new_v4()));

    let result = post_response(
        State(state.clone()),
        Extension(employee),
        Path(poll.id),
        Json(Ballot {
            option_ids: vec![choice.id],
            rating: None,
            text: None,
        }),
    )
    .await;
    assert!(result.is_ok());

    // lock, option lookup, voted check and insert share one transaction
    let (transactions, log) = statement_log(state);
    assert_eq!(transactions, 1);
    assert!(log.contains("FOR UPDATE"));
    assert!(log.contains("INSERT INTO"));
}

#[tokio::test]
async fn test_second_vote_rejected_inside_lock() {
    let poll = open_poll();
    let choice = MPollOption {
        id: Uuid::new_v4(),
        poll_id: poll.id,
        text: "بله".to_string(),
        position: 1,
    };
    let state = support::create_mock_state(vote_db(&poll, &choice, 1));
    let employee = support::user(UserRole::Employee, None);

    let result = post_response(
        State(state.clone()),
        Extension(employee),
        Path(poll.id),
        Json(Ballot {
            option_ids: vec![choice.id],
            rating: None,
            text: None,
        }),
    )
    .await;
    assert!(matches!(result, Err(WebError::Conflict(_))));

    let (_, log) = statement_log(state);
    assert!(log.contains("FOR UPDATE"));
    assert!(!log.contains("INSERT INTO"));
}

#[tokio::test]
async fn test_results_of_missing_poll() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<common::types::MPoll>::new()])
        .into_connection();
    let admin = support::user(UserRole::Admin, None);

    let result = get_results(
        State(support::create_mock_state(db)),
        Extension(admin),
        Path(Uuid::new_v4()),
    )
    .await;

    assert!(matches!(result, Err(WebError::NotFound(_))));
}

#[test]
fn test_validate_options() {
    let options = vec!["الف".to_string(), " الف ".to_string(), "ب".to_string()];
    assert_eq!(
        validate_options(PollType::MultipleChoice, &options).unwrap(),
        vec!["الف".to_string(), "ب".to_string()]
    );

    assert!(validate_options(PollType::SingleChoice, &["الف".to_string()]).is_err());
    assert!(validate_options(PollType::SingleChoice, &["الف".to_string(), " ".to_string()]).is_err());

    let too_many: Vec<String> = (0..21).map(|i| format!("گزینه {}", i)).collect();
    assert!(validate_options(PollType::SingleChoice, &too_many).is_err());

    assert!(validate_options(PollType::TextInput, &[]).unwrap().is_empty());
}

#[test]
fn test_validate_rating_bounds() {
    assert_eq!(
        validate_rating_bounds(PollType::RatingScale, None, None).unwrap(),
        (Some(1), Some(5))
    );
    assert_eq!(
        validate_rating_bounds(PollType::RatingScale, Some(0), Some(10)).unwrap(),
        (Some(0), Some(10))
    );
    assert!(validate_rating_bounds(PollType::RatingScale, Some(5), Some(5)).is_err());
    assert!(validate_rating_bounds(PollType::RatingScale, Some(1), Some(11)).is_err());
    assert_eq!(
        validate_rating_bounds(PollType::TextInput, Some(1), Some(5)).unwrap(),
        (None, None)
    );
}

#[test]
fn test_make_poll_request_defaults() {
    let request: MakePollRequest =
        serde_json::from_str(r#"{"title":"رضایت","type":"RATING_SCALE"}"#).unwrap();

    assert_eq!(request.kind, PollType::RatingScale);
    assert_eq!(request.visibility, PollVisibility::Anonymous);
    assert_eq!(request.show_results, ResultsVisibility::AfterVote);
    assert!(request.options.is_empty());
    assert!(request.department_id.is_none());
}
