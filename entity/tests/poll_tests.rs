/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for poll entity

use chrono::{Duration, NaiveDate};
use entity::*;
use uuid::Uuid;

fn poll_model() -> poll::Model {
    let start = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    poll::Model {
        id: Uuid::new_v4(),
        title: "رضایت از سرویس ناهار".to_owned(),
        description: None,
        kind: poll::PollType::RatingScale,
        visibility: poll::PollVisibility::Anonymous,
        show_results: poll::ResultsVisibility::Always,
        department_id: None,
        created_by_id: Uuid::new_v4(),
        min_rating: Some(1),
        max_rating: Some(5),
        active: true,
        starts_at: start,
        ends_at: Some(start + Duration::days(7)),
        created_at: start,
        updated_at: start,
        deleted_at: None,
    }
}

#[test]
fn test_poll_open_window() {
    let poll = poll_model();

    assert!(!poll.is_open(poll.starts_at - Duration::minutes(1)));
    assert!(poll.is_open(poll.starts_at));
    assert!(poll.is_open(poll.starts_at + Duration::days(3)));
    assert!(!poll.is_open(poll.starts_at + Duration::days(7)));
}

#[test]
fn test_poll_closed_when_inactive_or_deleted() {
    let mut poll = poll_model();
    let now = poll.starts_at + Duration::hours(1);

    poll.active = false;
    assert!(!poll.is_open(now));

    poll.active = true;
    poll.deleted_at = Some(now);
    assert!(!poll.is_open(now));
}

#[test]
fn test_poll_without_end_stays_open() {
    let mut poll = poll_model();
    poll.ends_at = None;

    assert!(poll.is_open(poll.starts_at + Duration::days(365)));
}

#[test]
fn test_poll_serializes_type_field() {
    let json = serde_json::to_value(poll_model()).unwrap();

    assert_eq!(json["type"], "RATING_SCALE");
    assert_eq!(json["minRating"], 1);
    assert_eq!(json["showResults"], "ALWAYS");
}
