/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for entity enums

use entity::*;
use sea_orm::ActiveEnum;

#[test]
fn test_role_wire_names() {
    assert_eq!(
        serde_json::to_string(&user::UserRole::Employee).unwrap(),
        "\"EMPLOYEE\""
    );
    assert_eq!(
        serde_json::from_str::<user::UserRole>("\"MANAGER\"").unwrap(),
        user::UserRole::Manager
    );
    assert!(serde_json::from_str::<user::UserRole>("\"manager\"").is_err());
}

#[test]
fn test_feedback_status_values() {
    assert_eq!(feedback::FeedbackStatus::Pending.to_value(), 0);
    assert_eq!(feedback::FeedbackStatus::Archived.to_value(), 4);
    assert_eq!(
        feedback::FeedbackStatus::try_from_value(&1).unwrap(),
        feedback::FeedbackStatus::Reviewed
    );
    assert!(feedback::FeedbackStatus::try_from_value(&9).is_err());
}

#[test]
fn test_poll_enums() {
    assert_eq!(
        serde_json::to_string(&poll::PollType::RatingScale).unwrap(),
        "\"RATING_SCALE\""
    );
    assert_eq!(
        serde_json::to_string(&poll::ResultsVisibility::AfterClose).unwrap(),
        "\"AFTER_CLOSE\""
    );
    assert!(poll::PollType::SingleChoice.has_options());
    assert!(poll::PollType::MultipleChoice.has_options());
    assert!(!poll::PollType::RatingScale.has_options());
    assert!(!poll::PollType::TextInput.has_options());
}

#[test]
fn test_assessment_type_names() {
    assert_eq!(
        serde_json::from_str::<assessment::AssessmentType>("\"MBTI\"").unwrap(),
        assessment::AssessmentType::Mbti
    );
    assert_eq!(
        serde_json::from_str::<assessment::AssessmentType>("\"DISC\"").unwrap(),
        assessment::AssessmentType::Disc
    );
}
