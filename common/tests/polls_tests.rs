/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for poll voting and results aggregation

use chrono::{Duration, NaiveDate, NaiveDateTime};
use common::polls::*;
use common::types::*;
use entity::poll::{PollType, PollVisibility, ResultsVisibility};
use entity::user::UserRole;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn poll(kind: PollType) -> MPoll {
    MPoll {
        id: Uuid::new_v4(),
        title: "رضایت از سرویس".to_string(),
        description: None,
        kind,
        visibility: PollVisibility::Anonymous,
        show_results: ResultsVisibility::Always,
        department_id: None,
        created_by_id: Uuid::new_v4(),
        min_rating: None,
        max_rating: None,
        active: true,
        starts_at: now() - Duration::days(1),
        ends_at: Some(now() + Duration::days(1)),
        created_at: now() - Duration::days(2),
        updated_at: now() - Duration::days(2),
        deleted_at: None,
    }
}

fn option(poll_id: Uuid, text: &str, position: i32) -> MPollOption {
    MPollOption {
        id: Uuid::new_v4(),
        poll_id,
        text: text.to_string(),
        position,
    }
}

fn response(poll_id: Uuid, user_id: Uuid) -> MPollResponse {
    MPollResponse {
        id: Uuid::new_v4(),
        poll_id,
        user_id,
        option_id: None,
        rating: None,
        text: None,
        created_at: now(),
    }
}

fn user(role: UserRole, department_id: Option<Uuid>) -> MUser {
    MUser {
        id: Uuid::new_v4(),
        name: "رضا محمدی".to_string(),
        mobile: "09191234567".to_string(),
        password: String::new(),
        role,
        department_id,
        avatar: None,
        active: true,
        last_login_at: None,
        created_at: now(),
        updated_at: now(),
        deleted_at: None,
    }
}

#[test]
fn test_response_rate() {
    assert_eq!(response_rate(0, 0), 0);
    assert_eq!(response_rate(5, 0), 0);
    assert_eq!(response_rate(1, 3), 33);
    assert_eq!(response_rate(2, 3), 67);
    assert_eq!(response_rate(10, 10), 100);
}

#[test]
fn test_rating_average_and_histogram() {
    let mut rating_poll = poll(PollType::RatingScale);
    rating_poll.min_rating = Some(1);
    rating_poll.max_rating = Some(5);

    let responses: Vec<MPollResponse> = [3, 3, 5]
        .into_iter()
        .map(|rating| MPollResponse {
            rating: Some(rating),
            ..response(rating_poll.id, Uuid::new_v4())
        })
        .collect();

    let summary = summarize_ratings(1, 5, &responses);

    assert_eq!(summary.average, 3.67);
    assert_eq!(summary.count, 3);
    assert_eq!(summary.histogram.len(), 5);
    assert_eq!(summary.histogram[2], RatingBucket { rating: 3, count: 2 });
    assert_eq!(summary.histogram[4], RatingBucket { rating: 5, count: 1 });
    assert_eq!(summary.histogram[0].count, 0);

    let mut eligible: HashSet<Uuid> = responses.iter().map(|r| r.user_id).collect();
    eligible.extend((0..3).map(|_| Uuid::new_v4()));

    let results = aggregate(&rating_poll, &[], &responses, &eligible, &HashMap::new());
    assert_eq!(results.unique_respondents, 3);
    assert_eq!(results.eligible_users, 6);
    assert_eq!(results.response_rate, 50);
    assert!(matches!(results.tally, Tally::Rating(ref s) if s.average == 3.67));
}

#[test]
fn test_rating_ignores_out_of_range_values() {
    let poll_id = Uuid::new_v4();
    let responses: Vec<MPollResponse> = [0, 4, 9]
        .into_iter()
        .map(|rating| MPollResponse {
            rating: Some(rating),
            ..response(poll_id, Uuid::new_v4())
        })
        .collect();

    let summary = summarize_ratings(1, 5, &responses);
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, 4.0);

    let empty = summarize_ratings(1, 5, &[]);
    assert_eq!(empty.average, 0.0);
}

#[test]
fn test_choice_tally_uses_respondents() {
    let choice_poll = poll(PollType::MultipleChoice);
    let second = option(choice_poll.id, "ناهار", 2);
    let first = option(choice_poll.id, "صبحانه", 1);
    let unused = option(choice_poll.id, "شام", 3);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let responses = vec![
        MPollResponse {
            option_id: Some(first.id),
            ..response(choice_poll.id, alice)
        },
        MPollResponse {
            option_id: Some(second.id),
            ..response(choice_poll.id, alice)
        },
        MPollResponse {
            option_id: Some(first.id),
            ..response(choice_poll.id, bob)
        },
    ];

    let tally = tally_choices(&[second.clone(), unused.clone(), first.clone()], &responses);

    assert_eq!(tally.len(), 3);
    assert_eq!(tally[0].option_id, first.id);
    assert_eq!(tally[0].votes, 2);
    assert_eq!(tally[0].percentage, 100);
    assert_eq!(tally[1].votes, 1);
    assert_eq!(tally[1].percentage, 50);
    assert_eq!(tally[2].option_id, unused.id);
    assert_eq!(tally[2].percentage, 0);

    let results = aggregate(
        &choice_poll,
        &[first, second, unused],
        &responses,
        &HashSet::new(),
        &HashMap::new(),
    );
    assert_eq!(results.total_responses, 3);
    assert_eq!(results.unique_respondents, 2);
    assert_eq!(results.response_rate, 0);
}

#[test]
fn test_response_rate_ignores_voters_outside_population() {
    let choice_poll = poll(PollType::SingleChoice);
    let yes = option(choice_poll.id, "بله", 1);

    let member = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let responses = vec![
        MPollResponse {
            option_id: Some(yes.id),
            ..response(choice_poll.id, member)
        },
        MPollResponse {
            option_id: Some(yes.id),
            ..response(choice_poll.id, admin)
        },
    ];

    let eligible = HashSet::from([member]);
    let results = aggregate(&choice_poll, &[yes], &responses, &eligible, &HashMap::new());

    assert_eq!(results.unique_respondents, 2);
    assert_eq!(results.eligible_users, 1);
    assert_eq!(results.eligible_respondents, 1);
    assert_eq!(results.response_rate, 100);
}

#[test]
fn test_text_answers_names_only_for_public_polls() {
    let mut text_poll = poll(PollType::TextInput);
    let author = Uuid::new_v4();
    let older = MPollResponse {
        text: Some("قدیمی".to_string()),
        created_at: now() - Duration::hours(1),
        ..response(text_poll.id, author)
    };
    let newer = MPollResponse {
        text: Some("جدید".to_string()),
        ..response(text_poll.id, author)
    };
    let names = HashMap::from([(author, "نگار".to_string())]);

    let answers = text_answers(&text_poll, &[older.clone(), newer.clone()], &names);
    assert_eq!(answers[0].text, "جدید");
    assert_eq!(answers[1].text, "قدیمی");
    assert!(answers.iter().all(|a| a.respondent.is_none()));

    text_poll.visibility = PollVisibility::Public;
    let answers = text_answers(&text_poll, &[older, newer], &names);
    assert_eq!(answers[0].respondent.as_deref(), Some("نگار"));
}

#[test]
fn test_department_rates() {
    let mut it = MDepartment {
        id: Uuid::new_v4(),
        name: "فناوری".to_string(),
        description: None,
        manager_id: None,
        allow_direct_feedback: false,
        allowed_poll_departments: vec![],
        created_at: now(),
        updated_at: now(),
        deleted_at: None,
    };
    let empty = MDepartment {
        id: Uuid::new_v4(),
        name: "انبار".to_string(),
        ..it.clone()
    };
    it.name = "فناوری اطلاعات".to_string();

    let members: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let deactivated = Uuid::new_v4();
    let eligible = HashMap::from([(it.id, members.iter().copied().collect::<HashSet<Uuid>>())]);
    let respondents: HashSet<Uuid> = members[..3].iter().copied().chain([deactivated]).collect();
    let rates = department_rates(&[it.clone(), empty.clone()], &eligible, &respondents);

    assert_eq!(rates[0].eligible_users, 4);
    assert_eq!(rates[0].respondents, 3);
    assert_eq!(rates[0].response_rate, 75);
    assert_eq!(rates[1].respondents, 0);
    assert_eq!(rates[1].eligible_users, 0);
    assert_eq!(rates[1].response_rate, 0);
}

#[test]
fn test_results_visibility() {
    let mut p = poll(PollType::SingleChoice);
    let employee = user(UserRole::Employee, None);
    let admin = user(UserRole::Admin, None);
    let mut creator = user(UserRole::Manager, None);
    creator.id = p.created_by_id;

    assert!(results_visible(&p, &employee, false, now()));

    p.show_results = ResultsVisibility::AfterVote;
    assert!(!results_visible(&p, &employee, false, now()));
    assert!(results_visible(&p, &employee, true, now()));

    p.show_results = ResultsVisibility::AfterClose;
    assert!(!results_visible(&p, &employee, true, now()));
    assert!(results_visible(&p, &employee, false, now() + Duration::days(2)));
    p.active = false;
    assert!(results_visible(&p, &employee, false, now()));

    p.show_results = ResultsVisibility::AdminOnly;
    assert!(!results_visible(&p, &employee, true, now()));
    assert!(results_visible(&p, &admin, false, now()));
    assert!(results_visible(&p, &creator, false, now()));
}

#[test]
fn test_vote_validation_choices() {
    let single = poll(PollType::SingleChoice);
    let a = option(single.id, "بله", 1);
    let b = option(single.id, "خیر", 2);
    let options = [a.clone(), b.clone()];
    let voter = user(UserRole::Employee, None);

    let ballot = |ids: Vec<Uuid>| Ballot {
        option_ids: ids,
        ..Default::default()
    };

    assert_eq!(
        validate_vote(&single, &options, &voter, false, now(), ballot(vec![a.id])),
        Ok(Vote::Choices(vec![a.id]))
    );
    assert_eq!(
        validate_vote(&single, &options, &voter, false, now(), ballot(vec![a.id, b.id])),
        Err(PollError::SingleChoiceRequired)
    );
    assert_eq!(
        validate_vote(&single, &options, &voter, false, now(), ballot(vec![])),
        Err(PollError::ChoiceRequired)
    );
    assert_eq!(
        validate_vote(&single, &options, &voter, false, now(), ballot(vec![Uuid::new_v4()])),
        Err(PollError::UnknownOption)
    );
    assert_eq!(
        validate_vote(&single, &options, &voter, true, now(), ballot(vec![a.id])),
        Err(PollError::AlreadyVoted)
    );

    let multiple = MPoll {
        kind: PollType::MultipleChoice,
        ..single.clone()
    };
    assert_eq!(
        validate_vote(&multiple, &options, &voter, false, now(), ballot(vec![a.id, b.id, a.id])),
        Ok(Vote::Choices(vec![a.id, b.id]))
    );
}

#[test]
fn test_vote_validation_window_and_department() {
    let dept = Uuid::new_v4();
    let mut p = poll(PollType::TextInput);
    let voter = user(UserRole::Employee, Some(dept));
    let text = || Ballot {
        text: Some("خوب بود".to_string()),
        ..Default::default()
    };

    assert!(validate_vote(&p, &[], &voter, false, now(), text()).is_ok());
    assert_eq!(
        validate_vote(&p, &[], &voter, false, now() + Duration::days(3), text()),
        Err(PollError::Closed)
    );
    assert_eq!(
        validate_vote(&p, &[], &voter, false, now() - Duration::days(3), text()),
        Err(PollError::Closed)
    );

    p.department_id = Some(Uuid::new_v4());
    assert_eq!(
        validate_vote(&p, &[], &voter, false, now(), text()),
        Err(PollError::NotEligible)
    );

    p.department_id = Some(dept);
    p.active = false;
    assert_eq!(
        validate_vote(&p, &[], &voter, false, now(), text()),
        Err(PollError::Closed)
    );
}

#[test]
fn test_vote_validation_rating_and_text() {
    let mut rating = poll(PollType::RatingScale);
    rating.min_rating = Some(1);
    rating.max_rating = Some(10);
    let voter = user(UserRole::Employee, None);

    let rate = |value: Option<i32>| Ballot {
        rating: value,
        ..Default::default()
    };

    assert_eq!(
        validate_vote(&rating, &[], &voter, false, now(), rate(Some(10))),
        Ok(Vote::Rating(10))
    );
    assert_eq!(
        validate_vote(&rating, &[], &voter, false, now(), rate(Some(11))),
        Err(PollError::RatingOutOfRange { min: 1, max: 10 })
    );
    assert_eq!(
        validate_vote(&rating, &[], &voter, false, now(), rate(None)),
        Err(PollError::RatingOutOfRange { min: 1, max: 10 })
    );

    let text_poll = poll(PollType::TextInput);
    let say = |text: &str| Ballot {
        text: Some(text.to_string()),
        ..Default::default()
    };

    assert_eq!(
        validate_vote(&text_poll, &[], &voter, false, now(), say("  عالی  ")),
        Ok(Vote::Text("عالی".to_string()))
    );
    assert_eq!(
        validate_vote(&text_poll, &[], &voter, false, now(), say("   ")),
        Err(PollError::TextRequired)
    );
    assert_eq!(
        validate_vote(&text_poll, &[], &voter, false, now(), say(&"ا".repeat(2001))),
        Err(PollError::TextTooLong(2000))
    );
}

#[test]
fn test_ballot_deserialization() {
    let ballot: Ballot = serde_json::from_str(r#"{"rating": 4}"#).unwrap();
    assert!(ballot.option_ids.is_empty());
    assert_eq!(ballot.rating, Some(4));
}
