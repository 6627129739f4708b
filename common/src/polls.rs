/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::consts::MAX_POLL_TEXT_ANSWER_LENGTH;
use super::permission::is_visible_to;
use super::types::*;
use chrono::NaiveDateTime;
use entity::poll::{PollType, PollVisibility, ResultsVisibility};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub const DEFAULT_MIN_RATING: i32 = 1;
pub const DEFAULT_MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("این نظرسنجی در حال حاضر فعال نیست")]
    Closed,
    #[error("شما مجاز به شرکت در این نظرسنجی نیستید")]
    NotEligible,
    #[error("شما قبلاً در این نظرسنجی شرکت کرده‌اید")]
    AlreadyVoted,
    #[error("باید دقیقاً یک گزینه انتخاب شود")]
    SingleChoiceRequired,
    #[error("حداقل یک گزینه باید انتخاب شود")]
    ChoiceRequired,
    #[error("گزینه انتخاب شده معتبر نیست")]
    UnknownOption,
    #[error("امتیاز باید بین {min} و {max} باشد")]
    RatingOutOfRange { min: i32, max: i32 },
    #[error("متن پاسخ الزامی است")]
    TextRequired,
    #[error("متن پاسخ نباید بیشتر از {0} کاراکتر باشد")]
    TextTooLong(usize),
}

/// A submission as it arrives from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    #[serde(default)]
    pub option_ids: Vec<Uuid>,
    pub rating: Option<i32>,
    pub text: Option<String>,
}

/// A submission checked against the poll, ready to be stored as rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vote {
    Choices(Vec<Uuid>),
    Rating(i32),
    Text(String),
}

pub fn rating_bounds(poll: &MPoll) -> (i32, i32) {
    (
        poll.min_rating.unwrap_or(DEFAULT_MIN_RATING),
        poll.max_rating.unwrap_or(DEFAULT_MAX_RATING),
    )
}

pub fn validate_vote(
    poll: &MPoll,
    options: &[MPollOption],
    voter: &MUser,
    already_voted: bool,
    now: NaiveDateTime,
    ballot: Ballot,
) -> Result<Vote, PollError> {
    if !poll.is_open(now) {
        return Err(PollError::Closed);
    }

    if !is_visible_to(voter, poll.department_id) {
        return Err(PollError::NotEligible);
    }

    if already_voted {
        return Err(PollError::AlreadyVoted);
    }

    match poll.kind {
        PollType::SingleChoice | PollType::MultipleChoice => {
            let mut chosen: Vec<Uuid> = Vec::new();
            for id in ballot.option_ids {
                if !chosen.contains(&id) {
                    chosen.push(id);
                }
            }

            if chosen.is_empty() {
                return Err(PollError::ChoiceRequired);
            }

            if poll.kind == PollType::SingleChoice && chosen.len() != 1 {
                return Err(PollError::SingleChoiceRequired);
            }

            let known: HashSet<Uuid> = options
                .iter()
                .filter(|o| o.poll_id == poll.id)
                .map(|o| o.id)
                .collect();

            if chosen.iter().any(|id| !known.contains(id)) {
                return Err(PollError::UnknownOption);
            }

            Ok(Vote::Choices(chosen))
        }
        PollType::RatingScale => {
            let (min, max) = rating_bounds(poll);
            match ballot.rating {
                Some(rating) if (min..=max).contains(&rating) => Ok(Vote::Rating(rating)),
                _ => Err(PollError::RatingOutOfRange { min, max }),
            }
        }
        PollType::TextInput => {
            let text = ballot.text.as_deref().map(str::trim).unwrap_or_default();

            if text.is_empty() {
                return Err(PollError::TextRequired);
            }

            if text.chars().count() > MAX_POLL_TEXT_ANSWER_LENGTH {
                return Err(PollError::TextTooLong(MAX_POLL_TEXT_ANSWER_LENGTH));
            }

            Ok(Vote::Text(text.to_string()))
        }
    }
}

/// Admins and the creator always see results.
pub fn results_visible(poll: &MPoll, viewer: &MUser, has_voted: bool, now: NaiveDateTime) -> bool {
    if viewer.is_admin() || viewer.id == poll.created_by_id {
        return true;
    }

    match poll.show_results {
        ResultsVisibility::Always => true,
        ResultsVisibility::AfterVote => has_voted,
        ResultsVisibility::AfterClose => !poll.active || poll.ends_at.is_some_and(|end| now >= end),
        ResultsVisibility::AdminOnly => false,
    }
}

/// Whole percent, 0 when `total` is 0.
pub fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }

    (part as f64 / total as f64 * 100.0).round() as u32
}

pub fn response_rate(unique_respondents: u64, eligible_users: u64) -> u32 {
    percentage(unique_respondents, eligible_users)
}

pub fn unique_respondents(responses: &[MPollResponse]) -> HashSet<Uuid> {
    responses.iter().map(|r| r.user_id).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: Uuid,
    pub text: String,
    pub votes: u64,
    pub percentage: u32,
}

/// Percentages are relative to respondents, so multiple-choice polls may
/// add up to more than 100.
pub fn tally_choices(options: &[MPollOption], responses: &[MPollResponse]) -> Vec<OptionResult> {
    let respondents = unique_respondents(responses).len() as u64;
    let mut votes: HashMap<Uuid, u64> = HashMap::new();

    for option_id in responses.iter().filter_map(|r| r.option_id) {
        *votes.entry(option_id).or_default() += 1;
    }

    let mut ordered: Vec<&MPollOption> = options.iter().collect();
    ordered.sort_by_key(|o| o.position);

    ordered
        .into_iter()
        .map(|option| {
            let count = votes.get(&option.id).copied().unwrap_or_default();
            OptionResult {
                option_id: option.id,
                text: option.text.clone(),
                votes: count,
                percentage: percentage(count, respondents),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub min_rating: i32,
    pub max_rating: i32,
    pub count: u64,
    pub average: f64,
    pub histogram: Vec<RatingBucket>,
}

pub fn summarize_ratings(min: i32, max: i32, responses: &[MPollResponse]) -> RatingSummary {
    let ratings: Vec<i32> = responses
        .iter()
        .filter_map(|r| r.rating)
        .filter(|r| (min..=max).contains(r))
        .collect();

    let average = if ratings.is_empty() {
        0.0
    } else {
        let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
        (sum as f64 / ratings.len() as f64 * 100.0).round() / 100.0
    };

    let histogram = (min..=max)
        .map(|rating| RatingBucket {
            rating,
            count: ratings.iter().filter(|&&r| r == rating).count() as u64,
        })
        .collect();

    RatingSummary {
        min_rating: min,
        max_rating: max,
        count: ratings.len() as u64,
        average,
        histogram,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnswer {
    pub text: String,
    pub respondent: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Newest first. `names` maps user ids to display names and is only
/// consulted for public polls.
pub fn text_answers(
    poll: &MPoll,
    responses: &[MPollResponse],
    names: &HashMap<Uuid, String>,
) -> Vec<TextAnswer> {
    let mut answers: Vec<&MPollResponse> = responses.iter().filter(|r| r.text.is_some()).collect();
    answers.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    answers
        .into_iter()
        .map(|r| TextAnswer {
            text: r.text.clone().unwrap_or_default(),
            respondent: match poll.visibility {
                PollVisibility::Public => names.get(&r.user_id).cloned(),
                PollVisibility::Anonymous => None,
            },
            created_at: r.created_at,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "data")]
pub enum Tally {
    #[serde(rename = "CHOICE")]
    Choice(Vec<OptionResult>),
    #[serde(rename = "RATING")]
    Rating(RatingSummary),
    #[serde(rename = "TEXT")]
    Text(Vec<TextAnswer>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRate {
    pub department_id: Uuid,
    pub name: String,
    pub eligible_users: u64,
    pub respondents: u64,
    pub response_rate: u32,
}

/// `eligible` holds the active members of each department, keyed by
/// department id. Respondents outside those sets are not counted.
pub fn department_rates(
    departments: &[MDepartment],
    eligible: &HashMap<Uuid, HashSet<Uuid>>,
    respondents: &HashSet<Uuid>,
) -> Vec<DepartmentRate> {
    departments
        .iter()
        .map(|d| {
            let members = eligible.get(&d.id);
            let eligible_users = members.map_or(0, |m| m.len() as u64);
            let respondents = members.map_or(0, |m| m.intersection(respondents).count() as u64);

            DepartmentRate {
                department_id: d.id,
                name: d.name.clone(),
                eligible_users,
                respondents,
                response_rate: response_rate(respondents, eligible_users),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: Uuid,
    pub total_responses: u64,
    pub unique_respondents: u64,
    pub eligible_users: u64,
    /// Respondents that belong to the eligible population.
    pub eligible_respondents: u64,
    pub response_rate: u32,
    pub tally: Tally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departments: Option<Vec<DepartmentRate>>,
}

/// The response rate only counts respondents found in `eligible`, so voters
/// outside the poll's population (admins, moved or deactivated users) never
/// push it past 100.
pub fn aggregate(
    poll: &MPoll,
    options: &[MPollOption],
    responses: &[MPollResponse],
    eligible: &HashSet<Uuid>,
    names: &HashMap<Uuid, String>,
) -> PollResults {
    let respondents = unique_respondents(responses);
    let eligible_users = eligible.len() as u64;
    let eligible_respondents = respondents.intersection(eligible).count() as u64;

    let tally = match poll.kind {
        PollType::SingleChoice | PollType::MultipleChoice => {
            Tally::Choice(tally_choices(options, responses))
        }
        PollType::RatingScale => {
            let (min, max) = rating_bounds(poll);
            Tally::Rating(summarize_ratings(min, max, responses))
        }
        PollType::TextInput => Tally::Text(text_answers(poll, responses, names)),
    };

    PollResults {
        poll_id: poll.id,
        total_responses: responses.len() as u64,
        unique_respondents: respondents.len() as u64,
        eligible_users,
        eligible_respondents,
        response_rate: response_rate(eligible_respondents, eligible_users),
        tally,
        departments: None,
    }
}
