/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Assessment questions and answers have been stored in several shapes over
//! time. Everything entering through the API is folded into one canonical
//! form here before it is written; reads assume the canonical form.

use super::consts::{DISC_DIMENSIONS, HOLLAND_DIMENSIONS, MBTI_PAIRS};
use super::polls::percentage;
use super::types::*;
use entity::assessment::AssessmentType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("گزینه‌های سوال معتبر نیستند: {0}")]
    InvalidOptions(String),
    #[error("قالب پاسخ‌ها معتبر نیست")]
    InvalidAnswers,
    #[error("سوال {0} در این آزمون وجود ندارد")]
    UnknownQuestion(String),
    #[error("پاسخ انتخاب شده برای سوال {0} معتبر نیست")]
    UnknownAnswer(Uuid),
    #[error("به {answered} سوال از {total} سوال پاسخ داده شده است")]
    Incomplete { answered: usize, total: usize },
    #[error("این آزمون هنوز سوالی ندارد")]
    NoQuestions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

impl QuestionOption {
    pub fn weight(&self) -> f64 {
        self.score.unwrap_or(1.0)
    }

    pub fn dimension_key(&self) -> String {
        self.dimension
            .as_deref()
            .unwrap_or(&self.value)
            .trim()
            .to_uppercase()
    }
}

pub type Answers = BTreeMap<Uuid, String>;

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find_map(scalar_to_string)
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn option_from_object(
    object: &Map<String, Value>,
    key: Option<&str>,
) -> Result<QuestionOption, AssessmentError> {
    let label = first_string(object, &["label", "text", "title"]);
    let value = key
        .map(str::to_string)
        .or_else(|| first_string(object, &["value", "key", "id"]))
        .or_else(|| label.clone())
        .ok_or_else(|| AssessmentError::InvalidOptions("گزینه بدون مقدار".to_string()))?;

    Ok(QuestionOption {
        label: label.unwrap_or_else(|| value.clone()),
        value,
        score: number(object.get("score")),
        dimension: first_string(object, &["dimension"]),
    })
}

/// Accepts a list of strings, a list of option objects, a `{key: label}` or
/// `{key: {label, score, dimension}}` map, or a JSON string holding any of
/// those. Map entries come out in key order.
pub fn normalize_options(raw: &Value) -> Result<Vec<QuestionOption>, AssessmentError> {
    let options = match raw {
        Value::String(s) => {
            let inner: Value = serde_json::from_str(s).map_err(|_| {
                AssessmentError::InvalidOptions("رشته JSON معتبر نیست".to_string())
            })?;

            if inner.is_string() {
                return Err(AssessmentError::InvalidOptions(
                    "قالب گزینه‌ها پشتیبانی نمی‌شود".to_string(),
                ));
            }

            return normalize_options(&inner);
        }
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(object) => option_from_object(object, None),
                other => scalar_to_string(other)
                    .map(|s| QuestionOption {
                        value: s.clone(),
                        label: s,
                        score: None,
                        dimension: None,
                    })
                    .ok_or_else(|| AssessmentError::InvalidOptions("گزینه خالی".to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| match item {
                Value::Object(object) => option_from_object(object, Some(key)),
                other => Ok(QuestionOption {
                    value: key.clone(),
                    label: scalar_to_string(other).unwrap_or_else(|| key.clone()),
                    score: None,
                    dimension: None,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(AssessmentError::InvalidOptions(
                "قالب گزینه‌ها پشتیبانی نمی‌شود".to_string(),
            ));
        }
    };

    if options.is_empty() {
        return Err(AssessmentError::InvalidOptions(
            "حداقل یک گزینه لازم است".to_string(),
        ));
    }

    for (i, option) in options.iter().enumerate() {
        if options[..i].iter().any(|o| o.value == option.value) {
            return Err(AssessmentError::InvalidOptions(format!(
                "مقدار تکراری {}",
                option.value
            )));
        }
    }

    Ok(options)
}

/// Options of a stored question. Rows are written canonically, anything
/// else is treated as a question without options.
pub fn stored_options(question: &MAssessmentQuestion) -> Vec<QuestionOption> {
    serde_json::from_value(question.options.clone()).unwrap_or_default()
}

pub fn stored_answers(progress: &MAssessmentProgress) -> Answers {
    serde_json::from_value(progress.answers.clone()).unwrap_or_default()
}

fn answer_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => first_string(object, &["value", "answer"]),
        other => scalar_to_string(other),
    }
}

fn parse_question_id(raw: &str) -> Result<Uuid, AssessmentError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AssessmentError::UnknownQuestion(raw.to_string()))
}

/// Accepts `{questionId: value}` (value a string, number or `{value}`), a
/// list of `{questionId | question_id, answer | value}` objects, or a JSON
/// string holding either. Does not check the answers against questions.
pub fn parse_answers(raw: &Value) -> Result<Answers, AssessmentError> {
    let mut answers = Answers::new();

    match raw {
        Value::Null => {}
        Value::String(s) => {
            let inner: Value =
                serde_json::from_str(s).map_err(|_| AssessmentError::InvalidAnswers)?;

            if inner.is_string() {
                return Err(AssessmentError::InvalidAnswers);
            }

            return parse_answers(&inner);
        }
        Value::Object(map) => {
            for (key, value) in map {
                let value = answer_value(value).ok_or(AssessmentError::InvalidAnswers)?;
                answers.insert(parse_question_id(key)?, value);
            }
        }
        Value::Array(items) => {
            for item in items {
                let Value::Object(object) = item else {
                    return Err(AssessmentError::InvalidAnswers);
                };

                let question = first_string(object, &["questionId", "question_id"])
                    .ok_or(AssessmentError::InvalidAnswers)?;
                let value = ["answer", "value"]
                    .iter()
                    .filter_map(|k| object.get(*k))
                    .find_map(answer_value)
                    .ok_or(AssessmentError::InvalidAnswers)?;

                answers.insert(parse_question_id(&question)?, value);
            }
        }
        _ => return Err(AssessmentError::InvalidAnswers),
    }

    Ok(answers)
}

/// [`parse_answers`] followed by a check that every answer names a question
/// of the assessment and one of that question's option values.
pub fn normalize_answers(
    raw: &Value,
    questions: &[MAssessmentQuestion],
) -> Result<Answers, AssessmentError> {
    let answers = parse_answers(raw)?;

    for (question_id, value) in &answers {
        let question = questions
            .iter()
            .find(|q| q.id == *question_id)
            .ok_or_else(|| AssessmentError::UnknownQuestion(question_id.to_string()))?;

        if !stored_options(question).iter().any(|o| &o.value == value) {
            return Err(AssessmentError::UnknownAnswer(*question_id));
        }
    }

    Ok(answers)
}

pub fn progress_percent(answered: usize, total_questions: usize) -> u32 {
    percentage(answered as u64, total_questions as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub scores: BTreeMap<String, f64>,
    pub total_score: f64,
    pub summary: String,
}

impl Outcome {
    pub fn to_json(&self) -> Value {
        json!({ "scores": self.scores, "totalScore": self.total_score })
    }
}

fn score_of(scores: &BTreeMap<String, f64>, dimension: &str) -> f64 {
    scores.get(dimension).copied().unwrap_or_default()
}

/// Highest scoring dimension out of `order`, earlier entries win ties.
fn highest<'a>(scores: &BTreeMap<String, f64>, order: impl IntoIterator<Item = &'a str>) -> String {
    let mut best: Option<(&str, f64)> = None;

    for dimension in order {
        let score = score_of(scores, dimension);
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((dimension, score));
        }
    }

    best.map(|(d, _)| d.to_string()).unwrap_or_default()
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{:.2}", score)
    }
}

pub fn summarize(kind: AssessmentType, scores: &BTreeMap<String, f64>) -> String {
    match kind {
        AssessmentType::Mbti => MBTI_PAIRS
            .iter()
            .map(|(a, b)| {
                if score_of(scores, a) >= score_of(scores, b) {
                    *a
                } else {
                    *b
                }
            })
            .collect(),
        AssessmentType::Disc => highest(scores, DISC_DIMENSIONS),
        AssessmentType::Holland => {
            let mut ranked: Vec<&str> = HOLLAND_DIMENSIONS.to_vec();
            ranked.sort_by(|a, b| score_of(scores, b).total_cmp(&score_of(scores, a)));
            ranked.into_iter().take(3).collect()
        }
        AssessmentType::Enneagram => highest(scores, scores.keys().map(String::as_str)),
        AssessmentType::Custom => format_score(scores.values().sum()),
    }
}

/// Requires at least one question and an answer for every question.
pub fn score(
    kind: AssessmentType,
    questions: &[MAssessmentQuestion],
    answers: &Answers,
) -> Result<Outcome, AssessmentError> {
    if questions.is_empty() {
        return Err(AssessmentError::NoQuestions);
    }

    let answered = questions
        .iter()
        .filter(|q| answers.contains_key(&q.id))
        .count();

    if answered < questions.len() {
        return Err(AssessmentError::Incomplete {
            answered,
            total: questions.len(),
        });
    }

    let mut scores: BTreeMap<String, f64> = BTreeMap::new();

    for question in questions {
        let Some(value) = answers.get(&question.id) else {
            continue;
        };

        let options = stored_options(question);
        let option = options
            .iter()
            .find(|o| &o.value == value)
            .ok_or(AssessmentError::UnknownAnswer(question.id))?;

        *scores.entry(option.dimension_key()).or_default() += option.weight();
    }

    Ok(Outcome {
        total_score: scores.values().sum(),
        summary: summarize(kind, &scores),
        scores,
    })
}

/// Admins see every assessment; others see active ones assigned to their
/// department.
pub fn is_available_to(assessment: &MAssessment, user: &MUser, assigned: &[Uuid]) -> bool {
    if user.is_admin() {
        return true;
    }

    assessment.active
        && assessment.deleted_at.is_none()
        && user.department_id.is_some_and(|d| assigned.contains(&d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_weight_and_dimension_defaults() {
        let option = QuestionOption {
            value: "e".to_string(),
            label: "برون‌گرا".to_string(),
            score: None,
            dimension: None,
        };

        assert_eq!(option.weight(), 1.0);
        assert_eq!(option.dimension_key(), "E");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(12.0), "12");
        assert_eq!(format_score(2.5), "2.50");
    }

    #[test]
    fn test_highest_prefers_earlier_on_tie() {
        let scores = BTreeMap::from([("I".to_string(), 2.0), ("S".to_string(), 2.0)]);
        assert_eq!(highest(&scores, DISC_DIMENSIONS), "I");
    }
}
