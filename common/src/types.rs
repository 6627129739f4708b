/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::consts::DEFAULT_ANALYTICS_KEYWORDS;
use super::input::{greater_than_zero, parse_keywords, port_in_range};
use super::storage::ObjectStorage;
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Parser, Debug, Clone)]
#[command(name = "Intranet", display_name = "Intranet", bin_name = "intranet-server", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "INTRANET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "INTRANET_LOG_JSON", default_value = "false")]
    pub log_json: bool,
    #[arg(long, env = "INTRANET_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "INTRANET_PORT", value_parser = port_in_range, default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "INTRANET_SERVE_URL", default_value = "http://127.0.0.1:8000")]
    pub serve_url: String,
    #[arg(long, env = "INTRANET_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "INTRANET_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(long, env = "INTRANET_JWT_SECRET_FILE")]
    pub jwt_secret_file: String,
    #[arg(long, env = "INTRANET_JWT_LIFETIME_HOURS", value_parser = greater_than_zero::<i64>, default_value = "24")]
    pub jwt_lifetime_hours: i64,
    #[arg(long, env = "INTRANET_STORAGE_ENDPOINT")]
    pub storage_endpoint: Option<String>,
    #[arg(long, env = "INTRANET_STORAGE_PUBLIC_URL")]
    pub storage_public_url: Option<String>,
    #[arg(long, env = "INTRANET_STORAGE_TOKEN_FILE")]
    pub storage_token_file: Option<String>,
    #[arg(long, env = "INTRANET_MAX_UPLOAD_SIZE", value_parser = greater_than_zero::<usize>, default_value = "10485760")]
    pub max_upload_size: usize,
    #[arg(long, env = "INTRANET_ANALYTICS_KEYWORDS")]
    pub analytics_keywords: Option<String>,
    #[arg(long, env = "INTRANET_ADMIN_NAME", default_value = "مدیر سیستم")]
    pub admin_name: String,
    #[arg(long, env = "INTRANET_ADMIN_MOBILE")]
    pub admin_mobile: Option<String>,
    #[arg(long, env = "INTRANET_ADMIN_PASSWORD_FILE")]
    pub admin_password_file: Option<String>,
    #[arg(long, env = "INTRANET_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "INTRANET_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl Cli {
    /// Configured analytics keywords or the built-in list.
    pub fn keywords(&self) -> Vec<String> {
        let configured = self
            .analytics_keywords
            .as_deref()
            .map(parse_keywords)
            .unwrap_or_default();

        if configured.is_empty() {
            DEFAULT_ANALYTICS_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect()
        } else {
            configured
        }
    }
}

#[derive(Debug)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
    pub storage: Option<ObjectStorage>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BaseResponse<T> {
    pub error: bool,
    pub message: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

pub type ListResponse = Vec<ListItem>;

pub type EAnnouncement = announcement::Entity;
pub type EAnnouncementView = announcement_view::Entity;
pub type EAssessment = assessment::Entity;
pub type EAssessmentAssignment = assessment_assignment::Entity;
pub type EAssessmentProgress = assessment_progress::Entity;
pub type EAssessmentQuestion = assessment_question::Entity;
pub type EAssessmentResult = assessment_result::Entity;
pub type EDepartment = department::Entity;
pub type EFeedback = feedback::Entity;
pub type ENotification = notification::Entity;
pub type EPoll = poll::Entity;
pub type EPollOption = poll_option::Entity;
pub type EPollResponse = poll_response::Entity;
pub type EProject = project::Entity;
pub type EUpdate = update::Entity;
pub type EUser = user::Entity;

pub type MAnnouncement = announcement::Model;
pub type MAnnouncementView = announcement_view::Model;
pub type MAssessment = assessment::Model;
pub type MAssessmentAssignment = assessment_assignment::Model;
pub type MAssessmentProgress = assessment_progress::Model;
pub type MAssessmentQuestion = assessment_question::Model;
pub type MAssessmentResult = assessment_result::Model;
pub type MDepartment = department::Model;
pub type MFeedback = feedback::Model;
pub type MNotification = notification::Model;
pub type MPoll = poll::Model;
pub type MPollOption = poll_option::Model;
pub type MPollResponse = poll_response::Model;
pub type MProject = project::Model;
pub type MUpdate = update::Model;
pub type MUser = user::Model;

pub type AAnnouncement = announcement::ActiveModel;
pub type AAnnouncementView = announcement_view::ActiveModel;
pub type AAssessment = assessment::ActiveModel;
pub type AAssessmentAssignment = assessment_assignment::ActiveModel;
pub type AAssessmentProgress = assessment_progress::ActiveModel;
pub type AAssessmentQuestion = assessment_question::ActiveModel;
pub type AAssessmentResult = assessment_result::ActiveModel;
pub type ADepartment = department::ActiveModel;
pub type AFeedback = feedback::ActiveModel;
pub type ANotification = notification::ActiveModel;
pub type APoll = poll::ActiveModel;
pub type APollOption = poll_option::ActiveModel;
pub type APollResponse = poll_response::ActiveModel;
pub type AProject = project::ActiveModel;
pub type AUpdate = update::ActiveModel;
pub type AUser = user::ActiveModel;

pub type CAnnouncement = announcement::Column;
pub type CAnnouncementView = announcement_view::Column;
pub type CAssessment = assessment::Column;
pub type CAssessmentAssignment = assessment_assignment::Column;
pub type CAssessmentProgress = assessment_progress::Column;
pub type CAssessmentQuestion = assessment_question::Column;
pub type CAssessmentResult = assessment_result::Column;
pub type CDepartment = department::Column;
pub type CFeedback = feedback::Column;
pub type CNotification = notification::Column;
pub type CPoll = poll::Column;
pub type CPollOption = poll_option::Column;
pub type CPollResponse = poll_response::Column;
pub type CProject = project::Column;
pub type CUpdate = update::Column;
pub type CUser = user::Column;
