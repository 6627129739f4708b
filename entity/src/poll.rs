/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollType {
    #[sea_orm(num_value = 0)]
    SingleChoice,
    #[sea_orm(num_value = 1)]
    MultipleChoice,
    #[sea_orm(num_value = 2)]
    RatingScale,
    #[sea_orm(num_value = 3)]
    TextInput,
}

impl PollType {
    pub fn has_options(&self) -> bool {
        matches!(self, PollType::SingleChoice | PollType::MultipleChoice)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollVisibility {
    #[sea_orm(num_value = 0)]
    Anonymous,
    #[sea_orm(num_value = 1)]
    Public,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultsVisibility {
    #[sea_orm(num_value = 0)]
    Always,
    #[sea_orm(num_value = 1)]
    AfterVote,
    #[sea_orm(num_value = 2)]
    AfterClose,
    #[sea_orm(num_value = 3)]
    AdminOnly,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "poll")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: PollType,
    pub visibility: PollVisibility,
    pub show_results: ResultsVisibility,
    pub department_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub active: bool,
    pub starts_at: DateTime,
    pub ends_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::poll_option::Entity")]
    Options,
    #[sea_orm(has_many = "super::poll_response::Entity")]
    Responses,
}

impl Related<super::poll_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl Related<super::poll_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responses.def()
    }
}

impl Model {
    /// A poll accepts responses while active and inside its time window.
    pub fn is_open(&self, now: DateTime) -> bool {
        self.active
            && self.deleted_at.is_none()
            && self.starts_at <= now
            && self.ends_at.is_none_or(|ends_at| now < ends_at)
    }
}

impl ActiveModelBehavior for ActiveModel {}
