/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod announcement;
pub mod announcement_view;
pub mod assessment;
pub mod assessment_assignment;
pub mod assessment_progress;
pub mod assessment_question;
pub mod assessment_result;
pub mod department;
pub mod feedback;
pub mod notification;
pub mod poll;
pub mod poll_option;
pub mod poll_response;
pub mod project;
pub mod update;
pub mod user;
