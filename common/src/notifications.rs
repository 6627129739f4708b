/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::types::*;
use chrono::Utc;
use entity::notification::NotificationType;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

impl NotificationDraft {
    pub fn new(kind: NotificationType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// One unread row per distinct recipient.
    pub fn rows(&self, recipients: &[Uuid]) -> Vec<ANotification> {
        let now = Utc::now().naive_utc();
        let mut seen: Vec<Uuid> = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            if !seen.contains(recipient) {
                seen.push(*recipient);
            }
        }

        seen.into_iter()
            .map(|user_id| ANotification {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                title: Set(self.title.clone()),
                message: Set(self.message.clone()),
                kind: Set(self.kind),
                link: Set(self.link.clone()),
                read: Set(false),
                created_at: Set(now),
            })
            .collect()
    }
}

/// Writes the draft for every recipient in a single insert. Returns the
/// number of rows written.
pub async fn notify_users<C: ConnectionTrait>(
    db: &C,
    recipients: &[Uuid],
    draft: &NotificationDraft,
) -> Result<u64, DbErr> {
    let rows = draft.rows(recipients);

    if rows.is_empty() {
        return Ok(0);
    }

    let count = rows.len() as u64;
    ENotification::insert_many(rows)
        .exec_without_returning(db)
        .await?;

    tracing::debug!("Sent notification \"{}\" to {} users", draft.title, count);
    Ok(count)
}
