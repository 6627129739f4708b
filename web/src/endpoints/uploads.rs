/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::respond;
use crate::error::{WebError, WebResult};
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use common::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadedFile {
    pub url: String,
    pub name: String,
    pub size: usize,
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    mut multipart: Multipart,
) -> WebResult<Json<BaseResponse<UploadedFile>>> {
    let storage = state.storage.as_ref().ok_or_else(WebError::storage_disabled)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("file").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        let size = bytes.len();

        let url = storage.upload(&name, &content_type, bytes.to_vec()).await?;
        tracing::info!("User {} uploaded {} ({} bytes)", user.id, name, size);

        return Ok(respond(UploadedFile { url, name, size }));
    }

    Err(WebError::BadRequest("فایلی ارسال نشده است".to_string()))
}
