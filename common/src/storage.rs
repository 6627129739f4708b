/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::{load_secret, sanitize_file_name};
use super::types::Cli;
use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("حجم فایل بیش از حد مجاز است ({size} از {max} بایت)")]
    TooLarge { size: usize, max: usize },
    #[error("فایل خالی است")]
    Empty,
    #[error("object storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("object storage rejected upload with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// Client for the external object storage service. Files are stored with a
/// plain HTTP `PUT` and served from a separate public base URL.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    client: reqwest::Client,
    endpoint: String,
    public_url: String,
    token: Option<String>,
    max_size: usize,
}

impl ObjectStorage {
    pub fn new(endpoint: String, public_url: String, token: Option<String>, max_size: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            token,
            max_size,
        }
    }

    /// `None` when no storage endpoint is configured.
    pub fn from_cli(cli: &Cli) -> Option<Self> {
        let endpoint = cli.storage_endpoint.clone()?;
        let public_url = cli
            .storage_public_url
            .clone()
            .unwrap_or_else(|| endpoint.clone());
        let token = cli
            .storage_token_file
            .as_deref()
            .map(load_secret)
            .filter(|t| !t.is_empty());

        Some(Self::new(endpoint, public_url, token, cli.max_upload_size))
    }

    pub fn object_key(file_name: &str) -> String {
        format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name))
    }

    pub fn public_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }

    pub fn check_size(&self, size: usize) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::Empty);
        }

        if size > self.max_size {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_size,
            });
        }

        Ok(())
    }

    /// Uploads `bytes` and returns the public URL of the stored object.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.check_size(bytes.len())?;

        let key = Self::object_key(file_name);
        let mut request = self
            .client
            .put(format!("{}/{}", self.endpoint, key))
            .header(CONTENT_TYPE, content_type)
            .body(bytes);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected(response.status()));
        }

        tracing::debug!("Uploaded object {}", key);
        Ok(self.public_url_for(&key))
    }
}
