/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod assessments;
pub mod consts;
pub mod database;
pub mod feedback;
pub mod input;
pub mod notifications;
pub mod permission;
pub mod polls;
pub mod storage;
pub mod types;

use anyhow::Result;
use database::connect_db;
use std::sync::Arc;
use storage::ObjectStorage;
use tracing_subscriber::{EnvFilter, fmt};
use types::*;

/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", cli.log_level)));

    if cli.log_json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

pub async fn init_state(cli: Cli) -> Result<Arc<ServerState>> {
    tracing::info!("Starting Intranet Server on {}:{}", cli.ip, cli.port);

    let db = connect_db(&cli).await?;
    let storage = ObjectStorage::from_cli(&cli);

    if storage.is_none() {
        tracing::warn!("No object storage configured, uploads are disabled");
    }

    Ok(Arc::new(ServerState { db, cli, storage }))
}
