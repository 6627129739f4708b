/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use clap::Parser;
use common::types::Cli;
use common::{init_logging, init_state};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let _guard = match (&cli.sentry_dsn, cli.report_errors) {
        (Some(dsn), true) => Some(sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))),
        (None, true) => {
            tracing::warn!("Error reporting enabled without a DSN, reports are not sent");
            None
        }
        _ => None,
    };

    let state = init_state(cli).await?;
    web::serve_web(state).await
}
