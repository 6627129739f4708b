/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod authorization;
pub mod endpoints;
pub mod error;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};
use common::types::ServerState;
use endpoints::*;
use http::HeaderValue;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the configured file size.
const UPLOAD_OVERHEAD: usize = 64 * 1024;

pub fn cors_layer(serve_url: &str) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    if serve_url == "*" {
        return Ok(cors.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(serve_url.trim_end_matches('/'))
        .with_context(|| format!("Invalid serve url {}", serve_url))?;

    Ok(cors
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true))
}

pub fn create_router(state: Arc<ServerState>) -> Router {
    let upload_limit = state.cli.max_upload_size.saturating_add(UPLOAD_OVERHEAD);

    Router::new()
        .route("/api/auth/me", get(auth::get_me))
        .route("/api/auth/password", patch(auth::patch_password))
        .route("/api/users", get(users::get).post(users::post))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .patch(users::patch_user)
                .delete(users::delete_user),
        )
        .route("/api/departments", get(departments::get).post(departments::post))
        .route(
            "/api/departments/{id}",
            get(departments::get_department)
                .patch(departments::patch_department)
                .delete(departments::delete_department),
        )
        .route("/api/feedback", get(feedback::get).post(feedback::post))
        .route("/api/feedback/trash", get(feedback::get_trash))
        .route("/api/feedback/analytics", get(feedback::get_analytics))
        .route(
            "/api/feedback/{id}",
            get(feedback::get_feedback)
                .patch(feedback::patch_feedback)
                .delete(feedback::delete_feedback),
        )
        .route("/api/feedback/{id}/forward", post(feedback::post_forward))
        .route("/api/feedback/{id}/respond", post(feedback::post_respond))
        .route("/api/feedback/{id}/restore", post(feedback::post_restore))
        .route("/api/feedback/{id}/purge", delete(feedback::delete_purge))
        .route(
            "/api/announcements",
            get(announcements::get).post(announcements::post),
        )
        .route(
            "/api/announcements/{id}",
            get(announcements::get_announcement)
                .patch(announcements::patch_announcement)
                .delete(announcements::delete_announcement),
        )
        .route("/api/announcements/{id}/view", post(announcements::post_view))
        .route("/api/announcements/{id}/viewers", get(announcements::get_viewers))
        .route("/api/polls", get(polls::get).post(polls::post))
        .route(
            "/api/polls/{id}",
            get(polls::get_poll)
                .patch(polls::patch_poll)
                .delete(polls::delete_poll),
        )
        .route("/api/polls/{id}/responses", post(polls::post_response))
        .route("/api/polls/{id}/results", get(polls::get_results))
        .route("/api/assessments", get(assessments::get).post(assessments::post))
        .route(
            "/api/assessments/{id}",
            get(assessments::get_assessment)
                .patch(assessments::patch_assessment)
                .delete(assessments::delete_assessment),
        )
        .route(
            "/api/assessments/{id}/assignments",
            put(assessments::put_assignments),
        )
        .route("/api/assessments/{id}/questions", get(assessments::get_questions))
        .route(
            "/api/assessments/{id}/progress",
            get(assessments::get_progress).put(assessments::put_progress),
        )
        .route("/api/assessments/{id}/complete", post(assessments::post_complete))
        .route("/api/assessments/{id}/results", get(assessments::get_results))
        .route("/api/projects", get(projects::get).post(projects::post))
        .route(
            "/api/projects/{id}",
            get(projects::get_project)
                .patch(projects::patch_project)
                .delete(projects::delete_project),
        )
        .route("/api/notifications", get(notifications::get))
        .route("/api/notifications/unread", get(notifications::get_unread))
        .route("/api/notifications/read-all", post(notifications::post_read_all))
        .route(
            "/api/notifications/{id}",
            patch(notifications::patch_notification)
                .delete(notifications::delete_notification),
        )
        .route("/api/updates", get(updates::get).post(updates::post))
        .route("/api/updates/{id}", delete(updates::delete_update))
        .route(
            "/api/uploads",
            post(uploads::post).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            authorization::authorize,
        ))
        .route("/api/auth/login", post(auth::post_login))
        .route("/api/health", get(get_health))
        .fallback(handle_404)
        .with_state(state)
}

pub async fn serve_web(state: Arc<ServerState>) -> anyhow::Result<()> {
    let server_url = format!("{}:{}", state.cli.ip, state.cli.port);
    let cors = cors_layer(&state.cli.serve_url)?;

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&server_url)
        .await
        .with_context(|| format!("Failed to bind {}", server_url))?;

    tracing::info!("Listening on {}", server_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }

        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
