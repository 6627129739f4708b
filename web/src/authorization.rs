/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::{WebError, WebResult};
use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use common::input::load_secret;
use common::types::*;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, IntoActiveModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize,
    pub iat: usize,
    pub id: Uuid,
}

fn unauthorized() -> WebError {
    WebError::Unauthorized("لطفاً دوباره وارد شوید".to_string())
}

/// Extracts the token from an `Authorization: Bearer <jwt>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}

pub async fn authorize(
    state: State<Arc<ServerState>>,
    mut req: Request,
    next: Next,
) -> WebResult<Response<Body>> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(unauthorized)?
        .to_string();

    let token_data = decode_jwt(&state, &token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        unauthorized()
    })?;

    let current_user = EUser::find_by_id(token_data.claims.id)
        .one(&state.db)
        .await?
        .filter(|u| u.is_available())
        .ok_or_else(unauthorized)?;

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

pub fn encode_token(secret: &str, lifetime_hours: i64, id: Uuid) -> Result<String> {
    let now = Utc::now();
    let exp = (now + Duration::hours(lifetime_hours)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    encode(
        &Header::default(),
        &Claims { exp, iat, id },
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to encode token")
}

pub fn decode_token(secret: &str, token: &str) -> Result<TokenData<Claims>> {
    decode(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .context("Failed to decode token")
}

pub fn encode_jwt(state: &ServerState, id: Uuid) -> Result<String> {
    let secret = load_secret(&state.cli.jwt_secret_file);

    if secret.is_empty() {
        anyhow::bail!("JWT secret is empty");
    }

    encode_token(&secret, state.cli.jwt_lifetime_hours, id)
}

pub fn decode_jwt(state: &ServerState, token: &str) -> Result<TokenData<Claims>> {
    let secret = load_secret(&state.cli.jwt_secret_file);

    if secret.is_empty() {
        anyhow::bail!("JWT secret is empty");
    }

    decode_token(&secret, token)
}

pub async fn update_last_login(state: &ServerState, user: MUser) -> Result<MUser> {
    let mut auser = user.into_active_model();

    auser.last_login_at = Set(Some(Utc::now().naive_utc()));
    auser
        .update(&state.db)
        .await
        .context("Failed to update user last login")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_token_roundtrip() {
        let id = Uuid::new_v4();
        let token = encode_token("secret", 24, id).unwrap();
        let data = decode_token("secret", &token).unwrap();

        assert_eq!(data.claims.id, id);
        assert!(data.claims.exp > data.claims.iat);
        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = encode_token("secret", -2, Uuid::new_v4()).unwrap();
        assert!(decode_token("secret", &token).is_err());
    }
}
