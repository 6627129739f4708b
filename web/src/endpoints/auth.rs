/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{now, respond};
use crate::authorization::{encode_jwt, update_last_login};
use crate::error::{WebError, WebResult};
use axum::extract::State;
use axum::{Extension, Json};
use common::input::{normalize_mobile, validate_password};
use common::types::*;
use password_auth::{generate_hash, verify_password};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub mobile: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: MUser,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn post_login(
    state: State<Arc<ServerState>>,
    Json(body): Json<LoginRequest>,
) -> WebResult<Json<BaseResponse<LoginResponse>>> {
    let mobile = normalize_mobile(&body.mobile).map_err(|_| WebError::invalid_credentials())?;

    let user = EUser::find()
        .filter(CUser::Mobile.eq(mobile))
        .filter(CUser::DeletedAt.is_null())
        .one(&state.db)
        .await?
        .ok_or_else(WebError::invalid_credentials)?;

    if verify_password(&body.password, &user.password).is_err() {
        return Err(WebError::invalid_credentials());
    }

    if !user.is_available() {
        return Err(WebError::Unauthorized(
            "حساب کاربری شما غیرفعال است".to_string(),
        ));
    }

    let token = encode_jwt(&state, user.id).map_err(|e| {
        tracing::error!("Failed to generate token: {}", e);
        WebError::failed_to_generate_token()
    })?;

    let user = update_last_login(&state, user).await?;
    tracing::info!("User {} logged in", user.id);

    Ok(respond(LoginResponse { token, user }))
}

pub async fn get_me(Extension(user): Extension<MUser>) -> WebResult<Json<BaseResponse<MUser>>> {
    Ok(respond(user))
}

pub async fn patch_password(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    if verify_password(&body.current_password, &user.password).is_err() {
        return Err(WebError::BadRequest(
            "رمز عبور فعلی اشتباه است".to_string(),
        ));
    }

    validate_password(&body.new_password)?;

    let mut auser = user.into_active_model();
    auser.password = Set(generate_hash(&body.new_password));
    auser.updated_at = Set(now());
    auser.update(&state.db).await?;

    Ok(respond("رمز عبور با موفقیت تغییر کرد".to_string()))
}
