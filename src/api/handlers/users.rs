// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Account endpoints: registration, login, listing, deletion
//!
//! Registration and login are the only open routes; they respond with a
//! fresh bearer token. The clear-text password is hashed on the way in and
//! never stored or echoed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::extract::AuthUser;
use crate::api::ApiState;
use crate::auth::{hash_password, verify_password};
use crate::error::{Result, ShelfstockError};
use crate::storage::models::{NewUser, UserSummary};
use crate::storage::users;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/", get(list).post(create))
        .route("/{id}", delete(remove))
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Credential response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Acknowledgement for a deleted account
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub id: i64,
}

async fn register_account(state: &ApiState, payload: NewUser) -> Result<AuthResponse> {
    if !payload.is_complete() {
        return Err(ShelfstockError::validation("all fields are required"));
    }

    if users::find_user_by_email(state.db.pool(), &payload.email)
        .await?
        .is_some()
    {
        return Err(ShelfstockError::conflict(users::DUPLICATE_EMAIL));
    }

    let digest = hash_password(&payload.password)?;
    let user = users::insert_user(state.db.pool(), &payload.name, &payload.email, &digest).await?;

    Ok(AuthResponse {
        id: user.user_id,
        token: state.tokens.issue(user.user_id),
        name: user.name,
        email: user.email,
    })
}

/// Open registration
async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = register_account(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Same as register, but behind a credential (admin-style creation)
async fn create(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = register_account(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = users::find_user_by_email(state.db.pool(), &payload.email)
        .await?
        .ok_or_else(|| ShelfstockError::unauthorized("invalid credentials"))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ShelfstockError::unauthorized("invalid credentials"));
    }

    Ok(Json(AuthResponse {
        id: user.user_id,
        token: state.tokens.issue(user.user_id),
        name: user.name,
        email: user.email,
    }))
}

async fn list(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Result<Json<Vec<UserSummary>>> {
    let users = users::list_users(state.db.pool()).await?;
    if users.is_empty() {
        return Err(ShelfstockError::not_found("user"));
    }

    Ok(Json(users))
}

async fn remove(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<DeleteUserResponse>> {
    users::delete_user(state.db.pool(), user_id).await?;

    Ok(Json(DeleteUserResponse {
        message: "user deleted successfully".to_string(),
        id: user_id,
    }))
}
