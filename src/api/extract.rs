// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Request guards
//!
//! [`AuthUser`] gates every protected handler: it validates the bearer
//! token and loads the account it was issued for, rejecting with 401 when
//! either step fails.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::ApiState;
use crate::error::ShelfstockError;
use crate::storage::models::User;
use crate::storage::users;

/// The authenticated caller, resolved from the Authorization header
pub struct AuthUser(pub User);

impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = ShelfstockError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ShelfstockError::unauthorized("missing bearer token"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ShelfstockError::unauthorized("missing bearer token"))?;

        let user_id = state.tokens.validate(token)?;

        // The token may outlive the account
        let user = users::find_user_by_id(state.db.pool(), user_id)
            .await?
            .ok_or_else(|| ShelfstockError::unauthorized("unknown user"))?;

        Ok(AuthUser(user))
    }
}
