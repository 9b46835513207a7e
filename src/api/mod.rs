// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! REST API
//!
//! HTTP surface over the stores and the inventory core:
//! - `/api/books` — catalog CRUD, bulk import, totals listing
//! - `/api/shelves` — shelf CRUD, the addbook reconciliation endpoint,
//!   bulk shelf insert, book-to-shelf import
//! - `/api/users` — registration, login, listing, deletion
//!
//! Everything except register/login/health requires a bearer token.

pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::TokenService;
use crate::error::ShelfstockError;
use crate::storage::Database;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Storage handle for all three stores
    pub db: Database,
    /// Bearer token issuer/validator
    pub tokens: Arc<TokenService>,
}

impl ApiState {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
        }
    }
}

/// Build the full application router
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/users", handlers::users::routes())
        .nest("/api/books", handlers::books::routes())
        .nest("/api/shelves", handlers::shelves::routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Error body shape: `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Plain acknowledgement body for deletes and bulk inserts
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl IntoResponse for ShelfstockError {
    fn into_response(self) -> Response {
        let status = match &self {
            ShelfstockError::Validation(_) => StatusCode::BAD_REQUEST,
            ShelfstockError::NotFound(_) => StatusCode::NOT_FOUND,
            ShelfstockError::Conflict(_) => StatusCode::CONFLICT,
            ShelfstockError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShelfstockError::Database(_)
            | ShelfstockError::Serialization(_)
            | ShelfstockError::Internal(_) => {
                error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            message: self.user_message(),
        });

        (status, body).into_response()
    }
}

/// Liveness response for `/api/health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let storage = match state.db.quick_check().await {
        Ok(true) => "ok",
        Ok(false) => "corrupt",
        Err(_) => "unreachable",
    };

    Json(HealthResponse {
        status: "up".to_string(),
        storage: storage.to_string(),
    })
}
