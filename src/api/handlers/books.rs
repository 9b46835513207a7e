// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Catalog endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::extract::AuthUser;
use crate::api::{ApiState, MessageResponse};
use crate::error::Result;
use crate::inventory::aggregate::{self, BookDetailView, BookWithTotal};
use crate::storage::models::{Book, BookUpdate, NewBook};
use crate::storage::queries;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", post(insert_book).get(get_all_books))
        .route("/drop", delete(delete_all_books))
        .route("/import", post(import_books))
        .route(
            "/{id}",
            get(get_book_by_id).put(update_book).delete(delete_book),
        )
}

async fn insert_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(payload): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>)> {
    let book = queries::insert_book(state.db.pool(), &payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Catalog listing with cross-shelf totals attached
async fn get_all_books(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Result<Json<Vec<BookWithTotal>>> {
    let books = aggregate::books_with_totals(state.db.pool()).await?;
    Ok(Json(books))
}

/// One book plus its per-shelf location/count breakdown
async fn get_book_by_id(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
) -> Result<Json<BookDetailView>> {
    let view = aggregate::book_with_placements(state.db.pool(), book_id).await?;
    Ok(Json(view))
}

async fn update_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<Book>> {
    let book = queries::update_book(state.db.pool(), book_id, &payload).await?;
    Ok(Json(book))
}

/// Delete a book and prune its entries from every shelf
async fn delete_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(book_id): Path<i64>,
) -> Result<StatusCode> {
    queries::delete_book(state.db.pool(), book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk catalog insert, all-or-nothing
async fn import_books(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(payload): Json<Vec<NewBook>>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let inserted = queries::bulk_insert_books(state.db.pool(), &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{inserted} books imported successfully"),
        }),
    ))
}

async fn delete_all_books(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Result<Json<MessageResponse>> {
    queries::delete_all_books(state.db.pool()).await?;
    Ok(Json(MessageResponse {
        message: "all books deleted successfully".to_string(),
    }))
}
