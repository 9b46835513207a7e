// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Shelf endpoints, including the addbook reconciliation route and the
//! book-to-shelf bulk import

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::extract::AuthUser;
use crate::api::{ApiState, MessageResponse};
use crate::error::Result;
use crate::inventory::aggregate::{self, ResolvedShelf};
use crate::inventory::import::{self, ImportEntry, ImportReport};
use crate::inventory::reconcile::{self, ShelfOperation};
use crate::storage::models::{NewShelf, Shelf, ShelfUpdate};
use crate::storage::queries;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", post(insert_shelf).get(get_all_shelves))
        .route("/drop", delete(delete_all_shelves))
        .route("/import", post(import_shelves))
        .route("/import/bookstoshelves", post(import_books_to_shelves))
        .route(
            "/{id}",
            get(get_shelf_by_id).put(update_shelf).delete(delete_shelf),
        )
        .route("/{id}/addbook", put(add_book_to_shelf))
}

/// Wire format of the addbook request: legacy mutually-exclusive flags
#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    pub isbn: String,
    pub count: i64,
    #[serde(default)]
    pub increment: bool,
    #[serde(default)]
    pub reset: bool,
    #[serde(default)]
    pub decrease: bool,
}

/// Book-to-shelf import request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntriesRequest {
    pub book_entries: Vec<ImportEntry>,
}

/// Import response: acknowledgement plus the full partition
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: ImportReport,
}

async fn insert_shelf(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(payload): Json<NewShelf>,
) -> Result<(StatusCode, Json<Shelf>)> {
    let shelf = queries::insert_shelf(state.db.pool(), &payload).await?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

async fn get_all_shelves(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Result<Json<Vec<Shelf>>> {
    let shelves = queries::list_shelves(state.db.pool()).await?;
    Ok(Json(shelves))
}

/// Resolved view: every entry joined with its catalog fields
async fn get_shelf_by_id(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(shelf_id): Path<i64>,
) -> Result<Json<ResolvedShelf>> {
    let shelf = aggregate::shelf_with_resolved_books(state.db.pool(), shelf_id).await?;
    Ok(Json(shelf))
}

async fn update_shelf(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(shelf_id): Path<i64>,
    Json(payload): Json<ShelfUpdate>,
) -> Result<Json<Shelf>> {
    let shelf = queries::update_shelf(state.db.pool(), shelf_id, &payload).await?;
    Ok(Json(shelf))
}

async fn delete_shelf(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(shelf_id): Path<i64>,
) -> Result<StatusCode> {
    queries::delete_shelf(state.db.pool(), shelf_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply one inventory operation to a shelf, resolving the book by ISBN
async fn add_book_to_shelf(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(shelf_id): Path<i64>,
    Json(payload): Json<AddBookRequest>,
) -> Result<Json<Shelf>> {
    let op = ShelfOperation::from_flags(
        payload.count,
        payload.increment,
        payload.decrease,
        payload.reset,
    );
    let shelf =
        reconcile::apply_book_operation(state.db.pool(), shelf_id, &payload.isbn, op).await?;
    Ok(Json(shelf))
}

/// Bulk shelf insert, all-or-nothing
async fn import_shelves(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(payload): Json<Vec<NewShelf>>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let inserted = queries::bulk_insert_shelves(state.db.pool(), &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{inserted} shelves imported successfully"),
        }),
    ))
}

/// Merge external (isbn, barcode, count) rows, tolerating per-row failures
async fn import_books_to_shelves(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(payload): Json<BookEntriesRequest>,
) -> Result<Json<ImportResponse>> {
    let report = import::import_book_shelf_entries(state.db.pool(), payload.book_entries).await?;
    Ok(Json(ImportResponse {
        message: "bulk book-to-shelf import finished".to_string(),
        report,
    }))
}

async fn delete_all_shelves(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Result<Json<MessageResponse>> {
    queries::delete_all_shelves(state.db.pool()).await?;
    Ok(Json(MessageResponse {
        message: "all shelves deleted successfully".to_string(),
    }))
}
