// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! User account storage operations
//!
//! Accounts are created at registration and deleted by id; there is no
//! update path. The password digest is written here and compared in the
//! auth layer — it is never returned by the listing query.

use sqlx::SqlitePool;

use crate::error::{conflict_on_unique, Result, ShelfstockError};
use crate::storage::models::{User, UserSummary};

/// Conflict message for a duplicate email
pub const DUPLICATE_EMAIL: &str = "user is already registered";

/// Insert a new user with an already-hashed password
pub async fn insert_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let result = sqlx::query("INSERT INTO Users (name, email, password_hash) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))?;

    let user = find_user_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| ShelfstockError::Internal("inserted user row missing".to_string()))?;

    Ok(user)
}

/// Find user by id
pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, name, email, password_hash FROM Users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Find user by email (login path)
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, name, email, password_hash FROM Users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// List users for display, credential material excluded
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT user_id, name, email FROM Users ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Delete user by id
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM Users WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ShelfstockError::not_found("user"));
    }

    Ok(())
}
