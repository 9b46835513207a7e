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


//! Inventory reconciliation
//!
//! Computes a shelf's new embedded book-count list for a single requested
//! operation. The entry list is reconciled in memory as a pure function and
//! the shelf is then persisted as one document.
//!
//! Rules:
//! - A shelf holds at most one entry per book; an existing entry is updated
//!   in place, never duplicated.
//! - An entry's count stays > 0 for as long as the entry exists. Any
//!   operation that would take it to zero or below removes the entry.

use sqlx::SqlitePool;

use crate::error::{Result, ShelfstockError};
use crate::storage::models::{BookEntry, Shelf};
use crate::storage::queries;

/// Message for an add that would create an empty entry
pub const ERR_ZERO_QUANTITY: &str = "cannot add zero quantity";

/// One requested change to a (shelf, book) count
///
/// The wire format still carries the legacy `increment`/`reset`/`decrease`
/// booleans; [`ShelfOperation::from_flags`] folds them into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfOperation {
    /// Add `n` to the existing count (unbounded)
    Increment(i64),
    /// Subtract `n`; at or below zero the entry is dropped
    Decrease(i64),
    /// Overwrite the count with exactly `n`; zero drops the entry
    Reset(i64),
    /// Create the entry if missing, leave an existing entry untouched
    AddIfAbsent(i64),
}

impl ShelfOperation {
    /// Fold the legacy mutually-exclusive flags into an operation
    ///
    /// When several flags are set at once, increment wins over decrease,
    /// which wins over reset; no flag at all means add-if-absent. This
    /// mirrors the established client behavior exactly.
    pub fn from_flags(count: i64, increment: bool, decrease: bool, reset: bool) -> Self {
        if increment {
            ShelfOperation::Increment(count)
        } else if decrease {
            ShelfOperation::Decrease(count)
        } else if reset {
            ShelfOperation::Reset(count)
        } else {
            ShelfOperation::AddIfAbsent(count)
        }
    }

    /// The requested count carried by the operation
    pub fn requested_count(&self) -> i64 {
        match *self {
            ShelfOperation::Increment(n)
            | ShelfOperation::Decrease(n)
            | ShelfOperation::Reset(n)
            | ShelfOperation::AddIfAbsent(n) => n,
        }
    }
}

/// Reconcile a shelf's entry list against one operation, in place
///
/// Pure list logic; persistence is the caller's concern. Returns an error
/// only for invalid requested counts — a reconcilable request always
/// succeeds, possibly as a no-op.
pub fn reconcile_entries(
    entries: &mut Vec<BookEntry>,
    book_id: i64,
    op: ShelfOperation,
) -> Result<()> {
    let n = op.requested_count();
    if n < 0 {
        return Err(ShelfstockError::validation("count cannot be negative"));
    }

    let existing = entries.iter().position(|entry| entry.book_id == book_id);

    let Some(index) = existing else {
        return match op {
            ShelfOperation::Reset(0) | ShelfOperation::AddIfAbsent(0) => {
                Err(ShelfstockError::validation(ERR_ZERO_QUANTITY))
            }
            // Adding zero of a book that isn't there is nothing to record
            ShelfOperation::Increment(0) | ShelfOperation::Decrease(0) => Ok(()),
            _ => {
                entries.push(BookEntry { book_id, count: n });
                Ok(())
            }
        };
    };

    match op {
        ShelfOperation::Increment(n) => {
            entries[index].count += n;
        }
        ShelfOperation::Decrease(n) => {
            let new_count = entries[index].count - n;
            if new_count <= 0 {
                entries.remove(index);
            } else {
                entries[index].count = new_count;
            }
        }
        ShelfOperation::Reset(0) => {
            entries.remove(index);
        }
        ShelfOperation::Reset(n) => {
            entries[index].count = n;
        }
        ShelfOperation::AddIfAbsent(_) => {
            // Entry already present; legacy no-flag requests save unchanged
        }
    }

    Ok(())
}

/// Apply one operation to a shelf, resolving the book by ISBN
///
/// Loads the shelf, reconciles its list, and persists the whole document.
/// Returns the updated shelf.
pub async fn apply_book_operation(
    pool: &SqlitePool,
    shelf_id: i64,
    isbn: &str,
    op: ShelfOperation,
) -> Result<Shelf> {
    let book = queries::find_book_by_isbn(pool, isbn)
        .await?
        .ok_or_else(|| ShelfstockError::not_found("book"))?;

    let mut shelf = queries::find_shelf_by_id(pool, shelf_id)
        .await?
        .ok_or_else(|| ShelfstockError::not_found("shelf"))?;

    reconcile_entries(&mut shelf.books, book.book_id, op)?;
    queries::save_shelf_entries(pool, shelf.shelf_id, &shelf.books).await?;

    Ok(shelf)
}
