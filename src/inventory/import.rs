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


//! Bulk book-to-shelf import
//!
//! Merges external `(isbn, barcode, count)` rows into the shelf store with
//! increment semantics. Each row stands alone: a bad row is recorded in the
//! failure list and the batch continues. Only an empty batch is an error for
//! the call itself.
//!
//! Rows are processed strictly in order, one at a time — two rows hitting
//! the same shelf must each see the previous row's effect.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{Result, ShelfstockError};
use crate::inventory::reconcile::{reconcile_entries, ShelfOperation};
use crate::storage::queries;

/// Per-row failure reasons, fixed strings the clients match on
pub const ERR_INVALID_ENTRY: &str = "missing or invalid data";
pub const ERR_BOOK_NOT_FOUND: &str = "book not found";
pub const ERR_SHELF_NOT_FOUND: &str = "shelf not found";
pub const ERR_SAVE_FAILED: &str = "failed to save to shelf";

/// One external import row
///
/// Fields default so a malformed row reaches the per-row validation step
/// instead of failing the whole request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEntry {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub count: Option<i64>,
}

impl ImportEntry {
    fn is_valid(&self) -> bool {
        !self.isbn.trim().is_empty()
            && !self.barcode.trim().is_empty()
            && matches!(self.count, Some(n) if n >= 0)
    }
}

/// A row that was applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSuccess {
    pub entry: ImportEntry,
    pub success: bool,
}

/// A row that was skipped, with the reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFailure {
    pub entry: ImportEntry,
    pub error: String,
}

/// Full partition of a batch into applied and skipped rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub updates: Vec<ImportSuccess>,
    pub errors: Vec<ImportFailure>,
}

impl ImportReport {
    fn succeed(&mut self, entry: ImportEntry) {
        self.updates.push(ImportSuccess { entry, success: true });
    }

    fn fail(&mut self, entry: ImportEntry, error: &str) {
        self.errors.push(ImportFailure { entry, error: error.to_string() });
    }
}

/// Apply a batch of import rows, sequentially and independently
///
/// Returns the full partition; per-row failures never fail the call. An
/// empty batch is the one fatal input.
pub async fn import_book_shelf_entries(
    pool: &SqlitePool,
    entries: Vec<ImportEntry>,
) -> Result<ImportReport> {
    if entries.is_empty() {
        return Err(ShelfstockError::validation("provide a valid entry list"));
    }

    let mut report = ImportReport::default();

    for entry in entries {
        if !entry.is_valid() {
            report.fail(entry, ERR_INVALID_ENTRY);
            continue;
        }
        let count = entry.count.unwrap_or(0);

        let book = match queries::find_book_by_isbn(pool, &entry.isbn).await? {
            Some(book) => book,
            None => {
                report.fail(entry, ERR_BOOK_NOT_FOUND);
                continue;
            }
        };

        let mut shelf = match queries::find_shelf_by_barcode(pool, &entry.barcode).await? {
            Some(shelf) => shelf,
            None => {
                report.fail(entry, ERR_SHELF_NOT_FOUND);
                continue;
            }
        };

        if reconcile_entries(&mut shelf.books, book.book_id, ShelfOperation::Increment(count))
            .is_err()
        {
            report.fail(entry, ERR_INVALID_ENTRY);
            continue;
        }

        match queries::save_shelf_entries(pool, shelf.shelf_id, &shelf.books).await {
            Ok(()) => report.succeed(entry),
            Err(_) => report.fail(entry, ERR_SAVE_FAILED),
        }
    }

    debug!(
        applied = report.updates.len(),
        skipped = report.errors.len(),
        "book-to-shelf import finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use crate::storage::models::{NewBook, NewShelf};

    fn row(isbn: &str, barcode: &str, count: i64) -> ImportEntry {
        ImportEntry {
            isbn: isbn.to_string(),
            barcode: barcode.to_string(),
            count: Some(count),
        }
    }

    async fn seed(db: &Database) {
        let mut book = NewBook::new("A123".to_string(), "T".to_string(), "A".to_string());
        book.publisher = "P".to_string();
        book.size = "S".to_string();
        book.cover_type = "C".to_string();
        book.price = "1".to_string();
        queries::insert_book(db.pool(), &book)
            .await
            .expect("Failed to insert book");
        queries::insert_shelf(db.pool(), &NewShelf::new("X".to_string(), "X-BC".to_string()))
            .await
            .expect("Failed to insert shelf");
    }

    #[tokio::test]
    async fn repeated_rows_accumulate_sequentially() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        seed(&db).await;

        let report = import_book_shelf_entries(
            db.pool(),
            vec![row("A123", "X-BC", 5), row("A123", "X-BC", 3)],
        )
        .await
        .expect("Import must succeed");

        assert_eq!(report.updates.len(), 2);
        assert!(report.errors.is_empty());

        let shelf = queries::find_shelf_by_barcode(db.pool(), "X-BC")
            .await
            .expect("Failed to find shelf")
            .expect("Shelf missing");
        assert_eq!(shelf.books.len(), 1);
        assert_eq!(shelf.books[0].count, 8);
    }

    #[tokio::test]
    async fn bad_rows_do_not_abort_the_batch() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        seed(&db).await;

        let report = import_book_shelf_entries(
            db.pool(),
            vec![
                row("NOPE", "X-BC", 2),
                row("A123", "NOPE", 2),
                ImportEntry { isbn: String::new(), barcode: "X-BC".to_string(), count: Some(1) },
                row("A123", "X-BC", -4),
                row("A123", "X-BC", 2),
            ],
        )
        .await
        .expect("Import must succeed");

        assert_eq!(report.updates.len(), 1);
        assert_eq!(report.errors.len(), 4);
        assert_eq!(report.errors[0].error, ERR_BOOK_NOT_FOUND);
        assert_eq!(report.errors[1].error, ERR_SHELF_NOT_FOUND);
        assert_eq!(report.errors[2].error, ERR_INVALID_ENTRY);
        assert_eq!(report.errors[3].error, ERR_INVALID_ENTRY);

        let shelf = queries::find_shelf_by_barcode(db.pool(), "X-BC")
            .await
            .expect("Failed to find shelf")
            .expect("Shelf missing");
        assert_eq!(shelf.books[0].count, 2);
    }

    #[tokio::test]
    async fn empty_batch_is_fatal() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let err = import_book_shelf_entries(db.pool(), Vec::new())
            .await
            .expect_err("Empty batch must fail");
        assert!(matches!(err, ShelfstockError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_count_row_succeeds_without_creating_entry() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        seed(&db).await;

        let report = import_book_shelf_entries(db.pool(), vec![row("A123", "X-BC", 0)])
            .await
            .expect("Import must succeed");
        assert_eq!(report.updates.len(), 1);

        let shelf = queries::find_shelf_by_barcode(db.pool(), "X-BC")
            .await
            .expect("Failed to find shelf")
            .expect("Shelf missing");
        assert!(shelf.books.is_empty());
    }
}
