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


//! Database query functions for the catalog and shelf stores
//!
//! Repository-style free functions over the connection pool. Writes that
//! touch a shelf's embedded book list always replace the whole `books`
//! column in one statement — the shelf document is the unit of persistence.

use sqlx::SqlitePool;

use crate::error::{conflict_on_unique, Result, ShelfstockError};
use crate::storage::models::{
    Book, BookEntry, BookUpdate, NewBook, NewShelf, Shelf, ShelfRow, ShelfUpdate,
};

/// Conflict message for a duplicate ISBN
pub const DUPLICATE_ISBN: &str = "this ISBN is already in use";
/// Conflict message for a duplicate shelf location
pub const DUPLICATE_LOCATION: &str = "this location is already in use";

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book and return the stored row
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<Book> {
    if !book.is_complete() {
        return Err(ShelfstockError::validation("all book fields are required"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO Books (isbn, title, author, publisher, size, cover_type, price)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.isbn)
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.publisher)
    .bind(&book.size)
    .bind(&book.cover_type)
    .bind(&book.price)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_ISBN))?;

    let inserted = find_book_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| ShelfstockError::Internal("inserted book row missing".to_string()))?;

    Ok(inserted)
}

/// Find book by ID
pub async fn find_book_by_id(pool: &SqlitePool, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// Find book by ISBN
pub async fn find_book_by_isbn(pool: &SqlitePool, isbn: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE isbn = ?")
        .bind(isbn)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// List all books without aggregate data
pub async fn list_books(pool: &SqlitePool) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM Books ORDER BY title")
        .fetch_all(pool)
        .await?;

    Ok(books)
}

/// Partially update a book; absent fields keep their stored value
pub async fn update_book(pool: &SqlitePool, book_id: i64, update: &BookUpdate) -> Result<Book> {
    let result = sqlx::query(
        r#"
        UPDATE Books SET
            isbn = COALESCE(?, isbn),
            title = COALESCE(?, title),
            author = COALESCE(?, author),
            publisher = COALESCE(?, publisher),
            size = COALESCE(?, size),
            cover_type = COALESCE(?, cover_type),
            price = COALESCE(?, price),
            updated_at = CURRENT_TIMESTAMP
        WHERE book_id = ?
        "#,
    )
    .bind(&update.isbn)
    .bind(&update.title)
    .bind(&update.author)
    .bind(&update.publisher)
    .bind(&update.size)
    .bind(&update.cover_type)
    .bind(&update.price)
    .bind(book_id)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_ISBN))?;

    if result.rows_affected() == 0 {
        return Err(ShelfstockError::not_found("book"));
    }

    let book = find_book_by_id(pool, book_id)
        .await?
        .ok_or_else(|| ShelfstockError::not_found("book"))?;

    Ok(book)
}

/// Delete a book and prune its entries from every shelf
///
/// Shelves referencing the book are pruned, never deleted.
pub async fn delete_book(pool: &SqlitePool, book_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM Books WHERE book_id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ShelfstockError::not_found("book"));
    }

    remove_book_from_all_shelves(pool, book_id).await?;

    Ok(())
}

/// Bulk catalog insert, all-or-nothing
///
/// Every record is validated against the same rules as single insert; one
/// bad record or duplicate ISBN rolls the whole batch back.
pub async fn bulk_insert_books(pool: &SqlitePool, books: &[NewBook]) -> Result<u64> {
    if books.is_empty() {
        return Err(ShelfstockError::validation("provide a valid book list"));
    }
    if let Some(bad) = books.iter().find(|b| !b.is_complete()) {
        return Err(ShelfstockError::Validation(format!(
            "all book fields are required (isbn: '{}')",
            bad.isbn
        )));
    }

    let mut tx = pool.begin().await?;
    for book in books {
        sqlx::query(
            r#"
            INSERT INTO Books (isbn, title, author, publisher, size, cover_type, price)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.size)
        .bind(&book.cover_type)
        .bind(&book.price)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_ISBN))?;
    }
    tx.commit().await?;

    Ok(books.len() as u64)
}

/// Delete all books, returning the number removed
pub async fn delete_all_books(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM Books").execute(pool).await?;
    Ok(result.rows_affected())
}

// ============================================================================
// SHELF QUERIES
// ============================================================================

/// Insert a new shelf and return the stored row
pub async fn insert_shelf(pool: &SqlitePool, shelf: &NewShelf) -> Result<Shelf> {
    if !shelf.is_complete() {
        return Err(ShelfstockError::validation(
            "location and barcode are required",
        ));
    }

    let books_json = serde_json::to_string(&shelf.books)?;
    let result = sqlx::query("INSERT INTO Shelves (location, barcode, books) VALUES (?, ?, ?)")
        .bind(&shelf.location)
        .bind(&shelf.barcode)
        .bind(&books_json)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_LOCATION))?;

    let inserted = find_shelf_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| ShelfstockError::Internal("inserted shelf row missing".to_string()))?;

    Ok(inserted)
}

/// Find shelf by ID
pub async fn find_shelf_by_id(pool: &SqlitePool, shelf_id: i64) -> Result<Option<Shelf>> {
    let row = sqlx::query_as::<_, ShelfRow>("SELECT * FROM Shelves WHERE shelf_id = ?")
        .bind(shelf_id)
        .fetch_optional(pool)
        .await?;

    row.map(ShelfRow::decode).transpose()
}

/// Find the first shelf with the given barcode
///
/// Barcode is not unique; the importer resolves to the first match in
/// shelf_id order.
pub async fn find_shelf_by_barcode(pool: &SqlitePool, barcode: &str) -> Result<Option<Shelf>> {
    let row = sqlx::query_as::<_, ShelfRow>(
        "SELECT * FROM Shelves WHERE barcode = ? ORDER BY shelf_id LIMIT 1",
    )
    .bind(barcode)
    .fetch_optional(pool)
    .await?;

    row.map(ShelfRow::decode).transpose()
}

/// List all shelves
pub async fn list_shelves(pool: &SqlitePool) -> Result<Vec<Shelf>> {
    let rows = sqlx::query_as::<_, ShelfRow>("SELECT * FROM Shelves ORDER BY location")
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(ShelfRow::decode).collect()
}

/// Partially update a shelf's own fields (location/barcode only)
pub async fn update_shelf(pool: &SqlitePool, shelf_id: i64, update: &ShelfUpdate) -> Result<Shelf> {
    let result = sqlx::query(
        r#"
        UPDATE Shelves SET
            location = COALESCE(?, location),
            barcode = COALESCE(?, barcode)
        WHERE shelf_id = ?
        "#,
    )
    .bind(&update.location)
    .bind(&update.barcode)
    .bind(shelf_id)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_LOCATION))?;

    if result.rows_affected() == 0 {
        return Err(ShelfstockError::not_found("shelf"));
    }

    let shelf = find_shelf_by_id(pool, shelf_id)
        .await?
        .ok_or_else(|| ShelfstockError::not_found("shelf"))?;

    Ok(shelf)
}

/// Replace a shelf's whole embedded book list in one statement
///
/// This is the single-document write used by the reconciler and the bulk
/// importer.
pub async fn save_shelf_entries(
    pool: &SqlitePool,
    shelf_id: i64,
    entries: &[BookEntry],
) -> Result<()> {
    let books_json = serde_json::to_string(entries)?;
    let result = sqlx::query("UPDATE Shelves SET books = ? WHERE shelf_id = ?")
        .bind(&books_json)
        .bind(shelf_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ShelfstockError::not_found("shelf"));
    }

    Ok(())
}

/// Delete a shelf by id; deleting an absent shelf is a no-op
pub async fn delete_shelf(pool: &SqlitePool, shelf_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM Shelves WHERE shelf_id = ?")
        .bind(shelf_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove every entry referencing `book_id` from every shelf
///
/// Returns the number of shelves rewritten. Only shelves that actually hold
/// an entry for the book are touched.
pub async fn remove_book_from_all_shelves(pool: &SqlitePool, book_id: i64) -> Result<u64> {
    let rows = sqlx::query_as::<_, ShelfRow>(
        r#"
        SELECT * FROM Shelves s
        WHERE EXISTS (
            SELECT 1 FROM json_each(s.books) je
            WHERE CAST(json_extract(je.value, '$.bookId') AS INTEGER) = ?
        )
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    let mut pruned = 0u64;
    for row in rows {
        let shelf = row.decode()?;
        let remaining: Vec<BookEntry> = shelf
            .books
            .into_iter()
            .filter(|entry| entry.book_id != book_id)
            .collect();
        save_shelf_entries(pool, shelf.shelf_id, &remaining).await?;
        pruned += 1;
    }

    Ok(pruned)
}

/// Bulk shelf insert, all-or-nothing
pub async fn bulk_insert_shelves(pool: &SqlitePool, shelves: &[NewShelf]) -> Result<u64> {
    if shelves.is_empty() {
        return Err(ShelfstockError::validation("provide a valid shelf list"));
    }
    if let Some(bad) = shelves.iter().find(|s| !s.is_complete()) {
        return Err(ShelfstockError::Validation(format!(
            "location and barcode are required (location: '{}')",
            bad.location
        )));
    }

    let mut tx = pool.begin().await?;
    for shelf in shelves {
        let books_json = serde_json::to_string(&shelf.books)?;
        sqlx::query("INSERT INTO Shelves (location, barcode, books) VALUES (?, ?, ?)")
            .bind(&shelf.location)
            .bind(&shelf.barcode)
            .bind(&books_json)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_LOCATION))?;
    }
    tx.commit().await?;

    Ok(shelves.len() as u64)
}

/// Delete all shelves, returning the number removed
pub async fn delete_all_shelves(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM Shelves").execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    fn sample_book(isbn: &str, title: &str) -> NewBook {
        NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "Sabahattin Ali".to_string(),
            publisher: "YKY".to_string(),
            size: "13.5x21".to_string(),
            cover_type: "paperback".to_string(),
            price: "120".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_book() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let book = insert_book(db.pool(), &sample_book("9789750718533", "Kürk Mantolu Madonna"))
            .await
            .expect("Failed to insert book");
        assert!(book.book_id > 0);

        let found = find_book_by_isbn(db.pool(), "9789750718533")
            .await
            .expect("Failed to find book")
            .expect("Book missing");
        assert_eq!(found.title, "Kürk Mantolu Madonna");
    }

    #[tokio::test]
    async fn test_duplicate_isbn_is_conflict() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        insert_book(db.pool(), &sample_book("111", "First"))
            .await
            .expect("Failed to insert book");
        let err = insert_book(db.pool(), &sample_book("111", "Second"))
            .await
            .expect_err("Duplicate ISBN must be rejected");

        assert!(matches!(err, ShelfstockError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unset_fields() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let book = insert_book(db.pool(), &sample_book("222", "Original"))
            .await
            .expect("Failed to insert book");

        let update = BookUpdate {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = update_book(db.pool(), book.book_id, &update)
            .await
            .expect("Failed to update book");

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.author, "Sabahattin Ali");
        assert_eq!(updated.isbn, "222");
    }

    #[tokio::test]
    async fn test_delete_book_prunes_shelves() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let kept = insert_book(db.pool(), &sample_book("333", "Kept"))
            .await
            .expect("Failed to insert book");
        let removed = insert_book(db.pool(), &sample_book("444", "Removed"))
            .await
            .expect("Failed to insert book");

        let shelf = insert_shelf(
            db.pool(),
            &NewShelf {
                location: "A-1".to_string(),
                barcode: "RAF-001".to_string(),
                books: vec![
                    BookEntry { book_id: kept.book_id, count: 2 },
                    BookEntry { book_id: removed.book_id, count: 5 },
                ],
            },
        )
        .await
        .expect("Failed to insert shelf");

        delete_book(db.pool(), removed.book_id)
            .await
            .expect("Failed to delete book");

        let reloaded = find_shelf_by_id(db.pool(), shelf.shelf_id)
            .await
            .expect("Failed to reload shelf")
            .expect("Shelf missing");
        assert_eq!(
            reloaded.books,
            vec![BookEntry { book_id: kept.book_id, count: 2 }]
        );
    }

    #[tokio::test]
    async fn test_barcode_lookup_returns_first_match() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let first = insert_shelf(db.pool(), &NewShelf::new("A-1".to_string(), "DUP".to_string()))
            .await
            .expect("Failed to insert shelf");
        insert_shelf(db.pool(), &NewShelf::new("A-2".to_string(), "DUP".to_string()))
            .await
            .expect("Failed to insert shelf");

        let found = find_shelf_by_barcode(db.pool(), "DUP")
            .await
            .expect("Failed to find shelf")
            .expect("Shelf missing");
        assert_eq!(found.shelf_id, first.shelf_id);
    }

    #[tokio::test]
    async fn test_bulk_insert_books_rolls_back_on_duplicate() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let batch = vec![
            sample_book("555", "One"),
            sample_book("555", "Duplicate inside batch"),
        ];
        let err = bulk_insert_books(db.pool(), &batch)
            .await
            .expect_err("Duplicate inside batch must fail");
        assert!(matches!(err, ShelfstockError::Conflict(_)));

        let books = list_books(db.pool()).await.expect("Failed to list books");
        assert!(books.is_empty(), "No row from the failed batch may remain");
    }

    #[tokio::test]
    async fn test_save_shelf_entries_missing_shelf() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let err = save_shelf_entries(db.pool(), 99, &[])
            .await
            .expect_err("Saving to an absent shelf must fail");
        assert!(matches!(err, ShelfstockError::NotFound(_)));
    }
}
