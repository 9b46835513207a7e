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


//! Read-only aggregate views over the catalog and shelf stores
//!
//! Totals are computed in SQL by unnesting the shelves' JSON book lists with
//! `json_each`. Book references inside shelves are weak, so the resolved
//! shelf view keeps entries whose catalog row has vanished — count
//! preserved, details absent.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::{Result, ShelfstockError};
use crate::storage::models::Book;
use crate::storage::queries;

/// A catalog row with its cross-shelf total attached
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookWithTotal {
    #[serde(rename = "id")]
    pub book_id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub size: String,
    pub cover_type: String,
    pub price: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_count: i64,
}

/// One shelf's placement of a particular book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShelfPlacement {
    pub location: String,
    pub barcode: String,
    pub count: i64,
}

/// A book with its per-shelf location/count breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailView {
    #[serde(flatten)]
    pub book: Book,
    pub shelf_details: Vec<ShelfPlacement>,
}

/// Catalog fields joined into a resolved shelf entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub author: String,
}

/// One shelf entry with its book reference resolved
///
/// `book_details` is None when the referenced catalog row no longer exists;
/// the count is preserved either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntry {
    pub count: i64,
    pub book_details: Option<BookDetails>,
}

/// A shelf with every entry resolved against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShelf {
    pub id: i64,
    pub location: String,
    pub barcode: String,
    pub books: Vec<ResolvedEntry>,
}

/// Total count of one book across every shelf, 0 when unshelved
pub async fn total_count_for_book(pool: &SqlitePool, book_id: i64) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(CAST(json_extract(je.value, '$.count') AS INTEGER)), 0)
        FROM Shelves s, json_each(s.books) je
        WHERE CAST(json_extract(je.value, '$.bookId') AS INTEGER) = ?
        "#,
    )
    .bind(book_id)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Every catalog book with its total attached, for listing
pub async fn books_with_totals(pool: &SqlitePool) -> Result<Vec<BookWithTotal>> {
    let books = sqlx::query_as::<_, BookWithTotal>(
        r#"
        WITH shelf_totals AS (
            SELECT
                CAST(json_extract(je.value, '$.bookId') AS INTEGER) AS book_id,
                SUM(CAST(json_extract(je.value, '$.count') AS INTEGER)) AS total_count
            FROM Shelves s, json_each(s.books) je
            GROUP BY CAST(json_extract(je.value, '$.bookId') AS INTEGER)
        )
        SELECT
            b.book_id,
            b.isbn,
            b.title,
            b.author,
            b.publisher,
            b.size,
            b.cover_type,
            b.price,
            b.created_at,
            b.updated_at,
            COALESCE(st.total_count, 0) AS total_count
        FROM Books b
        LEFT JOIN shelf_totals st ON st.book_id = b.book_id
        ORDER BY b.title
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(books)
}

/// Per-shelf placements of one book
pub async fn book_shelf_placements(pool: &SqlitePool, book_id: i64) -> Result<Vec<ShelfPlacement>> {
    let placements = sqlx::query_as::<_, ShelfPlacement>(
        r#"
        SELECT
            s.location,
            s.barcode,
            CAST(json_extract(je.value, '$.count') AS INTEGER) AS count
        FROM Shelves s, json_each(s.books) je
        WHERE CAST(json_extract(je.value, '$.bookId') AS INTEGER) = ?
        ORDER BY s.location
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(placements)
}

/// One book with its shelf breakdown; NotFound when the book is absent
pub async fn book_with_placements(pool: &SqlitePool, book_id: i64) -> Result<BookDetailView> {
    let book = queries::find_book_by_id(pool, book_id)
        .await?
        .ok_or_else(|| ShelfstockError::not_found("book"))?;

    let shelf_details = book_shelf_placements(pool, book_id).await?;

    Ok(BookDetailView { book, shelf_details })
}

/// A shelf with each entry's book reference resolved against the catalog
///
/// Dangling references stay in the list with `bookDetails: null`.
pub async fn shelf_with_resolved_books(pool: &SqlitePool, shelf_id: i64) -> Result<ResolvedShelf> {
    let shelf = queries::find_shelf_by_id(pool, shelf_id)
        .await?
        .ok_or_else(|| ShelfstockError::not_found("shelf"))?;

    let mut books = Vec::with_capacity(shelf.books.len());
    for entry in &shelf.books {
        let book_details = queries::find_book_by_id(pool, entry.book_id)
            .await?
            .map(|book| BookDetails {
                id: book.book_id,
                title: book.title,
                isbn: book.isbn,
                author: book.author,
            });
        books.push(ResolvedEntry { count: entry.count, book_details });
    }

    Ok(ResolvedShelf {
        id: shelf.shelf_id,
        location: shelf.location,
        barcode: shelf.barcode,
        books,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use crate::storage::models::{BookEntry, NewBook, NewShelf};

    async fn seed_book(db: &Database, isbn: &str, title: &str) -> Book {
        let mut book = NewBook::new(isbn.to_string(), title.to_string(), "A".to_string());
        book.publisher = "P".to_string();
        book.size = "S".to_string();
        book.cover_type = "C".to_string();
        book.price = "1".to_string();
        queries::insert_book(db.pool(), &book)
            .await
            .expect("Failed to insert book")
    }

    async fn seed_shelf(db: &Database, location: &str, books: Vec<BookEntry>) {
        queries::insert_shelf(
            db.pool(),
            &NewShelf {
                location: location.to_string(),
                barcode: format!("{location}-BC"),
                books,
            },
        )
        .await
        .expect("Failed to insert shelf");
    }

    #[tokio::test]
    async fn totals_sum_across_shelves() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let book = seed_book(&db, "A123", "Tutunamayanlar").await;

        seed_shelf(&db, "A-1", vec![BookEntry { book_id: book.book_id, count: 3 }]).await;
        seed_shelf(&db, "B-2", vec![BookEntry { book_id: book.book_id, count: 4 }]).await;
        seed_shelf(&db, "C-3", vec![]).await;

        let total = total_count_for_book(db.pool(), book.book_id)
            .await
            .expect("Failed to compute total");
        assert_eq!(total, 7);

        // an unshelved book totals zero
        let other = seed_book(&db, "B456", "Aylak Adam").await;
        let total = total_count_for_book(db.pool(), other.book_id)
            .await
            .expect("Failed to compute total");
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn listing_attaches_totals() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let book = seed_book(&db, "A123", "Tutunamayanlar").await;
        seed_shelf(&db, "A-1", vec![BookEntry { book_id: book.book_id, count: 3 }]).await;

        let listed = books_with_totals(db.pool())
            .await
            .expect("Failed to list books");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total_count, 3);
        assert_eq!(listed[0].isbn, "A123");
    }

    #[tokio::test]
    async fn resolved_view_keeps_dangling_entries() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let book = seed_book(&db, "A123", "Tutunamayanlar").await;
        queries::insert_shelf(
            db.pool(),
            &NewShelf {
                location: "A-1".to_string(),
                barcode: "RAF-001".to_string(),
                books: vec![
                    BookEntry { book_id: book.book_id, count: 3 },
                    BookEntry { book_id: 9999, count: 2 },
                ],
            },
        )
        .await
        .expect("Failed to insert shelf");

        let shelf_id = queries::list_shelves(db.pool())
            .await
            .expect("Failed to list shelves")[0]
            .shelf_id;
        let resolved = shelf_with_resolved_books(db.pool(), shelf_id)
            .await
            .expect("Failed to resolve shelf");

        assert_eq!(resolved.books.len(), 2);
        let with_details = &resolved.books[0];
        assert_eq!(with_details.count, 3);
        assert_eq!(
            with_details.book_details.as_ref().map(|d| d.isbn.as_str()),
            Some("A123")
        );
        let dangling = &resolved.books[1];
        assert_eq!(dangling.count, 2);
        assert!(dangling.book_details.is_none());
    }

    #[tokio::test]
    async fn resolved_view_requires_the_shelf() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let err = shelf_with_resolved_books(db.pool(), 1)
            .await
            .expect_err("Absent shelf must fail");
        assert_eq!(err.to_string(), "shelf not found");
    }

    #[tokio::test]
    async fn deleting_a_shelf_reduces_the_total() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let book = seed_book(&db, "A123", "Tutunamayanlar").await;
        seed_shelf(&db, "A-1", vec![BookEntry { book_id: book.book_id, count: 3 }]).await;
        seed_shelf(&db, "B-2", vec![BookEntry { book_id: book.book_id, count: 4 }]).await;

        let shelves = queries::list_shelves(db.pool()).await.expect("Failed to list");
        let removed = shelves.iter().find(|s| s.location == "B-2").unwrap();
        queries::delete_shelf(db.pool(), removed.shelf_id)
            .await
            .expect("Failed to delete shelf");

        let total = total_count_for_book(db.pool(), book.book_id)
            .await
            .expect("Failed to compute total");
        assert_eq!(total, 3);
    }
}
