//! Database models for Shelfstock
//!
//! Entity models for the catalog, shelf, and user stores, mapped to SQLite
//! with sqlx.
//!
//! # SQLite Adaptations
//! - The shelf's embedded book list is stored as a JSON string column
//!   (SQLite has no native array type); [`Shelf`] carries the decoded list
//!   and [`ShelfRow`] the raw column.
//! - DateTime stored as TEXT via CURRENT_TIMESTAMP defaults.
//!
//! # Wire Casing
//! API-facing structs serialize in camelCase to match the established wire
//! format (`coverType`, `totalCount`, `bookDetails`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::Result;

// ============================================================================
// CATALOG
// ============================================================================

/// A catalog book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "id")]
    pub book_id: i64,
    /// Unique across the catalog
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    /// Physical size, free-form ("13.5x21cm")
    pub size: String,
    pub cover_type: String,
    /// Kept as a string, the catalog does no arithmetic on it
    pub price: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for inserting a book (all fields required)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub size: String,
    pub cover_type: String,
    pub price: String,
}

impl NewBook {
    pub fn new(isbn: String, title: String, author: String) -> Self {
        Self {
            isbn,
            title,
            author,
            publisher: String::new(),
            size: String::new(),
            cover_type: String::new(),
            price: String::new(),
        }
    }

    /// All required fields present and non-empty
    pub fn is_complete(&self) -> bool {
        !(self.isbn.trim().is_empty()
            || self.title.trim().is_empty()
            || self.author.trim().is_empty()
            || self.publisher.trim().is_empty()
            || self.size.trim().is_empty()
            || self.cover_type.trim().is_empty()
            || self.price.trim().is_empty())
    }
}

/// Partial update for a book; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub size: Option<String>,
    pub cover_type: Option<String>,
    pub price: Option<String>,
}

// ============================================================================
// SHELVES
// ============================================================================

/// One embedded (book, count) pair inside a shelf
///
/// The book reference is weak: the catalog row may be deleted underneath it
/// and views must tolerate the dangling id. Invariant: count > 0 while the
/// entry exists; entries are removed rather than stored at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntry {
    pub book_id: i64,
    pub count: i64,
}

/// A shelf with its decoded book entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    #[serde(rename = "id")]
    pub shelf_id: i64,
    /// Unique location label
    pub location: String,
    /// Physical barcode, not necessarily unique
    pub barcode: String,
    pub books: Vec<BookEntry>,
}

/// Raw shelf row as stored; `books` is the JSON column
#[derive(Debug, Clone, FromRow)]
pub struct ShelfRow {
    pub shelf_id: i64,
    pub location: String,
    pub barcode: String,
    pub books: String,
}

impl ShelfRow {
    /// Decode the JSON book list into a [`Shelf`]
    pub fn decode(self) -> Result<Shelf> {
        let books: Vec<BookEntry> = serde_json::from_str(&self.books)?;
        Ok(Shelf {
            shelf_id: self.shelf_id,
            location: self.location,
            barcode: self.barcode,
            books,
        })
    }
}

/// Input for inserting a shelf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShelf {
    pub location: String,
    pub barcode: String,
    /// Optional initial entries; defaults to empty
    #[serde(default)]
    pub books: Vec<BookEntry>,
}

impl NewShelf {
    pub fn new(location: String, barcode: String) -> Self {
        Self {
            location,
            barcode,
            books: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !(self.location.trim().is_empty() || self.barcode.trim().is_empty())
    }
}

/// Partial update for a shelf's own fields (never touches the book list)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfUpdate {
    pub location: Option<String>,
    pub barcode: Option<String>,
}

// ============================================================================
// USERS
// ============================================================================

/// A user account row; the password digest never leaves the storage layer
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Public listing view of a user (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "id")]
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

/// Input for registering a user; `password` is the clear text to be hashed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn is_complete(&self) -> bool {
        !(self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelf_row_decodes_entries() {
        let row = ShelfRow {
            shelf_id: 1,
            location: "A-1".to_string(),
            barcode: "RAF-001".to_string(),
            books: r#"[{"bookId":7,"count":3}]"#.to_string(),
        };

        let shelf = row.decode().expect("Failed to decode shelf row");
        assert_eq!(shelf.books, vec![BookEntry { book_id: 7, count: 3 }]);
    }

    #[test]
    fn shelf_row_rejects_malformed_json() {
        let row = ShelfRow {
            shelf_id: 1,
            location: "A-1".to_string(),
            barcode: "RAF-001".to_string(),
            books: "not json".to_string(),
        };

        assert!(row.decode().is_err());
    }

    #[test]
    fn new_book_completeness() {
        let mut book = NewBook::new(
            "9789750718533".to_string(),
            "Kürk Mantolu Madonna".to_string(),
            "Sabahattin Ali".to_string(),
        );
        assert!(!book.is_complete());

        book.publisher = "YKY".to_string();
        book.size = "13.5x21".to_string();
        book.cover_type = "paperback".to_string();
        book.price = "120".to_string();
        assert!(book.is_complete());
    }
}
