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


//! Database storage and models
//!
//! SQLite persistence for the three stores: catalog (Books), shelves with
//! their embedded book-count lists, and user accounts. The shelf's entry
//! list is a JSON column; a shelf is always written back as a whole
//! document.
//!
//! # Usage Example
//! ```no_run
//! use shelfstock::storage::{queries, Database};
//! use shelfstock::storage::models::NewBook;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./stock.db").await?;
//!
//! let mut book = NewBook::new(
//!     "9789750718533".to_string(),
//!     "Kürk Mantolu Madonna".to_string(),
//!     "Sabahattin Ali".to_string(),
//! );
//! book.publisher = "YKY".to_string();
//! book.size = "13.5x21".to_string();
//! book.cover_type = "paperback".to_string();
//! book.price = "120".to_string();
//!
//! let stored = queries::insert_book(db.pool(), &book).await?;
//! assert!(stored.book_id > 0);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod users;

// Re-export commonly used types
pub use database::Database;
pub use models::{
    Book, BookEntry, BookUpdate, NewBook, NewShelf, NewUser, Shelf, ShelfUpdate, User,
    UserSummary,
};
