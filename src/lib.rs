//! Shelfstock - library shelf inventory service
//!
//! Tracks a book catalog, physical shelves, and per-shelf book counts, with
//! authenticated CRUD access over a JSON REST API.
//!
//! # Architecture
//!
//! ```text
//! api (axum handlers, bearer auth)
//!   ├── inventory (reconciler, bulk importer, aggregate views)
//!   └── storage   (sqlx/SQLite stores: Books, Shelves, Users)
//! auth (argon2 password digests, ed25519 bearer tokens)
//! ```
//!
//! The interesting part is `inventory::reconcile`: the rules for how a
//! book's count on a shelf is incremented, decreased, reset, or first
//! created, and when the embedded entry disappears. Everything else is
//! deliberately plain CRUD around it.

pub mod api;
pub mod auth;
pub mod error;
pub mod inventory;
pub mod storage;

pub use error::{Result, ShelfstockError};
pub use storage::Database;
