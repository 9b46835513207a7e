//! Inventory core: reconciliation, bulk import, aggregate views
//!
//! The reconciler owns the update semantics for a shelf's embedded
//! book-count list; the importer replays external rows through it; the
//! aggregate module computes read-only joins over catalog and shelf data.

pub mod aggregate;
pub mod import;
pub mod reconcile;

pub use aggregate::{BookDetailView, BookWithTotal, ResolvedShelf, ShelfPlacement};
pub use import::{ImportEntry, ImportReport};
pub use reconcile::{apply_book_operation, ShelfOperation};
