//! Database Layer
//!
//! This module handles all interactions with the backing `repository`
//! table:
//!
//! - Connection management and destructive table bootstrap
//! - Raw single-row SQL statements (point lookups, inserts, updates,
//!   deletes)
//! - The `PathStore` capability trait and its libsql-backed
//!   implementation
//! - Store events for observing writes and masked faults

mod database;
mod error;
pub mod events;
mod path_store;
mod table_store;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use events::StoreEvent;
pub use path_store::PathStore;
pub use table_store::TableStore;
