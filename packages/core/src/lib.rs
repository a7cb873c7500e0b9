//! keytree Core
//!
//! This crate provides a hierarchical key/value namespace, where keys are
//! slash-delimited paths like a filesystem tree, persisted inside a
//! single flat relational table.
//!
//! # Architecture
//!
//! - **Adjacency-list tree**: one `repository` table (id, key, value,
//!   parent); child enumeration goes through the `parent` back-pointer
//! - **Ancestor materialization**: writing a deep key creates any
//!   missing ancestor keys as empty placeholder nodes
//! - **libsql**: embedded SQLite-compatible database backing
//! - **Lossy error policy**: statement faults are logged and converted
//!   to benign defaults; a broadcast event channel carries the
//!   diagnostics
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, path helpers)
//! - [`db`] - Database layer with libsql integration

pub mod db;
pub mod models;

// Re-export commonly used types
pub use db::{DatabaseService, PathStore, StoreEvent, TableStore};
pub use models::Node;
