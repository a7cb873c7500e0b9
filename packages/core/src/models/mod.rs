//! Data Models
//!
//! This module contains the data structures used throughout keytree:
//!
//! - `Node` - one row of the backing `repository` table
//! - `path` - helpers for slash-delimited path keys

mod node;
pub mod path;

pub use node::Node;
