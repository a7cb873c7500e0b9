//! Node Data Structure
//!
//! This module defines the `Node` struct, the single entity persisted by
//! keytree: one row in the flat `repository` table representing one path
//! key, its value, and the path of its immediate ancestor.
//!
//! # Architecture
//!
//! - **Adjacency-list tree**: the table has no native tree type; the
//!   `parent` back-pointer is what makes child enumeration possible
//! - **Opaque id**: a generated UUID string, unique but never queried by
//! - **Placeholder nodes**: ancestors implied by a deep write are
//!   materialized as nodes with an empty value
//!
//! # Examples
//!
//! ```rust
//! use keytree_core::models::Node;
//!
//! let node = Node::new(
//!     "/services/svcA".to_string(),
//!     "cfg1".to_string(),
//!     "/services".to_string(),
//! );
//! assert_eq!(node.parent, "/services");
//! assert!(!node.id.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the `repository` table.
///
/// # Fields
///
/// - `id`: opaque unique identifier; no semantic meaning beyond uniqueness
/// - `key`: full path string, e.g. `/a/b/c`; not declared unique at the
///   schema level, lookups take the first matching row
/// - `value`: payload; the empty string denotes "no value set" and is
///   indistinguishable from "key absent" through the `get` contract
/// - `parent`: full path of the immediate ancestor, `/` for top-level keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Generated UUID string, primary key
    pub id: String,

    /// Full path key
    pub key: String,

    /// Payload; empty string for placeholder nodes
    pub value: String,

    /// Path of the immediate ancestor node
    pub parent: String,
}

impl Node {
    /// Create a node with a freshly generated UUID id.
    pub fn new(key: String, value: String, parent: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key,
            value,
            parent,
        }
    }

    /// Create an empty-valued placeholder node for an implicitly
    /// materialized ancestor key.
    pub fn placeholder(key: String, parent: String) -> Self {
        Self::new(key, String::new(), parent)
    }

    /// Whether this node carries no value (placeholder or cleared key).
    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}
