//! PathStore Trait - Store Abstraction Layer
//!
//! This module defines the `PathStore` trait, the path-keyed persistence
//! capability the surrounding dispatch layer consumes. The trait is the
//! substitution seam: alternate backing stores implement it and plug in
//! transparently.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all operations are async so embedded and network
//!    backends share one contract
//! 2. **Lossy signatures**: per-operation statement faults never cross
//!    this boundary. Implementations log the fault and return the benign
//!    default (empty string, empty sequence, silent no-op); only
//!    construction is fallible.
//! 3. **Fixed separator**: keys are `/`-delimited paths; no escaping of
//!    `/` within a segment is supported

use async_trait::async_trait;

/// Path-keyed persistence capability
///
/// Implementations must be `Send + Sync` to allow usage in async contexts
/// where futures may be moved between threads.
#[async_trait]
pub trait PathStore: Send + Sync {
    /// Short backend discriminator used in fault logs (e.g. "libsql")
    fn kind(&self) -> &str;

    /// Look up the value stored at the exact key.
    ///
    /// Returns the empty string when no row matches, when the matching
    /// row's value is empty, or when the lookup itself fails. The store
    /// cannot distinguish "absent" from "present but empty"; this is a
    /// known limitation of the contract, not an implementation gap.
    async fn get(&self, key: &str) -> String;

    /// Enumerate the names of the direct children of a key.
    ///
    /// A child is a row whose stored `parent` exactly equals `key`; the
    /// reported name is the last path segment of the child's own key.
    /// Order follows the result set; nothing is sorted. Returns an empty
    /// sequence both for a childless key and for a failed query.
    async fn children_keys(&self, key: &str) -> Vec<String>;

    /// Write a value at a key, materializing missing ancestors.
    ///
    /// After this call a node with the exact key holds the value, and
    /// every ancestor implied by the key's path segments exists (empty if
    /// newly created, untouched if it already existed). A fault anywhere
    /// in the sequence aborts the call without raising; ancestors already
    /// written stay behind (best-effort, no rollback).
    async fn persist(&self, key: &str, value: &str);

    /// Delete the single row with the exact key.
    ///
    /// Never cascades: children of the deleted key survive as orphans.
    /// Faults are logged, never raised.
    async fn delete(&self, key: &str);

    /// Release the backing connection; safe when nothing was ever
    /// established, and faults during release are logged, not raised.
    async fn close(&self);
}
