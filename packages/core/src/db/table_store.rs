//! TableStore - PathStore Implementation over the Repository Table
//!
//! This module implements the `PathStore` trait on top of
//! `DatabaseService`, translating each path operation into one or more
//! single-row SQL statements against the flat `repository` table.
//!
//! # Architecture
//!
//! - **Row Conversion**: handles libsql::Row → Node model conversion
//! - **Ancestor Materialization**: `persist` walks the key's path
//!   segments and inserts empty placeholder nodes for missing ancestors
//!   before the leaf write, so the tree invariant holds without any
//!   schema-level support
//! - **Fault Masking**: statement faults are logged with the operation
//!   name and key, mirrored on the event channel, and converted to the
//!   benign default result; callers are never raised at
//!
//! The read-modify-write sequence in `persist` is not atomic. Concurrent
//! writers on overlapping paths can produce duplicate `key` rows or
//! inconsistent parent links; the store targets a low-concurrency,
//! mostly single-writer usage pattern.
//!
//! # Examples
//!
//! ```no_run
//! use keytree_core::db::{DatabaseService, PathStore, TableStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/keytree.db")).await?);
//!     let store: Arc<dyn PathStore> = Arc::new(TableStore::new(db));
//!
//!     store.persist("/services/svcA", "cfg1").await;
//!     assert_eq!(store.get("/services/svcA").await, "cfg1");
//!     Ok(())
//! }
//! ```

use crate::db::events::StoreEvent;
use crate::db::path_store::PathStore;
use crate::db::DatabaseService;
use crate::models::{path, Node};
use anyhow::{Context, Result};
use async_trait::async_trait;
use libsql::Row;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::error;

/// Broadcast capacity for store events (slow subscribers lag, not block)
const STORE_EVENT_CHANNEL_CAPACITY: usize = 128;

/// TableStore implements the PathStore trait over the repository table
pub struct TableStore {
    /// Underlying database service (raw SQL operations)
    db: Arc<DatabaseService>,

    /// Broadcast channel for store events
    event_tx: broadcast::Sender<StoreEvent>,
}

impl TableStore {
    /// Create a new TableStore over an established DatabaseService
    pub fn new(db: Arc<DatabaseService>) -> Self {
        let (event_tx, _) = broadcast::channel(STORE_EVENT_CHANNEL_CAPACITY);
        Self { db, event_tx }
    }

    /// Subscribe to store events
    ///
    /// Returns a broadcast receiver delivering every subsequent
    /// `StoreEvent`, including the `OperationFailed` events behind the
    /// lossy public contract. Diagnostics and tests can assert on this
    /// channel without the return types changing.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a store event to all subscribers
    ///
    /// Ignores errors if no subscribers (expected in most deployments).
    fn emit_event(&self, event: StoreEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Log a masked fault and mirror it on the event channel
    fn report_fault(&self, operation: &'static str, key: &str, err: &anyhow::Error) {
        error!(
            backend = self.backend_kind(),
            operation,
            key,
            error = %err,
            "statement fault masked, returning default result"
        );
        self.emit_event(StoreEvent::OperationFailed {
            operation: operation.to_string(),
            key: key.to_string(),
            message: err.to_string(),
        });
    }

    fn backend_kind(&self) -> &'static str {
        "libsql"
    }

    /// Convert a libsql::Row to the Node model
    ///
    /// Expected columns (in order): id, key, value, parent. The text
    /// columns are nullable at the schema level; NULL reads back as the
    /// empty string, which the contract already treats as "nothing".
    fn row_to_node(row: &Row) -> Result<Node> {
        let id: String = row.get(0).context("Failed to get id")?;
        let key: Option<String> = row.get(1).context("Failed to get key")?;
        let value: Option<String> = row.get(2).context("Failed to get value")?;
        let parent: Option<String> = row.get(3).context("Failed to get parent")?;

        Ok(Node {
            id,
            key: key.unwrap_or_default(),
            value: value.unwrap_or_default(),
            parent: parent.unwrap_or_default(),
        })
    }

    /// Fetch the node stored at a key, `None` when no row matches
    async fn fetch_node(&self, key: &str) -> Result<Option<Node>> {
        match self
            .db
            .db_get(key)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get node: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_node(&row)?)),
            None => Ok(None),
        }
    }

    /// Collect the leaf names of all rows parented to `key`
    async fn fetch_children_names(&self, key: &str) -> Result<Vec<String>> {
        let mut rows = self
            .db
            .db_children(key)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get children: {}", e))?;

        let mut names = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch row: {}", e))?
        {
            let node = Self::row_to_node(&row)?;
            if node.key.is_empty() {
                continue;
            }
            names.push(path::leaf_name(&node.key).to_string());
        }

        Ok(names)
    }

    /// The fallible body of `persist`
    ///
    /// Walks every path segment except the last, keeping a running prefix
    /// and the parent computed one step behind it. A prefix with no
    /// existing row is materialized as a placeholder; the leaf is then
    /// inserted under the last prefix, or updated in place when a row
    /// already holds the key (parent untouched).
    ///
    /// The existence probe is row existence, not value emptiness, so a
    /// repeated deep write never re-creates its placeholder chain and
    /// writing a real value onto a placeholder updates the single row.
    /// Lookups inside the walk propagate their faults so the whole
    /// operation aborts; placeholders committed before the fault stay
    /// behind.
    async fn persist_inner(&self, key: &str, value: &str) -> Result<()> {
        let segs = path::segments(key);
        let mut prefix = String::new();
        let mut parent = path::SEPARATOR.to_string();

        for seg in segs.iter().take(segs.len().saturating_sub(1)) {
            let ancestor_key = format!("{}{}{}", prefix, path::SEPARATOR, seg);
            if self.fetch_node(&ancestor_key).await?.is_none() {
                self.db
                    .db_insert(&Node::placeholder(ancestor_key.clone(), parent.clone()))
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to insert ancestor node: {}", e))?;
            }
            prefix = ancestor_key.clone();
            parent = ancestor_key;
        }

        if self.fetch_node(key).await?.is_none() {
            self.db
                .db_insert(&Node::new(key.to_string(), value.to_string(), parent))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to insert node: {}", e))?;
        } else {
            self.db
                .db_update(key, value)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to update node: {}", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl PathStore for TableStore {
    fn kind(&self) -> &str {
        self.backend_kind()
    }

    async fn get(&self, key: &str) -> String {
        match self.fetch_node(key).await {
            Ok(node) => node.map(|n| n.value).unwrap_or_default(),
            Err(err) => {
                self.report_fault("get", key, &err);
                String::new()
            }
        }
    }

    async fn children_keys(&self, key: &str) -> Vec<String> {
        match self.fetch_children_names(key).await {
            Ok(names) => names,
            Err(err) => {
                self.report_fault("children_keys", key, &err);
                Vec::new()
            }
        }
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.persist_inner(key, value).await {
            self.report_fault("persist", key, &err);
            return;
        }
        self.emit_event(StoreEvent::KeyPersisted {
            key: key.to_string(),
        });
    }

    async fn delete(&self, key: &str) {
        match self.db.db_delete(key).await {
            Ok(_) => self.emit_event(StoreEvent::KeyDeleted {
                key: key.to_string(),
            }),
            Err(e) => {
                let err = anyhow::anyhow!("Failed to delete node: {}", e);
                self.report_fault("delete", key, &err);
            }
        }
    }

    async fn close(&self) {
        if let Err(e) = self.db.db_close().await {
            error!(
                backend = self.backend_kind(),
                error = %e,
                "failed to release database resources"
            );
        }
    }
}
