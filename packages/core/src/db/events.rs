//! Store Events
//!
//! This module defines the events emitted by the store when data changes
//! or when a statement fault is masked. Events follow the observer
//! pattern over tokio's broadcast channel, so diagnostics can observe
//! faults that the public return contract deliberately hides (a failed
//! lookup and a missing key are both the empty string to callers).

use serde::{Deserialize, Serialize};

/// Events emitted by the store
///
/// `OperationFailed` is the diagnostic side channel for the lossy error
/// policy: the public call already returned its benign default by the
/// time the event is delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEvent {
    /// A key was written (inserted or updated), ancestors included
    #[serde(rename = "keyPersisted")]
    KeyPersisted { key: String },

    /// The row for a key was deleted
    #[serde(rename = "keyDeleted")]
    KeyDeleted { key: String },

    /// A statement fault was logged and converted to a benign default
    #[serde(rename = "operationFailed")]
    OperationFailed {
        operation: String,
        key: String,
        message: String,
    },
}

impl StoreEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            StoreEvent::KeyPersisted { .. } => "key:persisted",
            StoreEvent::KeyDeleted { .. } => "key:deleted",
            StoreEvent::OperationFailed { .. } => "operation:failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract test: documents the exact JSON format for StoreEvent.
    ///
    /// Serde's `#[serde(tag = "type")]` produces an INTERNALLY-TAGGED
    /// format where the discriminator field is merged with the variant
    /// fields (NOT nested).
    #[test]
    fn test_store_event_serialization_contract() {
        let event = StoreEvent::OperationFailed {
            operation: "get".to_string(),
            key: "/a/b".to_string(),
            message: "no such table: repository".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.get("type").unwrap(), "operationFailed");
        assert_eq!(parsed.get("operation").unwrap(), "get");
        assert_eq!(parsed.get("key").unwrap(), "/a/b");
        assert!(
            parsed.get("operationFailed").is_none(),
            "Should NOT be nested under 'operationFailed' key"
        );
    }

    #[test]
    fn test_event_type_tags() {
        let persisted = StoreEvent::KeyPersisted {
            key: "/a".to_string(),
        };
        let deleted = StoreEvent::KeyDeleted {
            key: "/a".to_string(),
        };

        assert_eq!(persisted.event_type(), "key:persisted");
        assert_eq!(deleted.event_type(), "key:deleted");
    }
}
