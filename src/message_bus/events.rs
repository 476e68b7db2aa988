//! Event type definitions published on the message bus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Trait for types that can be published on the message bus
pub trait EventType: Clone + Send + 'static {
    /// Unique type identifier used for subscriber routing
    fn type_id() -> &'static str;
}

/// Change-capture event emitted by the Metadata Store on every mutation.
///
/// Carries the before and after image of the record: create has `old = None`,
/// update has both, delete has `new = None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordChanged {
    /// Permission-set name (the record key)
    pub name: String,
    /// Record image before the mutation
    pub old: Option<Value>,
    /// Record image after the mutation
    pub new: Option<Value>,
    /// Which ingestion path performed the mutation
    pub source: String,
    pub changed_at: DateTime<Utc>,
}

impl EventType for RecordChanged {
    fn type_id() -> &'static str {
        "RecordChanged"
    }
}

impl RecordChanged {
    pub fn new(
        name: impl Into<String>,
        old: Option<Value>,
        new: Option<Value>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old,
            new,
            source: source.into(),
            changed_at: Utc::now(),
        }
    }
}

/// Operator notification published when an event-mode ingestion invocation
/// fails. Exactly one is published per failed invocation, before the handler
/// returns its error for redrive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionFailure {
    /// The object-store key that triggered the failed invocation
    pub object_key: String,
    /// Human-readable failure reason (parse error, store error, ...)
    pub reason: String,
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl EventType for IngestionFailure {
    fn type_id() -> &'static str {
        "IngestionFailure"
    }
}

impl IngestionFailure {
    pub fn new(object_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            object_key: object_key.into(),
            reason: reason.into(),
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

/// Published by a delete path when a permission set was removed while link
/// records still depended on it. The deletion proceeds regardless; this
/// event is the operator's visibility into the dangling dependents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DependentLinksRemained {
    pub name: String,
    /// Object-store key associated with the permission set
    pub object_key: String,
    /// Number of link records that still referenced the permission set
    pub link_count: usize,
    pub occurred_at: DateTime<Utc>,
}

impl EventType for DependentLinksRemained {
    fn type_id() -> &'static str {
        "DependentLinksRemained"
    }
}

impl DependentLinksRemained {
    pub fn new(name: impl Into<String>, object_key: impl Into<String>, link_count: usize) -> Self {
        Self {
            name: name.into(),
            object_key: object_key.into(),
            link_count,
            occurred_at: Utc::now(),
        }
    }
}
