//! Event-mode ingestion: object-created notifications

use super::validate_document;
use crate::error::{PermSetError, PermSetResult};
use crate::message_bus::{IngestionFailure, MessageBus};
use crate::object_store::{name_from_key, ObjectStore};
use crate::store::MetadataStore;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Source tag recorded on change-capture events for this pipeline
const SOURCE: &str = "event";

/// An "object created" notification from the object store's event source.
/// Delivery is at-least-once and not strictly ordered.
#[derive(Debug, Clone)]
pub struct ObjectCreated {
    pub key: String,
}

/// Handler for object-created notifications under the permission-set filter.
///
/// Fetches the object body, parses and schema-validates it, and upserts it
/// into the Metadata Store under the filename stem. Upsert semantics make
/// re-delivery of the same event naturally idempotent.
///
/// On any failure the handler publishes exactly one [`IngestionFailure`]
/// naming the object key, then returns the error so the event source's
/// redrive mechanism re-attempts the whole invocation. There is no internal
/// retry loop.
pub struct ObjectCreatedHandler {
    store: MetadataStore,
    objects: Arc<dyn ObjectStore>,
    bus: Arc<MessageBus>,
}

impl ObjectCreatedHandler {
    pub fn new(store: MetadataStore, objects: Arc<dyn ObjectStore>, bus: Arc<MessageBus>) -> Self {
        Self { store, objects, bus }
    }

    pub fn handle(&self, event: &ObjectCreated) -> PermSetResult<()> {
        let name = match name_from_key(&event.key) {
            Some(name) => name.to_string(),
            None => {
                // In production the event-source filter makes this
                // unreachable; skipping keeps re-drives of stray keys safe.
                debug!("Ignoring object outside permission-set filter: {}", event.key);
                return Ok(());
            }
        };

        match self.ingest(&event.key, &name) {
            Ok(()) => {
                info!("Ingested permission set '{}' from {}", name, event.key);
                Ok(())
            }
            Err(e) => {
                error!("Ingestion failed for {}: {}", event.key, e);
                self.notify_failure(&event.key, &e);
                Err(e)
            }
        }
    }

    fn ingest(&self, key: &str, name: &str) -> PermSetResult<()> {
        let body = self
            .objects
            .get_object(key)?
            .ok_or_else(|| PermSetError::ObjectStore(format!("Object '{}' not found", key)))?;

        let document: Value = serde_json::from_slice(&body)
            .map_err(|e| PermSetError::Parse(format!("Object '{}' is not valid JSON: {}", key, e)))?;
        validate_document(&document)
            .map_err(|e| PermSetError::Parse(format!("Object '{}' failed validation: {}", key, e)))?;

        self.store.upsert(name, &document, SOURCE)
    }

    fn notify_failure(&self, key: &str, error: &PermSetError) {
        if let Err(e) = self
            .bus
            .publish(IngestionFailure::new(key, error.to_string()))
        {
            warn!("Failed to publish operator notification for {}: {}", key, e);
        }
    }
}
