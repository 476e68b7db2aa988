//! Synchronous API-mode ingestion handler

use super::{validate_document, validate_name};
use crate::error::PermSetResult;
use crate::message_bus::{DependentLinksRemained, MessageBus};
use crate::object_store::key_for_name;
use crate::store::{LinkLookup, MetadataStore, ReferenceStore};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Source tag recorded on change-capture events for this pipeline
const SOURCE: &str = "api";

/// Acknowledgment returned to the caller on a successful upsert
#[derive(Debug, Clone, Serialize)]
pub struct UpsertAck {
    pub name: String,
    /// False when an existing record was overwritten
    pub created: bool,
}

/// Handler for the direct request/response ingestion pipeline.
///
/// The front-door collaborator has already authenticated and authorized the
/// caller before a request reaches this handler; its own responsibilities
/// are payload validation, the write-through to the Metadata Store, and
/// reference/link cleanup on explicit deletion.
#[derive(Clone)]
pub struct ApiIngestionHandler {
    store: MetadataStore,
    references: ReferenceStore,
    links: Arc<dyn LinkLookup>,
    bus: Arc<MessageBus>,
}

impl ApiIngestionHandler {
    pub fn new(
        store: MetadataStore,
        references: ReferenceStore,
        links: Arc<dyn LinkLookup>,
        bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            store,
            references,
            links,
            bus,
        }
    }

    /// Validates and writes a permission-set document.
    ///
    /// Overwrite semantics: last write wins, no concurrency token. A
    /// malformed payload is a `Validation` error and must not be retried; a
    /// `StoreWrite` error is transient and the caller retries with backoff.
    pub fn upsert(&self, name: &str, document: &Value) -> PermSetResult<UpsertAck> {
        validate_name(name)?;
        validate_document(document)?;

        let created = self.store.get(name)?.is_none();
        self.store.upsert(name, document, SOURCE)?;

        info!(
            "API ingestion {} permission set '{}'",
            if created { "created" } else { "updated" },
            name
        );
        Ok(UpsertAck {
            name: name.to_string(),
            created,
        })
    }

    /// Explicit API-mode deletion. Returns whether a record existed;
    /// deleting an absent name is a no-op success.
    ///
    /// Like the event-mode removal path, the link table is consulted first
    /// (a failed lookup propagates as `Lookup` so the caller retries) and
    /// surviving dependents are reported without blocking the deletion.
    /// The provider reference, if the downstream collaborator populated
    /// one, is cleaned up along with the record.
    pub fn delete(&self, name: &str) -> PermSetResult<bool> {
        validate_name(name)?;

        let links = self.links.links_for(name)?;
        if !links.is_empty() {
            warn!(
                "Permission set '{}' still has {} dependent link(s) at deletion time",
                name,
                links.len()
            );
            if let Err(e) = self.bus.publish(DependentLinksRemained::new(
                name,
                key_for_name(name),
                links.len(),
            )) {
                warn!("Failed to publish dependent-links notification: {}", e);
            }
        }

        let existed = self.store.delete(name, SOURCE)?;
        if self.references.delete_reference(name)? {
            info!("Removed provider reference for permission set '{}'", name);
        }
        Ok(existed)
    }
}
