//! Event-mode ingestion: object-removed notifications

use crate::error::{PermSetError, PermSetResult};
use crate::message_bus::{DependentLinksRemained, IngestionFailure, MessageBus};
use crate::object_store::name_from_key;
use crate::store::{LinkLookup, MetadataStore, ReferenceStore};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Source tag recorded on change-capture events for this pipeline
const SOURCE: &str = "event";

/// An "object removed" notification from the object store's event source
#[derive(Debug, Clone)]
pub struct ObjectRemoved {
    pub key: String,
}

/// Handler for object-removed notifications under the permission-set filter.
///
/// Deletes the PermissionSetRecord for the removed object's name and cleans
/// up its PermissionSetReference. The link table is consulted first: a
/// lookup failure is retryable and fails the invocation (never silently
/// skipped), while surviving dependent links do not block the deletion —
/// the backing object is already gone and there is no rollback path — but
/// are reported on the operator channel as [`DependentLinksRemained`].
///
/// Deleting a name with no record is a no-op success: the desired end state
/// ("record absent") already holds, which absorbs re-delivery and
/// reordering of removal events.
pub struct ObjectRemovedHandler {
    store: MetadataStore,
    references: ReferenceStore,
    links: Arc<dyn LinkLookup>,
    bus: Arc<MessageBus>,
}

impl ObjectRemovedHandler {
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

    pub fn handle(&self, event: &ObjectRemoved) -> PermSetResult<()> {
        let name = match name_from_key(&event.key) {
            Some(name) => name.to_string(),
            None => {
                debug!("Ignoring object outside permission-set filter: {}", event.key);
                return Ok(());
            }
        };

        match self.remove(&event.key, &name) {
            Ok(existed) => {
                if existed {
                    info!("Removed permission set '{}' for {}", name, event.key);
                } else {
                    info!(
                        "Removal of {} for absent permission set '{}' treated as no-op",
                        event.key, name
                    );
                }
                Ok(())
            }
            Err(e) => {
                error!("Removal failed for {}: {}", event.key, e);
                self.notify_failure(&event.key, &e);
                Err(e)
            }
        }
    }

    fn remove(&self, key: &str, name: &str) -> PermSetResult<bool> {
        // Dependency check before anything is deleted; a failed lookup must
        // fail the invocation so the event is redriven with the check intact.
        let links = self.links.links_for(name)?;
        if !links.is_empty() {
            warn!(
                "Permission set '{}' still has {} dependent link(s) at deletion time",
                name,
                links.len()
            );
            if let Err(e) = self
                .bus
                .publish(DependentLinksRemained::new(name, key, links.len()))
            {
                warn!("Failed to publish dependent-links notification: {}", e);
            }
        }

        let existed = self.store.delete(name, SOURCE)?;
        if self.references.delete_reference(name)? {
            info!("Removed provider reference for permission set '{}'", name);
        }
        Ok(existed)
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
