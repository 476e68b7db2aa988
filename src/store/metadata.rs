use crate::error::PermSetResult;
use crate::message_bus::{MessageBus, RecordChanged};
use crate::store::core::StoreOperations;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Primary table of permission-set documents.
///
/// Key = permission-set name, value = the opaque access-policy document.
/// At most one live record exists per name; upsert overwrites in place
/// (last-write-wins, no concurrency token). Every mutation publishes a
/// [`RecordChanged`] event carrying the old and new image — this is the
/// change-capture stream consumed by downstream collaborators such as the
/// provisioning process.
#[derive(Clone)]
pub struct MetadataStore {
    ops: StoreOperations,
    bus: Arc<MessageBus>,
}

impl MetadataStore {
    pub fn new(ops: StoreOperations, bus: Arc<MessageBus>) -> Self {
        Self { ops, bus }
    }

    /// Writes a permission-set document under `name`, overwriting any
    /// existing record. Idempotent: re-applying the same write leaves the
    /// table in the same state.
    pub fn upsert(&self, name: &str, document: &Value, source: &str) -> PermSetResult<()> {
        let old: Option<Value> = self.ops.get_from_tree(&self.ops.metadata_tree, name)?;
        self.ops
            .store_in_tree(&self.ops.metadata_tree, name, document)?;

        if old.is_none() {
            info!("Created permission set '{}'", name);
        } else {
            info!("Updated permission set '{}'", name);
        }

        self.publish_change(RecordChanged::new(name, old, Some(document.clone()), source));
        Ok(())
    }

    /// Retrieves the current document for `name`, if any
    pub fn get(&self, name: &str) -> PermSetResult<Option<Value>> {
        self.ops.get_from_tree(&self.ops.metadata_tree, name)
    }

    /// Deletes the record for `name`. Returns whether a record existed;
    /// deleting an absent record is a no-op success (the desired end state
    /// already holds) and emits no change event.
    pub fn delete(&self, name: &str, source: &str) -> PermSetResult<bool> {
        let old: Option<Value> = self.ops.get_from_tree(&self.ops.metadata_tree, name)?;
        let existed = self.ops.delete_from_tree(&self.ops.metadata_tree, name)?;

        if existed {
            info!("Deleted permission set '{}'", name);
            self.publish_change(RecordChanged::new(name, old, None, source));
        }

        Ok(existed)
    }

    /// Lists all declared permission-set names
    pub fn list(&self) -> PermSetResult<Vec<String>> {
        self.ops.list_keys_in_tree(&self.ops.metadata_tree)
    }

    // The change-capture stream is an emission side effect of the store;
    // a delivery failure must not fail the table write that already happened.
    fn publish_change(&self, event: RecordChanged) {
        if let Err(e) = self.bus.publish(event) {
            warn!("Failed to publish change-capture event: {}", e);
        }
    }
}
