use crate::error::PermSetResult;
use crate::store::core::StoreOperations;
use log::info;
use serde::{Deserialize, Serialize};

/// Provider-assigned identifier for a realized permission set.
///
/// Written by the downstream provisioning collaborator once the provider has
/// assigned an identifier; there is no ordering guarantee relative to the
/// record's own lifecycle, so a reference may appear before, during or after
/// the record exists and consumers must tolerate its absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSetReference {
    /// Permission-set name, same namespace as the metadata table
    pub name: String,
    /// Opaque provider-assigned identifier (ARN-equivalent)
    pub provider_id: String,
}

/// Secondary table of provider-assigned identifiers, keyed by name.
///
/// Read-only from the ingestion handlers' perspective, except that the
/// event-mode delete path removes the reference when cleaning up.
/// `set_reference` is the downstream collaborator's write interface.
#[derive(Clone)]
pub struct ReferenceStore {
    ops: StoreOperations,
}

impl ReferenceStore {
    pub fn new(ops: StoreOperations) -> Self {
        Self { ops }
    }

    /// Records the provider-assigned identifier for `name`.
    /// Called by the downstream provisioning collaborator, never by the
    /// ingestion handlers.
    pub fn set_reference(&self, name: &str, provider_id: &str) -> PermSetResult<()> {
        let reference = PermissionSetReference {
            name: name.to_string(),
            provider_id: provider_id.to_string(),
        };
        self.ops
            .store_in_tree(&self.ops.reference_tree, name, &reference)?;
        info!("Recorded provider id for permission set '{}'", name);
        Ok(())
    }

    /// Retrieves the reference for `name`, if the downstream provisioning
    /// process has populated it yet
    pub fn get_reference(&self, name: &str) -> PermSetResult<Option<PermissionSetReference>> {
        self.ops.get_from_tree(&self.ops.reference_tree, name)
    }

    /// Removes the reference for `name` during delete-path cleanup.
    /// Returns whether one existed.
    pub fn delete_reference(&self, name: &str) -> PermSetResult<bool> {
        self.ops.delete_from_tree(&self.ops.reference_tree, name)
    }
}
