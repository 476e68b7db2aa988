use crate::error::{PermSetError, PermSetResult};
use crate::store::core::StoreOperations;
use serde::{Deserialize, Serialize};

/// A consumer of a permission set, recorded in the external assignment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Permission-set name this link depends on
    pub name: String,
    /// Identifier of the consumer (e.g. an assignment id)
    pub consumer: String,
}

/// Lookup seam to the external link/assignment table.
///
/// The table is owned by an external collaborator; this crate only consults
/// it on the delete path to decide whether dependent cleanup work remains.
/// Implementations must surface transient failures as
/// [`PermSetError::Lookup`] — a failed lookup is retryable and must never be
/// treated as "no links".
pub trait LinkLookup: Send + Sync {
    fn links_for(&self, name: &str) -> PermSetResult<Vec<LinkRecord>>;
}

/// Sled-backed stand-in for the collaborator's link table, used for wiring
/// and tests. Stores the full link list for a name under one key.
#[derive(Clone)]
pub struct SledLinkStore {
    ops: StoreOperations,
}

impl SledLinkStore {
    pub fn new(ops: StoreOperations) -> Self {
        Self { ops }
    }

    /// Records a link; the collaborator's side of the interface
    pub fn add_link(&self, name: &str, consumer: &str) -> PermSetResult<()> {
        let mut links = self.links_for(name)?;
        links.push(LinkRecord {
            name: name.to_string(),
            consumer: consumer.to_string(),
        });
        self.ops.store_in_tree(&self.ops.links_tree, name, &links)
    }

    /// Drops all links for a name
    pub fn clear_links(&self, name: &str) -> PermSetResult<bool> {
        self.ops.delete_from_tree(&self.ops.links_tree, name)
    }
}

impl LinkLookup for SledLinkStore {
    fn links_for(&self, name: &str) -> PermSetResult<Vec<LinkRecord>> {
        let links: Option<Vec<LinkRecord>> = self
            .ops
            .get_from_tree(&self.ops.links_tree, name)
            .map_err(|e| PermSetError::Lookup(e.to_string()))?;
        Ok(links.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> SledLinkStore {
        let dir = tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        SledLinkStore::new(StoreOperations::new(db).unwrap())
    }

    #[test]
    fn test_missing_name_has_no_links() {
        let store = test_store();
        assert!(store.links_for("admin").unwrap().is_empty());
    }

    #[test]
    fn test_links_accumulate_per_name() {
        let store = test_store();
        store.add_link("admin", "assignment-1").unwrap();
        store.add_link("admin", "assignment-2").unwrap();
        store.add_link("readonly", "assignment-3").unwrap();

        let links = store.links_for("admin").unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].consumer, "assignment-1");
        assert_eq!(store.links_for("readonly").unwrap().len(), 1);

        assert!(store.clear_links("admin").unwrap());
        assert!(store.links_for("admin").unwrap().is_empty());
    }
}
