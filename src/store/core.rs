use crate::error::{PermSetError, PermSetResult};
use serde::{de::DeserializeOwned, Serialize};

/// Unified access to the engine's sled tables.
///
/// One tree per table, cached at open time. All higher-level stores go
/// through the generic tree operations here, so serialization and the
/// read/write error mapping live in one place. Every write is flushed before
/// returning; each key's insert/remove is atomic, and no multi-key
/// transaction is taken anywhere (cross-table consistency is the ingestion
/// handlers' problem, by design).
#[derive(Clone)]
pub struct StoreOperations {
    /// The underlying sled database instance
    db: sled::Db,
    /// Permission-set documents, keyed by name
    pub(crate) metadata_tree: sled::Tree,
    /// Provider-assigned identifiers, keyed by name
    pub(crate) reference_tree: sled::Tree,
    /// Stand-in for the external link/assignment table, keyed by name
    pub(crate) links_tree: sled::Tree,
    /// Deployment-time access-grant records, keyed by principal
    pub(crate) grants_tree: sled::Tree,
    /// Object bodies for the sled-backed bucket stand-in, keyed by object key
    pub(crate) objects_tree: sled::Tree,
}

impl StoreOperations {
    /// Opens all required trees on the given database with the default
    /// table names
    pub fn new(db: sled::Db) -> PermSetResult<Self> {
        Self::with_table_names(db, "permission_sets", "permission_set_refs")
    }

    /// Opens all required trees, with deployment-supplied names for the two
    /// backing tables
    pub fn with_table_names(
        db: sled::Db,
        metadata_table: &str,
        reference_table: &str,
    ) -> PermSetResult<Self> {
        let open = |name: &str| {
            db.open_tree(name)
                .map_err(|e| PermSetError::StoreRead(format!("Failed to open tree '{}': {}", name, e)))
        };

        let metadata_tree = open(metadata_table)?;
        let reference_tree = open(reference_table)?;
        let links_tree = open("permission_set_links")?;
        let grants_tree = open("access_grants")?;
        let objects_tree = open("objects")?;

        Ok(Self {
            db,
            metadata_tree,
            reference_tree,
            links_tree,
            grants_tree,
            objects_tree,
        })
    }

    /// Gets a reference to the underlying database
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Generic function to store a serializable item in a specific tree
    pub fn store_in_tree<T: Serialize>(
        &self,
        tree: &sled::Tree,
        key: &str,
        item: &T,
    ) -> PermSetResult<()> {
        let bytes = serde_json::to_vec(item)
            .map_err(|e| PermSetError::Serialization(format!("Serialization failed: {}", e)))?;

        tree.insert(key.as_bytes(), bytes)
            .map_err(|e| PermSetError::StoreWrite(format!("Insert failed for '{}': {}", key, e)))?;

        tree.flush()
            .map_err(|e| PermSetError::StoreWrite(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    /// Generic function to retrieve a deserializable item from a specific tree
    pub fn get_from_tree<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        key: &str,
    ) -> PermSetResult<Option<T>> {
        match tree.get(key.as_bytes()) {
            Ok(Some(bytes)) => {
                let item = serde_json::from_slice(&bytes).map_err(|e| {
                    PermSetError::Serialization(format!("Deserialization failed for '{}': {}", key, e))
                })?;
                Ok(Some(item))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(PermSetError::StoreRead(format!(
                "Retrieve failed for '{}': {}",
                key, e
            ))),
        }
    }

    /// Removes a key from a tree; returns whether it existed
    pub fn delete_from_tree(&self, tree: &sled::Tree, key: &str) -> PermSetResult<bool> {
        let existed = tree
            .remove(key.as_bytes())
            .map_err(|e| PermSetError::StoreWrite(format!("Remove failed for '{}': {}", key, e)))?
            .is_some();

        tree.flush()
            .map_err(|e| PermSetError::StoreWrite(format!("Flush failed: {}", e)))?;

        Ok(existed)
    }

    /// Lists all keys currently present in a tree
    pub fn list_keys_in_tree(&self, tree: &sled::Tree) -> PermSetResult<Vec<String>> {
        let mut keys = Vec::new();
        for result in tree.iter() {
            let (key, _) = result
                .map_err(|e| PermSetError::StoreRead(format!("Tree scan failed: {}", e)))?;
            keys.push(String::from_utf8_lossy(&key).to_string());
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn test_ops() -> StoreOperations {
        let dir = tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        StoreOperations::new(db).unwrap()
    }

    #[test]
    fn test_store_get_delete_round_trip() {
        let ops = test_ops();
        let doc = json!({"Statement": [{"Effect": "Allow"}]});

        ops.store_in_tree(&ops.metadata_tree, "readonly", &doc).unwrap();
        let loaded: Option<serde_json::Value> =
            ops.get_from_tree(&ops.metadata_tree, "readonly").unwrap();
        assert_eq!(loaded, Some(doc));

        assert!(ops.delete_from_tree(&ops.metadata_tree, "readonly").unwrap());
        let gone: Option<serde_json::Value> =
            ops.get_from_tree(&ops.metadata_tree, "readonly").unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn test_delete_missing_key_reports_absent() {
        let ops = test_ops();
        assert!(!ops.delete_from_tree(&ops.metadata_tree, "never-stored").unwrap());
    }

    #[test]
    fn test_trees_are_isolated() {
        let ops = test_ops();
        ops.store_in_tree(&ops.metadata_tree, "admin", &json!({"Statement": []}))
            .unwrap();

        let from_refs: Option<serde_json::Value> =
            ops.get_from_tree(&ops.reference_tree, "admin").unwrap();
        assert!(from_refs.is_none());
        assert_eq!(
            ops.list_keys_in_tree(&ops.metadata_tree).unwrap(),
            vec!["admin".to_string()]
        );
    }
}
