use super::{ObjectStore, PERMISSION_SET_PREFIX};
use crate::error::{PermSetError, PermSetResult};
use crate::store::StoreOperations;

/// Sled-tree-backed bucket standing in for the real object store at the
/// interface boundary. Bodies are stored raw under their object key.
#[derive(Clone)]
pub struct SledBucket {
    ops: StoreOperations,
    bucket_name: String,
}

impl SledBucket {
    pub fn new(ops: StoreOperations, bucket_name: impl Into<String>) -> Self {
        Self {
            ops,
            bucket_name: bucket_name.into(),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }
}

impl ObjectStore for SledBucket {
    fn get_object(&self, key: &str) -> PermSetResult<Option<Vec<u8>>> {
        match self.ops.objects_tree.get(key.as_bytes()) {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(PermSetError::ObjectStore(format!(
                "Fetch failed for '{}': {}",
                key, e
            ))),
        }
    }

    fn put_object(&self, key: &str, body: &[u8]) -> PermSetResult<()> {
        self.ops
            .objects_tree
            .insert(key.as_bytes(), body)
            .map_err(|e| PermSetError::ObjectStore(format!("Put failed for '{}': {}", key, e)))?;
        self.ops
            .objects_tree
            .flush()
            .map_err(|e| PermSetError::ObjectStore(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn remove_object(&self, key: &str) -> PermSetResult<bool> {
        let existed = self
            .ops
            .objects_tree
            .remove(key.as_bytes())
            .map_err(|e| PermSetError::ObjectStore(format!("Remove failed for '{}': {}", key, e)))?
            .is_some();
        self.ops
            .objects_tree
            .flush()
            .map_err(|e| PermSetError::ObjectStore(format!("Flush failed: {}", e)))?;
        Ok(existed)
    }

    fn path_prefix(&self) -> String {
        format!("s3://{}/{}", self.bucket_name, PERMISSION_SET_PREFIX)
    }
}
