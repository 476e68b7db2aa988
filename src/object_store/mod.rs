//! Object-store boundary: the bucket abstraction the event-mode pipeline
//! reads from, the key filter that scopes ingestion to the permission-set
//! path, and the deployment-time access-grant wiring.

pub mod bucket;
pub mod grants;

pub use bucket::SledBucket;
pub use grants::{wire_access_grants, AccessGrant, GrantAction};

use crate::error::PermSetResult;

/// Fixed object-store path for permission-set description files
pub const PERMISSION_SET_PREFIX: &str = "permission_sets/";
/// Required suffix for permission-set description files
pub const PERMISSION_SET_SUFFIX: &str = ".json";

/// Interface boundary to the external object store.
///
/// The engine only ever issues single-object operations; listing, versioning
/// and the store's durability guarantees belong to the collaborator behind
/// this trait.
pub trait ObjectStore: Send + Sync {
    /// Fetches an object body; `None` when the key does not exist
    fn get_object(&self, key: &str) -> PermSetResult<Option<Vec<u8>>>;

    /// Stores an object body under a key
    fn put_object(&self, key: &str, body: &[u8]) -> PermSetResult<()>;

    /// Removes an object; returns whether it existed
    fn remove_object(&self, key: &str) -> PermSetResult<bool>;

    /// The discoverable path prefix published for operators,
    /// e.g. `s3://bucket/permission_sets/`
    fn path_prefix(&self) -> String;
}

/// Whether a key falls under the permission-set filter
/// (prefix `permission_sets/`, suffix `.json`).
pub fn is_permission_set_key(key: &str) -> bool {
    key.starts_with(PERMISSION_SET_PREFIX)
        && key.ends_with(PERMISSION_SET_SUFFIX)
        && key.len() > PERMISSION_SET_PREFIX.len() + PERMISSION_SET_SUFFIX.len()
}

/// Derives the permission-set name from an object key: the filename stem.
/// Returns `None` for keys outside the filter.
pub fn name_from_key(key: &str) -> Option<&str> {
    if !is_permission_set_key(key) {
        return None;
    }
    let stem = &key[PERMISSION_SET_PREFIX.len()..key.len() - PERMISSION_SET_SUFFIX.len()];
    // Nested keys like permission_sets/a/b.json are not permission sets
    if stem.contains('/') {
        return None;
    }
    Some(stem)
}

/// Builds the object key for a permission-set name
pub fn key_for_name(name: &str) -> String {
    format!("{}{}{}", PERMISSION_SET_PREFIX, name, PERMISSION_SET_SUFFIX)
}
