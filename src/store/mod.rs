// Sled-backed tables: metadata (permission-set documents), reference
// (provider-assigned ids) and the link-lookup seam to the external
// assignments table.
pub mod core;
pub mod links;
pub mod metadata;
pub mod reference;

pub use self::core::StoreOperations;
pub use links::{LinkLookup, LinkRecord, SledLinkStore};
pub use metadata::MetadataStore;
pub use reference::{PermissionSetReference, ReferenceStore};
