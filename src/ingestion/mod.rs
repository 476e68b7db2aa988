//! The two mutually exclusive ingestion pipelines and the router that
//! selects exactly one of them at initialization time.
//!
//! A permission-set document enters either through a direct synchronous
//! call ([`ApiIngestionHandler`]) or through object-store create/remove
//! notifications ([`ObjectCreatedHandler`] / [`ObjectRemovedHandler`]);
//! both paths normalize into per-key writes against the Metadata Store.
//! Which pipeline exists is a sealed choice made once by
//! [`IngestionRouter::build`] from the deployment's provisioning mode;
//! nothing downstream branches on the mode again.

pub mod api;
pub mod event_create;
pub mod event_delete;
pub mod router;

pub use api::{ApiIngestionHandler, UpsertAck};
pub use event_create::{ObjectCreated, ObjectCreatedHandler};
pub use event_delete::{ObjectRemoved, ObjectRemovedHandler};
pub use router::{IngestionRouter, IngestionStrategy, ProvisioningMode};

use crate::error::{PermSetError, PermSetResult};
use serde_json::Value;

/// Schema validation for a permission-set document.
///
/// The document must be a JSON object carrying a `Statement` array. Policy
/// semantics (what the statements mean) are explicitly not validated here.
pub fn validate_document(document: &Value) -> PermSetResult<()> {
    let object = document
        .as_object()
        .ok_or_else(|| PermSetError::Validation("Document must be a JSON object".to_string()))?;

    match object.get("Statement") {
        Some(statement) if statement.is_array() => Ok(()),
        Some(_) => Err(PermSetError::Validation(
            "Document field 'Statement' must be an array".to_string(),
        )),
        None => Err(PermSetError::Validation(
            "Document is missing required field 'Statement'".to_string(),
        )),
    }
}

/// Validates a permission-set name: non-empty and path-safe
pub fn validate_name(name: &str) -> PermSetResult<()> {
    if name.is_empty() {
        return Err(PermSetError::Validation(
            "Permission-set name cannot be empty".to_string(),
        ));
    }
    if name.contains('/') {
        return Err(PermSetError::Validation(format!(
            "Permission-set name '{}' cannot contain '/'",
            name
        )));
    }
    Ok(())
}
