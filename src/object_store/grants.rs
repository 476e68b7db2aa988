use super::ObjectStore;
use crate::error::PermSetResult;
use crate::store::StoreOperations;
use log::info;
use serde::{Deserialize, Serialize};

/// A single granted action for the designated caller principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantAction {
    /// Read objects under the permission-set path
    ObjectRead,
    /// Write objects under the permission-set path
    ObjectWrite,
    /// Decrypt with a named key
    Decrypt { key_id: String },
    /// Encrypt with a named key
    Encrypt { key_id: String },
}

/// Deployment-time access-grant record for one principal.
///
/// Its absence is a silent failure mode (writes that "succeed" against the
/// store but the principal cannot actually make), which is why grant wiring
/// is recorded durably and validated at node construction rather than left
/// implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    /// The designated caller principal
    pub principal: String,
    /// Object-store path the object grants cover
    pub path: String,
    pub actions: Vec<GrantAction>,
}

/// Grants the caller principal read/write on the bucket's permission-set
/// path and encrypt/decrypt on the metadata-store and log keys.
///
/// One-time deployment-level wiring, not a runtime request path; the grant
/// record is persisted so a restarted node can verify it was done.
pub fn wire_access_grants(
    ops: &StoreOperations,
    bucket: &dyn ObjectStore,
    principal: &str,
    metadata_key_id: &str,
    log_key_id: &str,
) -> PermSetResult<AccessGrant> {
    let grant = AccessGrant {
        principal: principal.to_string(),
        path: format!("{}{}", bucket.path_prefix(), "*"),
        actions: vec![
            GrantAction::ObjectRead,
            GrantAction::ObjectWrite,
            GrantAction::Decrypt {
                key_id: metadata_key_id.to_string(),
            },
            GrantAction::Encrypt {
                key_id: metadata_key_id.to_string(),
            },
            GrantAction::Decrypt {
                key_id: log_key_id.to_string(),
            },
            GrantAction::Encrypt {
                key_id: log_key_id.to_string(),
            },
        ],
    };

    ops.store_in_tree(&ops.grants_tree, principal, &grant)?;
    info!(
        "Wired access grants for principal '{}' on {}{}",
        principal, bucket.path_prefix(), "*"
    );
    Ok(grant)
}

/// Looks up the recorded grant for a principal
pub fn grant_for_principal(
    ops: &StoreOperations,
    principal: &str,
) -> PermSetResult<Option<AccessGrant>> {
    ops.get_from_tree(&ops.grants_tree, principal)
}
