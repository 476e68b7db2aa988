use crate::error::PermSetResult;
use crate::ingestion::{
    IngestionRouter, IngestionStrategy, ObjectCreated, ObjectRemoved, ProvisioningMode, UpsertAck,
};
use crate::message_bus::MessageBus;
use crate::node::config::NodeConfig;
use crate::object_store::{wire_access_grants, ObjectStore, SledBucket};
use crate::store::{
    MetadataStore, PermissionSetReference, ReferenceStore, SledLinkStore, StoreOperations,
};
use log::info;
use serde_json::Value;
use std::sync::Arc;

/// A fully wired permission-set lifecycle node.
///
/// Construction opens the backing database, builds the stores, the message
/// bus and the object-store stand-in, wires deployment-time access grants
/// (event mode), and evaluates the provisioning mode exactly once into the
/// node's [`IngestionStrategy`]. Every ingestion invocation afterwards is an
/// independent, stateless unit of work; the stores' per-key atomicity is the
/// only cross-invocation coordination.
pub struct PermSetNode {
    config: NodeConfig,
    bus: Arc<MessageBus>,
    metadata: MetadataStore,
    references: ReferenceStore,
    objects: Arc<SledBucket>,
    links: Arc<SledLinkStore>,
    strategy: IngestionStrategy,
}

impl PermSetNode {
    /// Builds a node from a validated configuration
    pub fn new(config: NodeConfig) -> PermSetResult<Self> {
        config.validate()?;

        let db = sled::open(&config.storage_path).map_err(|e| {
            crate::error::PermSetError::StoreRead(format!(
                "Failed to open database at {}: {}",
                config.storage_path.display(),
                e
            ))
        })?;
        let ops =
            StoreOperations::with_table_names(db, &config.metadata_table, &config.reference_table)?;

        let bus = Arc::new(MessageBus::new());
        let metadata = MetadataStore::new(ops.clone(), bus.clone());
        let references = ReferenceStore::new(ops.clone());
        let objects = Arc::new(SledBucket::new(ops.clone(), config.bucket.clone()));
        let links = Arc::new(SledLinkStore::new(ops.clone()));

        // One-time deployment wiring: the event-mode caller principal gets
        // read/write on the bucket path and encrypt/decrypt on both keys.
        if let Some(principal) = &config.caller_principal {
            wire_access_grants(
                &ops,
                objects.as_ref(),
                principal,
                &config.metadata_key_id,
                &config.log_key_id,
            )?;
        }

        let strategy = IngestionRouter::build(
            config.provisioning_mode,
            metadata.clone(),
            references.clone(),
            objects.clone(),
            links.clone(),
            bus.clone(),
        );

        info!(
            "PermSet node ready in '{}' mode, permission-set path {}",
            config.provisioning_mode,
            objects.path_prefix()
        );

        Ok(Self {
            config,
            bus,
            metadata,
            references,
            objects,
            links,
            strategy,
        })
    }

    /// The mode this deployment was built for
    pub fn mode(&self) -> ProvisioningMode {
        self.strategy.mode()
    }

    /// The discoverable object-store path prefix published for operators
    pub fn path_prefix(&self) -> String {
        self.objects.path_prefix()
    }

    /// API-mode upsert. Returns a `Config` error in event mode.
    pub fn upsert_permission_set(&self, name: &str, document: &Value) -> PermSetResult<UpsertAck> {
        self.strategy.api()?.upsert(name, document)
    }

    /// API-mode explicit deletion. Returns a `Config` error in event mode.
    pub fn delete_permission_set(&self, name: &str) -> PermSetResult<bool> {
        self.strategy.api()?.delete(name)
    }

    /// Event-mode entry point for an object-created notification.
    /// Returns a `Config` error in API mode.
    pub fn handle_object_created(&self, event: &ObjectCreated) -> PermSetResult<()> {
        let (create, _) = self.strategy.event()?;
        create.handle(event)
    }

    /// Event-mode entry point for an object-removed notification.
    /// Returns a `Config` error in API mode.
    pub fn handle_object_removed(&self, event: &ObjectRemoved) -> PermSetResult<()> {
        let (_, delete) = self.strategy.event()?;
        delete.handle(event)
    }

    /// Reads the current document for a permission set
    pub fn get_permission_set(&self, name: &str) -> PermSetResult<Option<Value>> {
        self.metadata.get(name)
    }

    /// Lists all declared permission-set names
    pub fn list_permission_sets(&self) -> PermSetResult<Vec<String>> {
        self.metadata.list()
    }

    /// Reads the provider-assigned reference for a permission set, if the
    /// downstream provisioning process has populated it
    pub fn get_reference(&self, name: &str) -> PermSetResult<Option<PermissionSetReference>> {
        self.references.get_reference(name)
    }

    /// The message bus carrying the change-capture stream and the operator
    /// notification sink
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// The object-store handle (the external delivery substrate and tests
    /// deposit/remove objects through it)
    pub fn object_store(&self) -> Arc<SledBucket> {
        self.objects.clone()
    }

    /// The link-table stand-in (written by the external assignment
    /// collaborator)
    pub fn link_store(&self) -> Arc<SledLinkStore> {
        self.links.clone()
    }

    /// The reference store's collaborator-facing write interface
    pub fn reference_store(&self) -> &ReferenceStore {
        &self.references
    }

    /// The deployment configuration this node was built from
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}
