//! Lifecycle engine for permission-set records.
//!
//! Keeps a primary metadata table, a derived reference table and an external
//! object store consistent across two mutually exclusive provisioning modes:
//! a synchronous request/response mode and an asynchronous storage-event
//! mode. Mutations emit a change-capture stream; event-mode failures are
//! reported on an operator notification sink and surfaced for redrive.

pub mod error;
pub mod ingestion;
pub mod logging;
pub mod message_bus;
pub mod node;
pub mod object_store;
pub mod store;

pub use error::{PermSetError, PermSetResult};
pub use ingestion::{
    ApiIngestionHandler, IngestionRouter, IngestionStrategy, ObjectCreated, ObjectCreatedHandler,
    ObjectRemoved, ObjectRemovedHandler, ProvisioningMode, UpsertAck,
};
pub use message_bus::{
    DependentLinksRemained, IngestionFailure, MessageBus, RecordChanged,
};
pub use node::{load_node_config, NodeConfig, PermSetHttpServer, PermSetNode};
pub use object_store::{ObjectStore, SledBucket};
pub use store::{
    LinkLookup, LinkRecord, MetadataStore, PermissionSetReference, ReferenceStore, SledLinkStore,
    StoreOperations,
};
