//! Integration tests for the event-mode ingestion pipeline.
//!
//! Each test deposits or removes objects through the bucket handle the way
//! the external object store would, then hands the corresponding
//! notification to the node, mirroring the at-least-once event delivery of
//! the real substrate.

use permset::{
    DependentLinksRemained, IngestionFailure, LinkLookup, LinkRecord, MessageBus, MetadataStore,
    NodeConfig, ObjectCreated, ObjectRemoved, ObjectRemovedHandler, ObjectStore, PermSetError,
    PermSetNode, PermSetResult, ProvisioningMode, ReferenceStore, StoreOperations,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn event_node(storage: &std::path::Path) -> PermSetNode {
    let config = NodeConfig::new(storage.join("db"), ProvisioningMode::Event)
        .with_caller_principal("ingestion-caller");
    PermSetNode::new(config).expect("Failed to create node")
}

fn created(key: &str) -> ObjectCreated {
    ObjectCreated { key: key.to_string() }
}

fn removed(key: &str) -> ObjectRemoved {
    ObjectRemoved { key: key.to_string() }
}

// Scenario A: a valid object under the filter lands in the Metadata Store
// under the filename stem, with no operator notification.
#[test]
fn test_object_created_ingests_document() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    let mut failures = node.bus().subscribe::<IngestionFailure>();

    let doc = json!({"Statement": [{"Effect": "Allow"}]});
    node.object_store()
        .put_object("permission_sets/readonly.json", doc.to_string().as_bytes())
        .unwrap();

    node.handle_object_created(&created("permission_sets/readonly.json"))
        .unwrap();

    assert_eq!(node.get_permission_set("readonly").unwrap(), Some(doc));
    assert!(failures.try_recv().is_err());
}

#[test]
fn test_redelivered_create_event_is_idempotent() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());

    let doc = json!({"Statement": []});
    node.object_store()
        .put_object("permission_sets/readonly.json", doc.to_string().as_bytes())
        .unwrap();

    let event = created("permission_sets/readonly.json");
    node.handle_object_created(&event).unwrap();
    node.handle_object_created(&event).unwrap();

    assert_eq!(node.get_permission_set("readonly").unwrap(), Some(doc));
    assert_eq!(node.list_permission_sets().unwrap(), vec!["readonly".to_string()]);
}

// Scenario B: invalid JSON leaves the Metadata Store unchanged, emits
// exactly one notification naming the object key, and fails the invocation.
#[test]
fn test_malformed_object_notifies_and_fails() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    let mut failures = node.bus().subscribe::<IngestionFailure>();

    node.object_store()
        .put_object("permission_sets/broken.json", b"{not json")
        .unwrap();

    let result = node.handle_object_created(&created("permission_sets/broken.json"));
    assert!(matches!(result, Err(PermSetError::Parse(_))));
    assert!(node.list_permission_sets().unwrap().is_empty());

    let notification = failures.try_recv().unwrap();
    assert_eq!(notification.object_key, "permission_sets/broken.json");
    // Exactly one notification per failed invocation
    assert!(failures.try_recv().is_err());
}

#[test]
fn test_missing_object_notifies_and_fails() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    let mut failures = node.bus().subscribe::<IngestionFailure>();

    let result = node.handle_object_created(&created("permission_sets/phantom.json"));
    assert!(matches!(result, Err(PermSetError::ObjectStore(_))));

    let notification = failures.try_recv().unwrap();
    assert_eq!(notification.object_key, "permission_sets/phantom.json");
    assert!(failures.try_recv().is_err());
}

#[test]
fn test_keys_outside_filter_are_skipped() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    let mut failures = node.bus().subscribe::<IngestionFailure>();

    node.handle_object_created(&created("logs/2026/08/30.json")).unwrap();
    node.handle_object_created(&created("permission_sets/readme.txt")).unwrap();
    node.handle_object_removed(&removed("logs/2026/08/30.json")).unwrap();

    assert!(node.list_permission_sets().unwrap().is_empty());
    assert!(failures.try_recv().is_err());
}

#[test]
fn test_object_removed_deletes_record_and_reference() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());

    let doc = json!({"Statement": []});
    node.object_store()
        .put_object("permission_sets/admin.json", doc.to_string().as_bytes())
        .unwrap();
    node.handle_object_created(&created("permission_sets/admin.json"))
        .unwrap();
    node.reference_store()
        .set_reference("admin", "arn:provider:ps-7")
        .unwrap();

    node.object_store()
        .remove_object("permission_sets/admin.json")
        .unwrap();
    node.handle_object_removed(&removed("permission_sets/admin.json"))
        .unwrap();

    assert!(node.get_permission_set("admin").unwrap().is_none());
    assert!(node.get_reference("admin").unwrap().is_none());
}

// Scenario C: removal with a surviving link record still deletes the
// Metadata Store entry but reports the dangling dependents.
#[test]
fn test_removal_with_dependent_links_notifies_but_proceeds() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    let mut dangling = node.bus().subscribe::<DependentLinksRemained>();

    let doc = json!({"Statement": [{"Effect": "Allow"}]});
    node.object_store()
        .put_object("permission_sets/admin.json", doc.to_string().as_bytes())
        .unwrap();
    node.handle_object_created(&created("permission_sets/admin.json"))
        .unwrap();
    node.link_store().add_link("admin", "assignment-1").unwrap();

    node.handle_object_removed(&removed("permission_sets/admin.json"))
        .unwrap();

    assert!(node.get_permission_set("admin").unwrap().is_none());
    let notification = dangling.try_recv().unwrap();
    assert_eq!(notification.name, "admin");
    assert_eq!(notification.object_key, "permission_sets/admin.json");
    assert_eq!(notification.link_count, 1);
}

// A failed dependency check must notify and fail the invocation for
// redrive, leaving the record untouched — never proceed with the lookup
// unchecked.
#[test]
fn test_link_lookup_failure_notifies_and_propagates() {
    struct FailingLinkStore;
    impl LinkLookup for FailingLinkStore {
        fn links_for(&self, _name: &str) -> PermSetResult<Vec<LinkRecord>> {
            Err(PermSetError::Lookup("link table unavailable".to_string()))
        }
    }

    let dir = tempdir().unwrap();
    let db = sled::open(dir.path().join("db")).unwrap();
    let ops = StoreOperations::new(db).unwrap();
    let bus = Arc::new(MessageBus::new());
    let store = MetadataStore::new(ops.clone(), bus.clone());
    let references = ReferenceStore::new(ops);

    let doc = json!({"Statement": []});
    store.upsert("admin", &doc, "event").unwrap();

    let handler = ObjectRemovedHandler::new(
        store.clone(),
        references,
        Arc::new(FailingLinkStore),
        bus.clone(),
    );
    let mut failures = bus.subscribe::<IngestionFailure>();

    let result = handler.handle(&removed("permission_sets/admin.json"));
    assert!(matches!(result, Err(PermSetError::Lookup(_))));

    // Exactly one notification naming the triggering key, record intact
    let notification = failures.try_recv().unwrap();
    assert_eq!(notification.object_key, "permission_sets/admin.json");
    assert!(failures.try_recv().is_err());
    assert_eq!(store.get("admin").unwrap(), Some(doc));
}

#[test]
fn test_removal_of_absent_record_is_noop_success() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    let mut failures = node.bus().subscribe::<IngestionFailure>();

    let event = removed("permission_sets/never-existed.json");
    node.handle_object_removed(&event).unwrap();
    node.handle_object_removed(&event).unwrap();

    assert!(failures.try_recv().is_err());
}

// Mode exclusivity: an event-mode node has no reachable API handler.
#[test]
fn test_api_handler_unreachable_in_event_mode() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());
    assert_eq!(node.mode(), ProvisioningMode::Event);

    assert!(matches!(
        node.upsert_permission_set("x", &json!({"Statement": []})),
        Err(PermSetError::Config(_))
    ));
    assert!(matches!(
        node.delete_permission_set("x"),
        Err(PermSetError::Config(_))
    ));
}

#[test]
fn test_exported_path_prefix() {
    let dir = tempdir().unwrap();
    let node = event_node(dir.path());

    assert_eq!(
        node.path_prefix(),
        "s3://permission-set-store/permission_sets/"
    );
}
