//! Deployment-time selection of exactly one ingestion pipeline

use super::api::ApiIngestionHandler;
use super::event_create::ObjectCreatedHandler;
use super::event_delete::ObjectRemovedHandler;
use crate::error::{PermSetError, PermSetResult};
use crate::message_bus::MessageBus;
use crate::object_store::ObjectStore;
use crate::store::{LinkLookup, MetadataStore, ReferenceStore};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which ingestion pipeline a deployment runs. Fixed at initialization;
/// there is no runtime switching between modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisioningMode {
    /// Direct synchronous request/response ingestion
    Api,
    /// Object-store notification-driven ingestion
    Event,
}

// The configuration flag is case-insensitive, so deserialization goes
// through FromStr rather than the derived lowercase-only variant names.
impl<'de> Deserialize<'de> for ProvisioningMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for ProvisioningMode {
    type Err = PermSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "event" => Ok(Self::Event),
            other => Err(PermSetError::Config(format!(
                "Unknown provisioning mode '{}': expected 'api' or 'event'",
                other
            ))),
        }
    }
}

impl fmt::Display for ProvisioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// The sealed pipeline choice. The two modes have incompatible trust
/// boundaries (a trusted direct caller vs. an object-store event source),
/// so exactly one variant is ever constructed per deployment and the
/// handlers of the other mode do not exist at runtime.
pub enum IngestionStrategy {
    Api(ApiIngestionHandler),
    Event {
        create: ObjectCreatedHandler,
        delete: ObjectRemovedHandler,
    },
}

impl IngestionStrategy {
    pub fn mode(&self) -> ProvisioningMode {
        match self {
            Self::Api(_) => ProvisioningMode::Api,
            Self::Event { .. } => ProvisioningMode::Event,
        }
    }

    /// The API handler, or a `Config` error in an event-mode deployment
    pub fn api(&self) -> PermSetResult<&ApiIngestionHandler> {
        match self {
            Self::Api(handler) => Ok(handler),
            Self::Event { .. } => Err(PermSetError::Config(
                "API ingestion is not available in event mode".to_string(),
            )),
        }
    }

    /// The event handlers, or a `Config` error in an API-mode deployment
    pub fn event(&self) -> PermSetResult<(&ObjectCreatedHandler, &ObjectRemovedHandler)> {
        match self {
            Self::Event { create, delete } => Ok((create, delete)),
            Self::Api(_) => Err(PermSetError::Config(
                "Event ingestion is not available in api mode".to_string(),
            )),
        }
    }
}

/// Factory evaluating the mode flag once into an [`IngestionStrategy`].
///
/// All collaborators are injected already constructed; the router only
/// decides which pipeline to assemble from them.
pub struct IngestionRouter;

impl IngestionRouter {
    pub fn build(
        mode: ProvisioningMode,
        store: MetadataStore,
        references: ReferenceStore,
        objects: Arc<dyn ObjectStore>,
        links: Arc<dyn LinkLookup>,
        bus: Arc<MessageBus>,
    ) -> IngestionStrategy {
        info!("Building '{}'-mode ingestion pipeline", mode);
        match mode {
            ProvisioningMode::Api => {
                IngestionStrategy::Api(ApiIngestionHandler::new(store, references, links, bus))
            }
            ProvisioningMode::Event => IngestionStrategy::Event {
                create: ObjectCreatedHandler::new(store.clone(), objects, bus.clone()),
                delete: ObjectRemovedHandler::new(store, references, links, bus),
            },
        }
    }
}
