// Deployment wiring: configuration, the node itself, and the API-mode HTTP
// front door.
pub mod config;
pub mod core;
pub mod http_server;
pub mod routes;

pub use config::{load_node_config, NodeConfig};
pub use self::core::PermSetNode;
pub use http_server::{AppState, PermSetHttpServer};
