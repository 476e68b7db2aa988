use super::routes;
use crate::error::{PermSetError, PermSetResult};
use crate::node::core::PermSetNode;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer as ActixHttpServer};
use log::info;
use std::sync::Arc;

/// HTTP front door for an API-mode node.
///
/// Exposes the single ingestion operation plus explicit deletion under
/// `/api`. Authentication and TLS termination belong to the front-door
/// collaborator in front of this server; CORS is deliberately permissive
/// (any origin), matching the deployment design.
pub struct PermSetHttpServer {
    node: Arc<PermSetNode>,
    bind_address: String,
}

/// Shared application state for the HTTP server
pub struct AppState {
    pub node: Arc<PermSetNode>,
}

impl PermSetHttpServer {
    /// Create a server for the given node.
    ///
    /// Fails with a `Config` error when the node was built for event mode —
    /// the HTTP ingestion surface must not exist in that deployment.
    pub fn new(node: Arc<PermSetNode>, bind_address: &str) -> PermSetResult<Self> {
        if node.mode() != crate::ingestion::ProvisioningMode::Api {
            return Err(PermSetError::Config(
                "HTTP ingestion server requires an api-mode node".to_string(),
            ));
        }

        Ok(Self {
            node,
            bind_address: bind_address.to_string(),
        })
    }

    /// Run the HTTP server until shutdown
    pub async fn run(&self) -> PermSetResult<()> {
        info!("HTTP server running on {}", self.bind_address);

        let app_state = web::Data::new(AppState {
            node: self.node.clone(),
        });

        let server = ActixHttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new().wrap(cors).app_data(app_state.clone()).service(
                web::scope("/api")
                    .route(
                        "/permission-sets",
                        web::post().to(routes::upsert_permission_set),
                    )
                    .route(
                        "/permission-sets/{name}",
                        web::delete().to(routes::delete_permission_set),
                    ),
            )
        })
        .bind(&self.bind_address)
        .map_err(|e| {
            PermSetError::Config(format!("Failed to bind {}: {}", self.bind_address, e))
        })?;

        server
            .run()
            .await
            .map_err(|e| PermSetError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ProvisioningMode;
    use crate::node::config::NodeConfig;
    use tempfile::tempdir;

    #[test]
    fn test_server_rejects_event_mode_node() {
        let dir = tempdir().unwrap();
        let config = NodeConfig::new(dir.path().join("db"), ProvisioningMode::Event)
            .with_caller_principal("ingestion-caller");
        let node = Arc::new(PermSetNode::new(config).unwrap());

        let result = PermSetHttpServer::new(node, "127.0.0.1:0");
        assert!(matches!(result, Err(PermSetError::Config(_))));
    }
}
