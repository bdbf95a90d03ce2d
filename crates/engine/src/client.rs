//! Container engine abstraction.
//!
//! The [`ContainerEngineClient`] trait covers the five read-only calls the
//! generator needs. Production code uses [`BollardEngineClient`]; tests supply
//! their own implementation backed by JSON fixtures.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ ComposeGenerator │
//! └────────┬─────────┘
//!          │
//!          ▼
//!  ┌───────────────────────┐
//!  │ ContainerEngineClient │ (trait)
//!  └───────────────────────┘
//!        │          │
//!        ▼          ▼
//!   ┌─────────┐ ┌──────┐
//!   │ Bollard │ │ Mock │
//!   └────┬────┘ └──────┘
//!        │
//!        ▼
//!  Docker daemon / Podman service
//! ```
//!
//! # Identifier Validation
//!
//! Every method taking a container id or a network name validates it first:
//! - 1-255 characters
//! - ASCII alphanumerics plus `_`, `.` and `-` only
//!
//! # Examples
//!
//! ```ignore
//! use autocompose_core::config::EngineConfig;
//! use autocompose_engine::{BollardEngineClient, ContainerEngineClient};
//!
//! let client = BollardEngineClient::connect(&EngineConfig::default())?;
//! client.ping().await?;
//! let containers = client.list_containers(true).await?;
//! # Ok::<(), autocompose_core::EngineError>(())
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use autocompose_core::config::{EngineConfig, EngineKind};
use autocompose_core::error::EngineError;
use autocompose_core::types::{AttributeTree, ContainerSummary, NetworkSummary};
use tracing::{debug, info};

use crate::libpod::LibpodTransport;

const MAX_IDENTIFIER_LEN: usize = 255;

/// Rootful Podman service socket.
const PODMAN_SYSTEM_SOCKET: &str = "/run/podman/podman.sock";

/// Validates a container id, container name or network name.
///
/// Rejects anything that could alter the request path before it reaches the engine.
pub fn validate_identifier(id: &str) -> Result<(), EngineError> {
    if id.is_empty() || id.len() > MAX_IDENTIFIER_LEN {
        return Err(EngineError::InvalidIdentifier(format!(
            "length {} (must be 1-{MAX_IDENTIFIER_LEN})",
            id.len()
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(EngineError::InvalidIdentifier(format!(
            "'{id}' contains characters outside [A-Za-z0-9_.-]"
        )));
    }
    Ok(())
}

/// Read-only container engine operations.
///
/// The trait is `Send + Sync + 'static` so a single handle can be created at
/// startup and shared for the rest of the run.
///
/// # Error Handling
///
/// - **404 responses**: `EngineError::ContainerNotFound` / `EngineError::NetworkNotFound`
/// - **Connection failures**: `EngineError::Unavailable`
/// - **Everything else**: `EngineError::Api`
pub trait ContainerEngineClient: Send + Sync + 'static {
    /// Lists containers; stopped ones are included when `all` is set.
    fn list_containers(
        &self,
        all: bool,
    ) -> impl Future<Output = Result<Vec<ContainerSummary>, EngineError>> + Send;

    /// Returns the raw inspect tree of one container.
    ///
    /// # Errors
    ///
    /// - `EngineError::ContainerNotFound`: no such container
    /// - `EngineError::InvalidIdentifier`: malformed id
    fn container_attributes(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<AttributeTree, EngineError>> + Send;

    /// Lists networks known to the engine.
    fn list_networks(
        &self,
    ) -> impl Future<Output = Result<Vec<NetworkSummary>, EngineError>> + Send;

    /// Returns the raw inspect tree of one network.
    ///
    /// # Errors
    ///
    /// - `EngineError::NetworkNotFound`: no such network
    fn network_attributes(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<AttributeTree, EngineError>> + Send;

    /// Checks engine connectivity.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Unavailable` if the engine does not answer.
    fn ping(&self) -> impl Future<Output = Result<(), EngineError>> + Send;
}

/// `bollard`-backed engine client.
///
/// Talks to either the Docker daemon or Podman's Docker-compatible API
/// service. Internally holds an `Arc<bollard::Docker>`, so clones are cheap.
/// On Podman, inspect calls use the native libpod endpoints on the same
/// socket so the attribute trees keep libpod-only fields.
#[derive(Clone)]
pub struct BollardEngineClient {
    docker: Arc<bollard::Docker>,
    kind: EngineKind,
    libpod: Option<LibpodTransport>,
}

impl BollardEngineClient {
    /// Connects according to the `[engine]` configuration.
    ///
    /// `EngineKind::Auto` uses the first Podman socket that exists and falls
    /// back to the Docker defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Unavailable` if the client cannot be created
    /// (bad socket path, missing Podman socket, ...). Reachability itself is
    /// only checked by [`ping`](ContainerEngineClient::ping).
    pub fn connect(config: &EngineConfig) -> Result<Self, EngineError> {
        let explicit_socket = (!config.socket.is_empty()).then(|| PathBuf::from(&config.socket));

        let client = match (config.kind, explicit_socket) {
            (kind, Some(socket)) => {
                let kind = if kind == EngineKind::Auto {
                    EngineKind::Docker
                } else {
                    kind
                };
                Self::connect_with_socket(&socket, kind, config.timeout_secs)?
            }
            (EngineKind::Docker, None) => Self::connect_docker(config.timeout_secs)?,
            (EngineKind::Podman, None) => {
                let socket = find_podman_socket().ok_or_else(|| {
                    EngineError::Unavailable(
                        "no podman socket found (is podman.socket running?)".to_owned(),
                    )
                })?;
                Self::connect_with_socket(&socket, EngineKind::Podman, config.timeout_secs)?
            }
            (EngineKind::Auto, None) => match find_podman_socket() {
                Some(socket) => {
                    Self::connect_with_socket(&socket, EngineKind::Podman, config.timeout_secs)?
                }
                None => Self::connect_docker(config.timeout_secs)?,
            },
        };

        info!(engine = %client.kind, "container engine selected");
        Ok(client)
    }

    /// Connects to Docker using the platform's default socket.
    pub fn connect_docker(timeout_secs: u64) -> Result<Self, EngineError> {
        let docker = bollard::Docker::connect_with_local_defaults()
            .map_err(|e| EngineError::Unavailable(format!("failed to connect to docker: {e}")))?
            .with_timeout(Duration::from_secs(timeout_secs));
        Ok(Self {
            docker: Arc::new(docker),
            kind: EngineKind::Docker,
            libpod: None,
        })
    }

    /// Connects to a specific Unix socket speaking the Docker API.
    ///
    /// With `EngineKind::Podman` the socket is also used for libpod inspect calls.
    pub fn connect_with_socket(
        socket_path: &Path,
        kind: EngineKind,
        timeout_secs: u64,
    ) -> Result<Self, EngineError> {
        let path = socket_path.to_string_lossy();
        let docker =
            bollard::Docker::connect_with_socket(&path, timeout_secs, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    EngineError::Unavailable(format!("failed to connect to {kind} at {path}: {e}"))
                })?;
        let libpod = (kind == EngineKind::Podman).then(|| LibpodTransport::new(socket_path));
        Ok(Self {
            docker: Arc::new(docker),
            kind,
            libpod,
        })
    }

    /// Which engine this client ended up talking to.
    pub fn kind(&self) -> EngineKind {
        self.kind
    }
}

impl ContainerEngineClient for BollardEngineClient {
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, EngineError> {
        use bollard::container::ListContainersOptions;

        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| map_engine_error(e, "list containers"))?;

        let result: Vec<ContainerSummary> =
            containers.into_iter().filter_map(to_container_summary).collect();
        debug!(count = result.len(), all, "listed containers");
        Ok(result)
    }

    async fn container_attributes(&self, id: &str) -> Result<AttributeTree, EngineError> {
        use bollard::container::InspectContainerOptions;

        validate_identifier(id)?;

        if let Some(libpod) = &self.libpod {
            return libpod.container_inspect(id).await;
        }

        let details = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => EngineError::ContainerNotFound(id.to_owned()),
                other => map_engine_error(other, "inspect container"),
            })?;

        serde_json::to_value(details)
            .map_err(|e| EngineError::Api(format!("container {id} attributes: {e}")))
    }

    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, EngineError> {
        use bollard::network::ListNetworksOptions;

        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions<String>>)
            .await
            .map_err(|e| map_engine_error(e, "list networks"))?;

        Ok(networks
            .into_iter()
            .filter_map(|n| n.name)
            .map(NetworkSummary::new)
            .collect())
    }

    async fn network_attributes(&self, name: &str) -> Result<AttributeTree, EngineError> {
        use bollard::network::InspectNetworkOptions;

        validate_identifier(name)?;

        if let Some(libpod) = &self.libpod {
            return libpod.network_inspect(name).await;
        }

        let network = self
            .docker
            .inspect_network(name, None::<InspectNetworkOptions<String>>)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => EngineError::NetworkNotFound(name.to_owned()),
                other => map_engine_error(other, "inspect network"),
            })?;

        serde_json::to_value(network)
            .map_err(|e| EngineError::Api(format!("network {name} attributes: {e}")))
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.docker
            .ping()
            .await
            .map_err(|e| EngineError::Unavailable(format!("ping {} failed: {e}", self.kind)))?;
        Ok(())
    }
}

/// Server-side errors stay API errors; transport failures mean the engine is gone.
fn map_engine_error(e: bollard::errors::Error, operation: &str) -> EngineError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } => EngineError::Api(format!("{operation} failed ({status_code}): {message}")),
        other => EngineError::Unavailable(format!("{operation} failed: {other}")),
    }
}

fn to_container_summary(c: bollard::models::ContainerSummary) -> Option<ContainerSummary> {
    let id = c.id?;
    let name = c
        .names
        .unwrap_or_default()
        .first()
        .map(|n| n.trim_start_matches('/').to_owned())
        .unwrap_or_default();
    Some(ContainerSummary { id, name })
}

/// Podman socket locations, most specific first.
fn podman_socket_candidates(runtime_dir: Option<&str>) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(dir) = runtime_dir.filter(|d| !d.is_empty()) {
        candidates.push(Path::new(dir).join("podman").join("podman.sock"));
    }
    candidates.push(PathBuf::from(PODMAN_SYSTEM_SOCKET));
    candidates
}

fn find_podman_socket() -> Option<PathBuf> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").ok();
    podman_socket_candidates(runtime_dir.as_deref())
        .into_iter()
        .find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_hex_id() {
        validate_identifier("abc123def456").unwrap();
    }

    #[test]
    fn validate_accepts_names() {
        validate_identifier("web-server_1.blue").unwrap();
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(matches!(
            validate_identifier(""),
            Err(EngineError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn validate_rejects_path_characters() {
        assert!(validate_identifier("../containers/json").is_err());
        assert!(validate_identifier("web?all=1").is_err());
        assert!(validate_identifier("web server").is_err());
    }

    #[test]
    fn validate_rejects_too_long() {
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_identifier(&long).is_err());
        validate_identifier(&"a".repeat(MAX_IDENTIFIER_LEN)).unwrap();
    }

    #[test]
    fn summary_strips_leading_slash() {
        let raw = bollard::models::ContainerSummary {
            id: Some("abc123def4567890".to_owned()),
            names: Some(vec!["/web".to_owned()]),
            ..Default::default()
        };
        let summary = to_container_summary(raw).unwrap();
        assert_eq!(summary.name, "web");
        assert_eq!(summary.short_id(), "abc123def456");
    }

    #[test]
    fn summary_without_id_is_dropped() {
        let raw = bollard::models::ContainerSummary {
            names: Some(vec!["/ghost".to_owned()]),
            ..Default::default()
        };
        assert!(to_container_summary(raw).is_none());
    }

    #[test]
    fn summary_without_names_has_empty_name() {
        let raw = bollard::models::ContainerSummary {
            id: Some("abc".to_owned()),
            ..Default::default()
        };
        assert_eq!(to_container_summary(raw).unwrap().name, "");
    }

    #[test]
    fn podman_candidates_prefer_runtime_dir() {
        let candidates = podman_socket_candidates(Some("/run/user/1000"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/run/user/1000/podman/podman.sock"),
                PathBuf::from(PODMAN_SYSTEM_SOCKET),
            ]
        );
    }

    #[test]
    fn podman_candidates_without_runtime_dir() {
        assert_eq!(
            podman_socket_candidates(None),
            vec![PathBuf::from(PODMAN_SYSTEM_SOCKET)]
        );
        assert_eq!(
            podman_socket_candidates(Some("")),
            vec![PathBuf::from(PODMAN_SYSTEM_SOCKET)]
        );
    }

    #[test]
    fn server_error_maps_to_api() {
        let err = map_engine_error(
            bollard::errors::Error::DockerResponseServerError {
                status_code: 500,
                message: "boom".to_owned(),
            },
            "list containers",
        );
        match err {
            EngineError::Api(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<BollardEngineClient>();
    }
}
