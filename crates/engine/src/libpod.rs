//! Native libpod endpoints reached over the Podman service socket.
//!
//! Podman's Docker-compatible API answers inspect calls in Docker's shape and
//! `bollard` deserializes them into typed models, which drops libpod-only
//! fields such as `Config.CreateCommand`. For Podman the inspect calls go
//! through [`LibpodTransport`] instead, and the JSON is kept untyped.

use std::path::{Path, PathBuf};

use autocompose_core::error::EngineError;
use autocompose_core::types::AttributeTree;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tracing::{debug, warn};

/// Version segment of every libpod path; Podman 4 and 5 both serve it.
pub const LIBPOD_API_PREFIX: &str = "/v4.0.0/libpod";

/// One-request-per-connection HTTP client for the libpod REST API
#[derive(Debug, Clone)]
pub struct LibpodTransport {
    socket_path: PathBuf,
}

impl LibpodTransport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// `GET /libpod/containers/{id}/json`
    ///
    /// # Errors
    ///
    /// - `EngineError::ContainerNotFound`: 404 from Podman
    /// - `EngineError::Unavailable`: the socket does not answer
    /// - `EngineError::Api`: any other failure status or a malformed body
    pub async fn container_inspect(&self, id: &str) -> Result<AttributeTree, EngineError> {
        self.get_json(&format!("{LIBPOD_API_PREFIX}/containers/{id}/json"))
            .await?
            .ok_or_else(|| EngineError::ContainerNotFound(id.to_owned()))
    }

    /// `GET /libpod/networks/{name}/json`
    pub async fn network_inspect(&self, name: &str) -> Result<AttributeTree, EngineError> {
        self.get_json(&format!("{LIBPOD_API_PREFIX}/networks/{name}/json"))
            .await?
            .ok_or_else(|| EngineError::NetworkNotFound(name.to_owned()))
    }

    /// Returns `None` on 404.
    async fn get_json(&self, path: &str) -> Result<Option<AttributeTree>, EngineError> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            EngineError::Unavailable(format!(
                "failed to connect to {}: {e}",
                self.socket_path.display()
            ))
        })?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| EngineError::Unavailable(format!("libpod handshake failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                warn!(error = %e, "libpod connection error");
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header("Host", "localhost")
            .body(Empty::<Bytes>::new())
            .map_err(|e| EngineError::Api(format!("failed to build request for {path}: {e}")))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| EngineError::Unavailable(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| EngineError::Api(format!("failed to read {path}: {e}")))?
            .to_bytes();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EngineError::Api(format!(
                "GET {path} failed ({}): {}",
                status.as_u16(),
                String::from_utf8_lossy(&body).trim()
            )));
        }

        debug!(path, bytes = body.len(), "libpod response");
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| EngineError::Api(format!("GET {path}: invalid JSON: {e}")))
    }
}
