//! Shared fixtures for mapper integration tests

#![allow(dead_code)]

use autocompose_core::error::EngineError;
use autocompose_core::types::{AttributeTree, ContainerSummary, NetworkSummary};
use autocompose_engine::ContainerEngineClient;
use serde_json::{Value, json};

/// In-memory engine serving canned inspect output
#[derive(Default)]
pub struct FixtureEngine {
    containers: Vec<(ContainerSummary, Option<AttributeTree>)>,
    networks: Vec<(String, AttributeTree)>,
    unreachable: bool,
}

impl FixtureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container; its name comes from the `Name` attribute.
    pub fn with_container(mut self, id: &str, attrs: AttributeTree) -> Self {
        let name = attrs
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_owned();
        self.containers
            .push((ContainerSummary::new(id, name), Some(attrs)));
        self
    }

    /// Listed, but removed before it could be inspected.
    pub fn with_vanished_container(mut self, id: &str, name: &str) -> Self {
        self.containers.push((ContainerSummary::new(id, name), None));
        self
    }

    /// Adds a network; its name comes from `Name` or `name`.
    pub fn with_network(mut self, attrs: AttributeTree) -> Self {
        let name = attrs
            .get("Name")
            .or_else(|| attrs.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        self.networks.push((name, attrs));
        self
    }

    pub fn with_default_networks(self) -> Self {
        ["bridge", "host", "none"]
            .into_iter()
            .fold(self, |engine, name| {
                engine.with_network(json!({"Name": name, "Driver": name}))
            })
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn check_reachable(&self) -> Result<(), EngineError> {
        if self.unreachable {
            return Err(EngineError::Unavailable("connection refused".to_owned()));
        }
        Ok(())
    }
}

impl ContainerEngineClient for FixtureEngine {
    async fn list_containers(&self, _all: bool) -> Result<Vec<ContainerSummary>, EngineError> {
        self.check_reachable()?;
        Ok(self.containers.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn container_attributes(&self, id: &str) -> Result<AttributeTree, EngineError> {
        self.check_reachable()?;
        self.containers
            .iter()
            .find(|(s, _)| s.id == id)
            .and_then(|(_, attrs)| attrs.clone())
            .ok_or_else(|| EngineError::ContainerNotFound(id.to_owned()))
    }

    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, EngineError> {
        self.check_reachable()?;
        Ok(self
            .networks
            .iter()
            .map(|(name, _)| NetworkSummary::new(name.clone()))
            .collect())
    }

    async fn network_attributes(&self, name: &str) -> Result<AttributeTree, EngineError> {
        self.check_reachable()?;
        self.networks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, attrs)| attrs.clone())
            .ok_or_else(|| EngineError::NetworkNotFound(name.to_owned()))
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.check_reachable()
    }
}

/// Docker-style inspect output with everything unset.
pub fn container(name: &str, image: &str) -> AttributeTree {
    json!({
        "Id": format!("{name}-id"),
        "Name": format!("/{name}"),
        "Config": {
            "Hostname": "",
            "Domainname": "",
            "User": "",
            "Env": null,
            "Cmd": null,
            "Image": image,
            "WorkingDir": "",
            "Entrypoint": null,
            "Tty": false,
            "OpenStdin": false,
        },
        "HostConfig": {
            "CpuShares": 0,
            "Memory": 0,
            "MemoryReservation": 0,
            "RestartPolicy": {"Name": "no", "MaximumRetryCount": 0},
            "LogConfig": {"Type": "", "Config": {}},
            "Privileged": false,
            "ReadonlyRootfs": false,
            "Dns": [],
            "DnsSearch": [],
            "CapAdd": null,
            "CapDrop": null,
            "PortBindings": {},
            "NetworkMode": "bridge",
        },
        "NetworkSettings": {"Networks": {"bridge": {"IPAMConfig": null}}},
        "Mounts": [],
    })
}

/// Overwrites one value addressed by a `/`-separated path, creating objects on the way.
pub fn set(tree: &mut AttributeTree, path: &str, value: Value) {
    let mut node = tree;
    let mut parts = path.trim_start_matches('/').split('/').peekable();
    while let Some(part) = parts.next() {
        if !node.is_object() {
            *node = json!({});
        }
        let Some(map) = node.as_object_mut() else {
            return;
        };
        if parts.peek().is_none() {
            map.insert(part.to_owned(), value);
            return;
        }
        node = map.entry(part.to_owned()).or_insert_with(|| json!({}));
    }
}
