//! Domain types shared by the engine client and the mapper

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw inspect output exactly as the engine returns it.
///
/// Keys follow the engine's own spelling (`Name`, `Config`, `HostConfig`,
/// `NetworkSettings`, `Mounts`, ...). The mapper only ever reads from it.
pub type AttributeTree = serde_json::Value;

/// Engine pseudo-networks that never get a network definition.
pub const DEFAULT_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

/// Length of a short container id.
const SHORT_ID_LEN: usize = 12;

/// One entry of the engine's container list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Full container id
    pub id: String,
    /// Container name without the leading `/`
    pub name: String,
}

impl ContainerSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// First 12 characters of the id.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(SHORT_ID_LEN)
            .map_or(self.id.len(), |(idx, _)| idx);
        &self.id[..end]
    }
}

impl fmt::Display for ContainerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.short_id())
    }
}

/// One entry of the engine's network list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub name: String,
}

impl NetworkSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Whether this is one of the engine pseudo-networks.
    pub fn is_default(&self) -> bool {
        DEFAULT_NETWORKS.contains(&self.name.as_str())
    }
}
