//! Compose generation -- selection, inspection, merge and prune
//!
//! [`ComposeGenerator`] drives one run:
//!
//! 1. list containers and expand the [`Selection`] into container references
//! 2. resolve each reference, inspect it and map it to a service
//! 3. declare every referenced network (all engine networks with `--all`)
//! 4. prune and merge `version`, `services`, `networks`, `volumes`; empty
//!    `networks` and `volumes` are left out
//!
//! Containers and networks that cannot be found are logged and skipped.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use autocompose_core::config::ComposeConfig;
use autocompose_core::error::EngineError;
use autocompose_engine::ContainerEngineClient;

use crate::document::ComposeDocument;
use crate::error::MapperError;
use crate::lookup::find_container;
use crate::mapper::map_container;
use crate::network::network_definition;
use crate::prune::prune;

/// Which containers to render
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Container names, ids or short-ids
    pub names: Vec<String>,
    /// Every container the engine knows, running or stopped
    pub all: bool,
    /// Regex the container references must match
    pub filter: Option<String>,
}

/// Generation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Value of the top-level `version` key
    pub version: String,
    /// Leave named volumes undeclared so they are created fresh
    pub create_volumes: bool,
    /// Declare networks as `external: true`
    pub external_networks: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from(&ComposeConfig::default())
    }
}

impl From<&ComposeConfig> for GenerateOptions {
    fn from(config: &ComposeConfig) -> Self {
        Self {
            version: config.version.clone(),
            create_volumes: config.create_volumes,
            external_networks: config.external_networks,
        }
    }
}

/// Outcome of one generation run
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub document: ComposeDocument,
    /// Number of services rendered
    pub rendered: usize,
    /// References that matched no container
    pub skipped_containers: Vec<String>,
    /// Networks that could not be inspected
    pub skipped_networks: Vec<String>,
}

/// Builds compose documents from a live engine
pub struct ComposeGenerator<C: ContainerEngineClient> {
    client: Arc<C>,
    options: GenerateOptions,
}

impl<C: ContainerEngineClient> ComposeGenerator<C> {
    pub fn new(client: Arc<C>, options: GenerateOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Inspects the selected containers and renders them into one document.
    pub async fn generate(&self, selection: &Selection) -> Result<GenerateReport, MapperError> {
        let filter = compile_filter(selection.filter.as_deref())?;
        let containers = self.client.list_containers(true).await?;

        let mut requested: Vec<String> = if selection.all {
            containers.iter().map(|c| c.name.clone()).collect()
        } else {
            selection.names.clone()
        };
        if let Some(re) = &filter {
            requested.retain(|name| re.is_match(name));
        }
        let mut seen_refs = HashSet::new();
        requested.retain(|name| seen_refs.insert(name.clone()));
        debug!(count = requested.len(), all = selection.all, "containers requested");

        let mut services = Map::new();
        let mut volumes = Map::new();
        let mut network_names = BTreeSet::new();
        let mut skipped_containers = Vec::new();
        let mut seen_ids = HashSet::new();

        for reference in &requested {
            let summary = match find_container(&containers, reference) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(container = %reference, error = %e, "skipping container");
                    skipped_containers.push(reference.clone());
                    continue;
                }
            };
            if !seen_ids.insert(summary.id.clone()) {
                debug!(container = %summary, "already rendered");
                continue;
            }

            let raw = match self.client.container_attributes(&summary.id).await {
                Ok(raw) => raw,
                Err(e) if skippable(&e) => {
                    warn!(container = %summary, error = %e, "skipping container");
                    skipped_containers.push(reference.clone());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let mapped = match map_container(&raw, self.options.create_volumes) {
                Ok(mapped) => mapped,
                Err(e) => {
                    warn!(container = %summary, error = %e, "skipping container");
                    skipped_containers.push(reference.clone());
                    continue;
                }
            };
            network_names.extend(mapped.networks);
            volumes.extend(mapped.volumes);
            services.insert(mapped.name, Value::Object(mapped.service));
        }

        let available = if selection.all || !network_names.is_empty() {
            self.client.list_networks().await?
        } else {
            Vec::new()
        };
        if selection.all {
            network_names.extend(
                available
                    .iter()
                    .filter(|n| !n.is_default())
                    .map(|n| n.name.clone()),
            );
        }

        let mut networks = Map::new();
        let mut skipped_networks = Vec::new();
        for name in &network_names {
            if !available.iter().any(|n| &n.name == name) {
                warn!(network = %name, "network not found, skipping");
                skipped_networks.push(name.clone());
                continue;
            }
            let attrs = match self.client.network_attributes(name).await {
                Ok(attrs) => attrs,
                Err(e) if skippable(&e) => {
                    warn!(network = %name, error = %e, "skipping network");
                    skipped_networks.push(name.clone());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let (key, record) = network_definition(name, &attrs, self.options.external_networks);
            networks.insert(key, record);
        }

        let rendered = services.len();
        let mut root = Map::new();
        root.insert(
            "version".to_owned(),
            Value::String(self.options.version.clone()),
        );
        // `services` stays even when empty; only the declarations may vanish.
        root.insert("services".to_owned(), Value::Object(prune(services)));
        let mut declarations = Map::new();
        declarations.insert("networks".to_owned(), Value::Object(networks));
        declarations.insert("volumes".to_owned(), Value::Object(volumes));
        root.extend(prune(declarations));

        info!(
            rendered,
            skipped_containers = skipped_containers.len(),
            skipped_networks = skipped_networks.len(),
            "compose document generated"
        );

        Ok(GenerateReport {
            document: ComposeDocument::new(root),
            rendered,
            skipped_containers,
            skipped_networks,
        })
    }
}

fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>, MapperError> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|e| MapperError::InvalidFilter {
                pattern: p.to_owned(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn skippable(err: &EngineError) -> bool {
    err.is_not_found() || matches!(err, EngineError::InvalidIdentifier(_))
}
