#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`mapper`]: container attributes → service record (ports, mounts, command, ulimits)
//! - [`network`]: `networks` / `network_mode` resolution and network definitions
//! - [`prune`]: removal of unset values
//! - [`lookup`]: name, id and short-id resolution
//! - [`document`]: YAML and JSON rendering
//! - [`generator`]: end-to-end run against a [`ContainerEngineClient`](autocompose_engine::ContainerEngineClient)
//! - [`error`]: [`MapperError`]

pub mod document;
pub mod error;
pub mod generator;
pub mod lookup;
pub mod mapper;
pub mod network;
pub mod prune;

pub use document::{ComposeDocument, DocumentFormat};
pub use error::MapperError;
pub use generator::{ComposeGenerator, GenerateOptions, GenerateReport, Selection};
pub use lookup::find_container;
pub use mapper::{MappedService, MountKind, MountPoint, PortsField, join_command, map_container};
pub use network::{NetworksField, network_definition, resolve_networks};
pub use prune::{is_defaultable, prune};
