#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`client`]: engine abstraction (`ContainerEngineClient` trait, `BollardEngineClient`)
//! - [`libpod`]: raw libpod inspect calls used when the engine is Podman

pub mod client;
pub mod libpod;

pub use client::{BollardEngineClient, ContainerEngineClient, validate_identifier};
pub use libpod::LibpodTransport;
