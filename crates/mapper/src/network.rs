//! Network resolution: named networks, static addresses and network modes.
//!
//! A service ends up with exactly one of `networks` or `network_mode`:
//!
//! 1. static address directive found → `networks: {net: {ipv4_address: ...}}`
//! 2. non-default networks attached → `networks: [net, ...]`
//! 3. only engine default networks → `network_mode: <first one>`
//! 4. no network data at all → neither key
//!
//! A static address is read from a `--ip=` token of Podman's `CreateCommand`
//! or, failing that, from the endpoint's `IPAMConfig.IPv4Address` (Docker).
//! Only the first non-default network receives the address; containers with
//! per-network addresses on several networks are not representable and get a
//! warning.

use autocompose_core::types::{AttributeTree, DEFAULT_NETWORKS};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

const STATIC_IP_FLAG: &str = "--ip";

/// Network settings of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworksField {
    /// Plain list of attached networks
    Names(Vec<String>),
    /// Single network with a fixed IPv4 address
    StaticAddress {
        network: String,
        ipv4_address: String,
    },
    /// `network_mode` passthrough
    Mode(String),
    /// No network information available
    Unset,
}

impl NetworksField {
    /// Networks that need a top-level definition.
    pub fn referenced_networks(&self) -> Vec<String> {
        match self {
            Self::Names(names) => names.clone(),
            Self::StaticAddress { network, .. } => vec![network.clone()],
            Self::Mode(_) | Self::Unset => Vec::new(),
        }
    }

    /// Writes the `networks` or `network_mode` key into a service record.
    pub fn apply(self, service: &mut Map<String, Value>) {
        match self {
            Self::Names(names) => {
                service.insert("networks".to_owned(), json!(names));
            }
            Self::StaticAddress {
                network,
                ipv4_address,
            } => {
                let mut networks = Map::new();
                networks.insert(network, json!({ "ipv4_address": ipv4_address }));
                service.insert("networks".to_owned(), Value::Object(networks));
            }
            Self::Mode(mode) => {
                service.insert("network_mode".to_owned(), Value::String(mode));
            }
            Self::Unset => {}
        }
    }
}

/// Attached networks other than `bridge`, `host` and `none`, sorted by name.
pub fn collect_network_names(raw: &AttributeTree) -> Vec<String> {
    let mut names: Vec<String> = attached_networks(raw)
        .map(|networks| {
            networks
                .keys()
                .filter(|name| !DEFAULT_NETWORKS.contains(&name.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Decides how the service's networking is expressed.
///
/// `names` are the non-default networks from [`collect_network_names`].
pub fn resolve_networks(names: &[String], raw: &AttributeTree) -> NetworksField {
    if let Some(first) = names.first() {
        if let Some((network, ipv4_address)) = static_address(names, raw) {
            if names.len() > 1 {
                warn!(
                    network = %network,
                    ignored = names.len() - 1,
                    "static address only kept for one network; other networks dropped"
                );
            }
            return NetworksField::StaticAddress {
                network,
                ipv4_address,
            };
        }
        debug!(first = %first, count = names.len(), "using named networks");
        return NetworksField::Names(names.to_vec());
    }

    let mut attached: Vec<&String> = attached_networks(raw)
        .map(|networks| networks.keys().collect())
        .unwrap_or_default();
    attached.sort();
    if let Some(default) = attached.first() {
        return NetworksField::Mode((*default).clone());
    }

    match raw.pointer("/HostConfig/NetworkMode").and_then(Value::as_str) {
        Some(mode) if !mode.is_empty() => NetworksField::Mode(mode.to_owned()),
        _ => NetworksField::Unset,
    }
}

/// Finds the fixed address requested for one of `names`.
fn static_address(names: &[String], raw: &AttributeTree) -> Option<(String, String)> {
    let first = names.first()?;

    if let Some(address) = create_command_address(raw) {
        return Some((first.clone(), address));
    }

    let networks = attached_networks(raw)?;
    names.iter().find_map(|name| {
        networks
            .get(name)?
            .pointer("/IPAMConfig/IPv4Address")
            .and_then(Value::as_str)
            .filter(|addr| !addr.is_empty())
            .map(|addr| (name.clone(), addr.to_owned()))
    })
}

/// `--ip=ADDR` or `--ip ADDR` from the recorded creation command.
fn create_command_address(raw: &AttributeTree) -> Option<String> {
    let tokens: Vec<&str> = raw
        .pointer("/Config/CreateCommand")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();

    tokens.iter().enumerate().find_map(|(idx, token)| {
        if let Some(addr) = token
            .strip_prefix(STATIC_IP_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(addr.to_owned());
        }
        if *token == STATIC_IP_FLAG {
            return tokens.get(idx + 1).map(|addr| (*addr).to_owned());
        }
        None
    })
}

fn attached_networks(raw: &AttributeTree) -> Option<&Map<String, Value>> {
    raw.pointer("/NetworkSettings/Networks")?.as_object()
}

/// Builds the top-level definition for one network.
///
/// Accepts both Docker (`Name`, `EnableIPv6`, `IPAM.Driver`) and libpod
/// (`name`, `ipv6_enabled`, `ipam_options.driver`) attribute spellings.
/// Returns the key to file the definition under together with the record.
pub fn network_definition(
    requested: &str,
    attrs: &AttributeTree,
    external: bool,
) -> (String, Value) {
    let name = first_of(attrs, &["/Name", "/name"])
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .unwrap_or(requested)
        .to_owned();

    if external {
        return (name.clone(), json!({ "name": name, "external": true }));
    }

    let record = json!({
        "name": name,
        "driver": first_of(attrs, &["/Driver", "/driver"]).cloned().unwrap_or(Value::Null),
        "enable_ipv6": first_of(attrs, &["/EnableIPv6", "/ipv6_enabled"]).cloned().unwrap_or(Value::Bool(false)),
        "internal": first_of(attrs, &["/Internal", "/internal"]).cloned().unwrap_or(Value::Bool(false)),
        "ipam": {
            "driver": first_of(attrs, &["/IPAM/Driver", "/ipam_options/driver"]).cloned().unwrap_or(Value::Null),
        },
    });
    (name, record)
}

fn first_of<'a>(attrs: &'a AttributeTree, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .find_map(|p| attrs.pointer(p).filter(|v| !v.is_null()))
}
