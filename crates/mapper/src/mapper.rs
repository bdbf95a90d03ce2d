//! Container attributes → service record.
//!
//! [`map_container`] reads one container's inspect output and builds the
//! service record in the fixed key order of a compose service. Fields the
//! engine reports as unset are carried as null, zero or empty values and
//! left for [`prune`](crate::prune) to remove.
//!
//! Derived fields:
//!
//! - `command` / `entrypoint`: token lists joined with [`join_command`]
//! - `ulimits`: `RLIMIT_` prefix stripped, scalar when soft and hard agree
//! - `devices`: `host:container`
//! - `volumes`: one `source:destination[:ro]` string per volume or bind mount
//! - `ports` / `expose`: bindings win, exposure list otherwise

use std::cmp::Ordering;

use autocompose_core::types::AttributeTree;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::MapperError;
use crate::network::{collect_network_names, resolve_networks};

/// Result of mapping one container
#[derive(Debug, Clone, PartialEq)]
pub struct MappedService {
    /// Service key, the container name without its leading `/`
    pub name: String,
    /// Service record, not yet pruned
    pub service: Map<String, Value>,
    /// Networks the service references
    pub networks: Vec<String>,
    /// Named volumes to declare as external
    pub volumes: Map<String, Value>,
}

/// Maps one container's raw attributes into a service record.
///
/// With `create_volumes` set, named volumes are not registered as external.
pub fn map_container(
    raw: &AttributeTree,
    create_volumes: bool,
) -> Result<MappedService, MapperError> {
    let name = raw
        .get("Name")
        .and_then(Value::as_str)
        .map(|n| n.trim_start_matches('/'))
        .filter(|n| !n.is_empty())
        .ok_or(MapperError::MissingAttribute("Name"))?
        .to_owned();

    let mut service = Map::new();
    service.insert("container_name".to_owned(), Value::String(name.clone()));
    copy(&mut service, "image", raw, "/Config/Image");
    copy(&mut service, "hostname", raw, "/Config/Hostname");
    copy(&mut service, "domainname", raw, "/Config/Domainname");
    copy(&mut service, "cap_drop", raw, "/HostConfig/CapDrop");
    copy(&mut service, "cap_add", raw, "/HostConfig/CapAdd");
    service.insert("deploy".to_owned(), deploy(raw));
    service.insert(
        "logging".to_owned(),
        json!({
            "driver": attr(raw, "/HostConfig/LogConfig/Type"),
            "options": attr(raw, "/HostConfig/LogConfig/Config"),
        }),
    );
    copy(&mut service, "volume_driver", raw, "/HostConfig/VolumeDriver");
    copy(&mut service, "volumes_from", raw, "/HostConfig/VolumesFrom");
    copy(&mut service, "dns", raw, "/HostConfig/Dns");
    copy(&mut service, "dns_search", raw, "/HostConfig/DnsSearch");
    copy(&mut service, "extra_hosts", raw, "/HostConfig/ExtraHosts");
    copy(&mut service, "links", raw, "/HostConfig/Links");
    copy(&mut service, "security_opt", raw, "/HostConfig/SecurityOpt");
    copy(&mut service, "environment", raw, "/Config/Env");
    service.insert(
        "entrypoint".to_owned(),
        entrypoint(raw.pointer("/Config/Entrypoint")),
    );
    copy(&mut service, "user", raw, "/Config/User");
    copy(&mut service, "working_dir", raw, "/Config/WorkingDir");
    copy(&mut service, "privileged", raw, "/HostConfig/Privileged");
    copy(&mut service, "read_only", raw, "/HostConfig/ReadonlyRootfs");
    copy(&mut service, "tty", raw, "/Config/Tty");
    copy(&mut service, "stdin_open", raw, "/Config/OpenStdin");

    let networks = resolve_networks(&collect_network_names(raw), raw);
    let referenced = networks.referenced_networks();
    networks.apply(&mut service);

    resolve_ports(raw).apply(&mut service);

    if let Some(command) = command(raw.pointer("/Config/Cmd")) {
        service.insert("command".to_owned(), command);
    }
    service.insert("ulimits".to_owned(), ulimits(raw));
    service.insert("devices".to_owned(), devices(raw));

    let mounts = collect_mounts(raw);
    let mut volumes = Map::new();
    if !create_volumes {
        for mount in mounts.iter().filter(|m| m.kind == MountKind::Volume) {
            volumes.insert(mount.source.clone(), json!({ "external": true }));
        }
    }
    let entries: Vec<String> = mounts.iter().map(MountPoint::volume_entry).collect();
    service.insert("volumes".to_owned(), json!(entries));

    debug!(
        container = %name,
        networks = referenced.len(),
        mounts = mounts.len(),
        "mapped container"
    );

    Ok(MappedService {
        name,
        service,
        networks: referenced,
        volumes,
    })
}

fn attr(raw: &AttributeTree, pointer: &str) -> Value {
    raw.pointer(pointer).cloned().unwrap_or(Value::Null)
}

fn copy(service: &mut Map<String, Value>, key: &str, raw: &AttributeTree, pointer: &str) {
    service.insert(key.to_owned(), attr(raw, pointer));
}

fn deploy(raw: &AttributeTree) -> Value {
    json!({
        "resources": {
            "limits": {
                "cpus": attr(raw, "/HostConfig/CpuShares"),
                "memory": stringify(raw.pointer("/HostConfig/Memory")),
            },
            "reservations": {
                "memory": stringify(raw.pointer("/HostConfig/MemoryReservation")),
            },
        },
        "restart_policy": {
            "condition": attr(raw, "/HostConfig/RestartPolicy/Name"),
            "max_attempts": attr(raw, "/HostConfig/RestartPolicy/MaximumRetryCount"),
        },
    })
}

/// Numbers become their decimal text so a zero limit reads as `"0"`.
fn stringify(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Number(n)) => Value::String(n.to_string()),
        Some(Value::String(s)) => Value::String(s.clone()),
        _ => Value::Null,
    }
}

/// Quotes one command token for a compose `command` string.
///
/// Empty tokens and tokens holding whitespace or shell quote characters are
/// wrapped in double quotes, with `\` and `"` backslash-escaped inside.
/// Every `$` is doubled so compose does not treat it as interpolation.
pub fn quote_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    let quoted = if needs_quotes {
        let escaped = token.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        token.to_owned()
    };
    quoted.replace('$', "$$")
}

/// Joins command tokens into a single compose command string.
pub fn join_command<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| quote_token(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn string_tokens(items: &[Value]) -> Vec<&str> {
    items.iter().filter_map(Value::as_str).collect()
}

fn command(cmd: Option<&Value>) -> Option<Value> {
    match cmd? {
        Value::Array(items) if !items.is_empty() => {
            Some(Value::String(join_command(&string_tokens(items))))
        }
        Value::String(s) if !s.is_empty() => Some(Value::String(s.clone())),
        _ => None,
    }
}

fn entrypoint(raw: Option<&Value>) -> Value {
    match raw {
        Some(Value::Array(items)) => Value::String(join_command(&string_tokens(items))),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn ulimits(raw: &AttributeTree) -> Value {
    let mut out = Map::new();
    let Some(entries) = raw.pointer("/HostConfig/Ulimits").and_then(Value::as_array) else {
        return Value::Object(out);
    };
    for entry in entries {
        let Some(name) = entry.get("Name").and_then(Value::as_str) else {
            continue;
        };
        let name = name.strip_prefix("RLIMIT_").unwrap_or(name).to_lowercase();
        let soft = attr(entry, "/Soft");
        let hard = attr(entry, "/Hard");
        let value = if soft == hard {
            hard
        } else {
            json!({ "soft": soft, "hard": hard })
        };
        out.insert(name, value);
    }
    Value::Object(out)
}

fn devices(raw: &AttributeTree) -> Value {
    let entries: Vec<String> = raw
        .pointer("/HostConfig/Devices")
        .and_then(Value::as_array)
        .map(|devices| {
            devices
                .iter()
                .filter_map(|d| {
                    let host = d.get("PathOnHost")?.as_str()?;
                    let container = d.get("PathInContainer")?.as_str()?;
                    Some(format!("{host}:{container}"))
                })
                .collect()
        })
        .unwrap_or_default();
    json!(entries)
}

/// Engine-managed volume or host bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    Volume,
    Bind,
}

/// One mount as it appears in the service's `volumes` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub kind: MountKind,
    /// Volume name or host path
    pub source: String,
    pub destination: String,
    pub read_only: bool,
}

impl MountPoint {
    /// Reads one entry of the inspect `Mounts` list.
    ///
    /// Returns `None` for tmpfs, npipe and other mount types compose cannot
    /// express as a `volumes` entry.
    pub fn from_attributes(mount: &Value) -> Option<Self> {
        let kind = match mount.get("Type")?.as_str()? {
            "volume" => MountKind::Volume,
            "bind" => MountKind::Bind,
            other => {
                debug!(mount_type = other, "skipping unsupported mount type");
                return None;
            }
        };
        let source_key = match kind {
            MountKind::Volume => "Name",
            MountKind::Bind => "Source",
        };
        Some(Self {
            kind,
            source: mount.get(source_key)?.as_str()?.to_owned(),
            destination: mount.get("Destination")?.as_str()?.to_owned(),
            read_only: !mount.get("RW").and_then(Value::as_bool).unwrap_or(true),
        })
    }

    /// `source:destination`, with `:ro` appended for read-only mounts.
    pub fn volume_entry(&self) -> String {
        let suffix = if self.read_only { ":ro" } else { "" };
        format!("{}:{}{suffix}", self.source, self.destination)
    }
}

/// Supported mounts sorted by destination.
pub fn collect_mounts(raw: &AttributeTree) -> Vec<MountPoint> {
    let mut mounts: Vec<MountPoint> = raw
        .get("Mounts")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(MountPoint::from_attributes).collect())
        .unwrap_or_default();
    mounts.sort_by(|a, b| {
        a.destination
            .cmp(&b.destination)
            .then_with(|| a.volume_entry().cmp(&b.volume_entry()))
    });
    mounts
}

/// Published ports or, failing that, exposed ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortsField {
    Ports(Vec<String>),
    Expose(Vec<String>),
}

impl PortsField {
    pub fn apply(self, service: &mut Map<String, Value>) {
        match self {
            Self::Ports(ports) => service.insert("ports".to_owned(), json!(ports)),
            Self::Expose(ports) => service.insert("expose".to_owned(), json!(ports)),
        };
    }
}

/// Chooses between `ports` and `expose`.
///
/// Every binding of every bound port yields one `ip:host:container` entry.
/// Entries are ordered by container port number.
pub fn resolve_ports(raw: &AttributeTree) -> PortsField {
    let mut bound: Vec<(&str, String)> = Vec::new();
    if let Some(bindings) = raw
        .pointer("/HostConfig/PortBindings")
        .and_then(Value::as_object)
    {
        for (container_port, hosts) in bindings {
            let Some(hosts) = hosts.as_array() else {
                continue;
            };
            for host in hosts {
                let ip = host.get("HostIp").and_then(Value::as_str).unwrap_or("");
                let port = host.get("HostPort").and_then(Value::as_str).unwrap_or("");
                bound.push((container_port.as_str(), port_entry(ip, port, container_port)));
            }
        }
    }

    if !bound.is_empty() {
        bound.sort_by(|(a, ea), (b, eb)| compare_ports(a, b).then_with(|| ea.cmp(eb)));
        return PortsField::Ports(bound.into_iter().map(|(_, entry)| entry).collect());
    }

    let mut exposed: Vec<String> = raw
        .pointer("/Config/ExposedPorts")
        .and_then(Value::as_object)
        .map(|ports| ports.keys().cloned().collect())
        .unwrap_or_default();
    exposed.sort_by(|a, b| compare_ports(a, b));
    PortsField::Expose(exposed)
}

fn port_entry(ip: &str, host_port: &str, container_port: &str) -> String {
    match (ip.is_empty(), host_port.is_empty()) {
        (false, _) => format!("{ip}:{host_port}:{container_port}"),
        (true, false) => format!("{host_port}:{container_port}"),
        (true, true) => container_port.to_owned(),
    }
}

/// Orders `80/tcp` before `443/tcp`, numerically then by protocol.
fn compare_ports(a: &str, b: &str) -> Ordering {
    fn split(spec: &str) -> (Option<u32>, &str) {
        let (port, proto) = spec.split_once('/').unwrap_or((spec, ""));
        (port.parse().ok(), proto)
    }
    let (pa, proto_a) = split(a);
    let (pb, proto_b) = split(b);
    pa.cmp(&pb)
        .then_with(|| proto_a.cmp(proto_b))
        .then_with(|| a.cmp(b))
}
