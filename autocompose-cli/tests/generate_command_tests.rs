//! Integration tests for the generate flow: config resolution, engine
//! checks, exit codes and rendered output.

use std::fs;
use std::sync::Arc;

use clap::Parser;
use serde_json::{Value, json};
use tempfile::TempDir;

use autocompose_cli::cli::Cli;
use autocompose_cli::error::CliError;
use autocompose_cli::generate::{execute, load_config_from};
use autocompose_core::config::{AutocomposeConfig, EngineKind};

mod mock {
    use autocompose_core::error::EngineError;
    use autocompose_core::types::{AttributeTree, ContainerSummary, NetworkSummary};
    use autocompose_engine::ContainerEngineClient;

    pub struct SingleContainerEngine {
        pub summary: ContainerSummary,
        pub attrs: AttributeTree,
        pub reachable: bool,
    }

    impl ContainerEngineClient for SingleContainerEngine {
        async fn list_containers(
            &self,
            _all: bool,
        ) -> Result<Vec<ContainerSummary>, EngineError> {
            Ok(vec![self.summary.clone()])
        }

        async fn container_attributes(&self, id: &str) -> Result<AttributeTree, EngineError> {
            if id == self.summary.id {
                Ok(self.attrs.clone())
            } else {
                Err(EngineError::ContainerNotFound(id.to_owned()))
            }
        }

        async fn list_networks(&self) -> Result<Vec<NetworkSummary>, EngineError> {
            Ok(vec![NetworkSummary::new("bridge")])
        }

        async fn network_attributes(&self, name: &str) -> Result<AttributeTree, EngineError> {
            Err(EngineError::NetworkNotFound(name.to_owned()))
        }

        async fn ping(&self) -> Result<(), EngineError> {
            if self.reachable {
                Ok(())
            } else {
                Err(EngineError::Unavailable("connection refused".to_owned()))
            }
        }
    }
}

use mock::SingleContainerEngine;

fn engine(reachable: bool) -> Arc<SingleContainerEngine> {
    Arc::new(SingleContainerEngine {
        summary: autocompose_core::types::ContainerSummary::new("4f9a8b7c6d5e4f3a2b1c", "web"),
        attrs: json!({
            "Name": "/web",
            "Config": {"Image": "nginx:latest", "Cmd": ["nginx", "-g", "daemon off;"]},
            "HostConfig": {
                "Memory": 0,
                "PortBindings": {"80/tcp": [{"HostIp": "", "HostPort": "8080"}]},
            },
            "NetworkSettings": {"Networks": {"bridge": {}}},
            "Mounts": [{"Type": "volume", "Name": "html", "Destination": "/usr/share/nginx/html", "RW": true}],
        }),
        reachable,
    })
}

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("autocompose").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[tokio::test]
async fn test_yaml_output_for_named_container() {
    let cli = cli(&["web"]);
    let config = AutocomposeConfig::default();

    let text = execute(engine(true), &cli, &config)
        .await
        .expect("generation should succeed");

    assert!(text.starts_with("version: \"3.8\"\n"), "{text}");
    assert!(text.contains("command: \"nginx -g \\\"daemon off;\\\"\""), "{text}");
    assert!(text.contains("- \"8080:80/tcp\""), "{text}");
    assert!(text.contains("html:\n    external: true"), "{text}");
}

#[tokio::test]
async fn test_json_output_with_create_volumes() {
    let cli = cli(&["--format", "json", "-c", "4f9a"]);
    let mut config = AutocomposeConfig::default();
    cli.apply_overrides(&mut config);

    let text = execute(engine(true), &cli, &config)
        .await
        .expect("generation should succeed");
    let parsed: Value = serde_json::from_str(&text).expect("output should be JSON");

    assert_eq!(parsed["services"]["web"]["image"], json!("nginx:latest"));
    assert_eq!(
        parsed["services"]["web"]["volumes"],
        json!(["html:/usr/share/nginx/html"])
    );
    assert!(parsed.get("volumes").is_none());
}

#[tokio::test]
async fn test_unreachable_engine_exits_one() {
    let err = execute(engine(false), &cli(&["web"]), &AutocomposeConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::EngineUnavailable(_)));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_only_missing_containers_exits_one() {
    let err = execute(engine(true), &cli(&["ghost"]), &AutocomposeConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::NothingFound(ref names) if names == &["ghost"]));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_partially_missing_containers_still_render() {
    let text = execute(
        engine(true),
        &cli(&["ghost", "web"]),
        &AutocomposeConfig::default(),
    )
    .await
    .expect("found containers should render");
    assert!(text.contains("container_name: \"web\""));
}

#[tokio::test]
async fn test_invalid_filter_exits_two() {
    let err = execute(
        engine(true),
        &cli(&["-a", "-f", "web("]),
        &AutocomposeConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_explicit_config_file_is_loaded() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("autocompose.toml");
    fs::write(
        &config_path,
        r#"
[engine]
kind = "podman"

[compose]
version = "3.9"
external_networks = true
"#,
    )
    .expect("should write config");

    let path = config_path.to_string_lossy().into_owned();
    let cli = cli(&["--config", &path, "-c", "web"]);
    let config = load_config_from(&cli, &temp_dir.path().join("unused.toml"))
        .await
        .expect("config should load");

    assert_eq!(config.engine.kind, EngineKind::Podman);
    assert_eq!(config.compose.version, "3.9");
    assert!(config.compose.external_networks);
    assert!(config.compose.create_volumes, "-c should switch create_volumes on");
}

#[tokio::test]
async fn test_missing_explicit_config_exits_two() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("nope.toml");
    let path = missing.to_string_lossy().into_owned();

    let err = load_config_from(&cli(&["--config", &path, "web"]), &missing)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_fallback_config_in_working_directory() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let fallback = temp_dir.path().join("autocompose.toml");
    fs::write(&fallback, "[compose]\nversion = \"3.7\"\n").expect("should write config");

    let config = load_config_from(&cli(&["web"]), &fallback)
        .await
        .expect("fallback config should load");
    assert_eq!(config.compose.version, "3.7");
}

#[tokio::test]
async fn test_invalid_flag_value_exits_two() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let err = load_config_from(
        &cli(&["--log-level", "chatty", "web"]),
        &temp_dir.path().join("absent.toml"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
