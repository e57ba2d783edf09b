//! Project configuration, export and CLI commands against a temp directory

use routeforge::cli::{Cli, Command};
use routeforge::prelude::*;
use routeforge::{write_export, ConfigError, LogFormat, ProjectConfig};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tempfile::TempDir;

fn catalog() -> Api {
    Api::new(ApiOptions::new("catalog", "Product catalog")).version(
        Version::new(3).group(
            Group::new(GroupOptions::new("products", "/products").description("Products")).route(
                Route::new("/{sku}").endpoint(
                    Endpoint::new(
                        EndpointOptions::new("GET", "showProduct", "Show a product"),
                        |_req: Request| async { "ok" },
                    )
                    .param_schema(|schema| {
                        schema.add_string(StringValue::new("sku").required().min(4).max(12));
                    }),
                ),
            ),
        ),
    )
}

#[test]
fn missing_project_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ProjectConfig::from_file(dir.path().join("routeforge.json")).unwrap();
    assert_eq!(config, ProjectConfig::default());
    assert_eq!(config.address, "127.0.0.1:8080");
    assert_eq!(config.export_path, PathBuf::from("api.json"));
}

#[test]
fn project_file_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routeforge.json");
    std::fs::write(
        &path,
        r#"{
            "name": "catalog",
            "version": "3.1.0",
            "address": "0.0.0.0:9090",
            "exportPath": "docs/catalog.json",
            "log": {"level": "debug", "format": "pretty"}
        }"#,
    )
    .unwrap();

    let config = ProjectConfig::from_file(&path).unwrap();
    assert_eq!(config.name.as_deref(), Some("catalog"));
    assert_eq!(config.version.as_deref(), Some("3.1.0"));
    assert_eq!(config.address, "0.0.0.0:9090");
    assert_eq!(config.export_path, PathBuf::from("docs/catalog.json"));
    assert_eq!(config.log.format, LogFormat::Pretty);

    let config = config
        .with_env_vars([("ROUTEFORGE_EXPORT_PATH".to_string(), "out.json".to_string())])
        .unwrap();
    assert_eq!(config.export_path, PathBuf::from("out.json"));
    assert_eq!(config.address, "0.0.0.0:9090");
}

#[test]
fn malformed_project_file_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routeforge.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ProjectConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("routeforge.json"));
}

#[tokio::test]
async fn export_writes_pretty_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docs").join("api.json");

    write_export(&catalog(), &path).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains('\n'));
    let export: JsonValue = serde_json::from_str(&contents).unwrap();
    assert_eq!(export["name"], "catalog");
    let endpoint = &export["versions"][0]["groups"][0]["routes"][0]["endpoints"][0];
    assert_eq!(endpoint["fullPath"], "/v3/products/{sku}");
    assert_eq!(
        endpoint["params"]["sku"],
        json!({
            "type": "string",
            "name": "sku",
            "description": "",
            "required": true,
            "min": 4,
            "max": 12
        })
    );
}

#[tokio::test]
async fn export_command_uses_configured_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("routeforge.json"),
        r#"{"exportPath": "site/api.json"}"#,
    )
    .unwrap();

    let cli = Cli {
        project_dir: dir.path().to_path_buf(),
        command: Some(Command::Export { out: None }),
    };
    cli.execute(catalog()).await.unwrap();

    assert!(dir.path().join("site").join("api.json").is_file());
}

#[tokio::test]
async fn check_command_fails_on_invalid_definitions() {
    let dir = TempDir::new().unwrap();
    let broken = Api::new(ApiOptions::new("broken", "Broken")).version(
        Version::new(1).group(Group::new(GroupOptions::new("things", "things"))),
    );

    let cli = Cli {
        project_dir: dir.path().to_path_buf(),
        command: Some(Command::Check),
    };
    let err = cli.execute(broken).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Group (things): The field \"path\" must be a valid path."
    );

    let cli = Cli {
        project_dir: dir.path().to_path_buf(),
        command: Some(Command::Check),
    };
    cli.execute(catalog()).await.unwrap();
}
