//! Configuration loading and startup wiring tests

use crate::common::fixtures;
use ai_request_broker::config::Config;
use ai_request_broker::core::types::RequestKind;
use ai_request_broker::server::ServerBuilder;
use ai_request_broker::storage::BrokerStore;
use std::collections::HashMap;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const EXAMPLE: &str = include_str!("../../config/broker.yaml.example");

fn file_backed_config(dir: &TempDir) -> String {
    let db_path = dir.path().join("nested").join("broker.db");
    format!(
        r#"
storage:
  database:
    enabled: true
    url: "sqlite://{}?mode=rwc"
    max_connections: 1
providers:
  - id: "primary"
    api_key: "sk-test"
    base_url: "http://127.0.0.1:9/v1"
    models: ["model-a"]
    priority: 10
routing_rules:
  - name: "analysis"
    priority: 1
    conditions:
      request_types: ["analysis"]
    target:
      provider_id: "primary"
      model: "model-a"
"#,
        db_path.display()
    )
}

#[test]
fn test_example_config_is_valid() {
    let mut config = Config::from_yaml_str(EXAMPLE).unwrap();
    let env: HashMap<&str, &str> = HashMap::from([("OPENAI_API_KEY", "sk-live")]);
    config.apply_overrides_from(|name| env.get(name).map(|v| v.to_string()));
    config.validate().unwrap();

    assert_eq!(config.providers.len(), 2);
    assert_eq!(config.providers[0].api_key, "sk-live");
    // Unset placeholders expand to nothing
    assert_eq!(config.providers[1].api_key, "");
    assert_eq!(config.routing_rules.len(), 2);
    assert_eq!(
        config.routing_rules[0].conditions.request_types,
        vec![RequestKind::Analysis]
    );
    assert_eq!(config.routing_rules[1].conditions.real_time, Some(true));
}

#[test]
fn test_overrides_from_lookup() {
    let mut config = Config::from_yaml_str(EXAMPLE).unwrap();
    let env: HashMap<&str, &str> = HashMap::from([
        ("BROKER_PORT", "9100"),
        ("DATABASE_URL", "postgresql://localhost/broker"),
        ("BROKER_CACHE_ENABLED", "false"),
        ("BROKER_LOG_LEVEL", "debug"),
    ]);
    config.apply_overrides_from(|name| env.get(name).map(|v| v.to_string()));

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.storage.database.url, "postgresql://localhost/broker");
    assert!(!config.broker.caching_enabled);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_invalid_settings_rejected() {
    let config = Config::from_yaml_str("broker:\n  max_retries: 50\n").unwrap();
    assert!(config.validate().is_err());

    assert!(Config::from_yaml_str("server: [not, a, map]").is_err());

    let config = Config::from_yaml_str("storage:\n  memory_retention: 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).await.unwrap();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.broker.max_retries, 3);

    assert!(Config::from_file("/nonexistent/broker.yaml").await.is_err());
}

#[tokio::test]
async fn test_startup_seeds_and_persists() {
    let dir = TempDir::new().unwrap();
    let yaml = file_backed_config(&dir);

    let config = Config::from_yaml_str(&yaml).unwrap();
    let state = ServerBuilder::new()
        .with_config(config)
        .build_state()
        .await
        .unwrap();
    assert!(dir.path().join("nested").join("broker.db").exists());
    assert_eq!(state.broker.registry().len(), 1);

    let rules = state.rules.list().await.unwrap();
    assert_eq!(rules.len(), 1);
    let rule_id = rules[0].id.clone();
    drop(state);

    // A restart re-seeds by name without duplicating rules
    let config = Config::from_yaml_str(&yaml).unwrap();
    let state = ServerBuilder::new()
        .with_config(config)
        .build_state()
        .await
        .unwrap();
    let rules = state.rules.list().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, rule_id);

    let providers = state.store.load_providers().await.unwrap();
    assert_eq!(providers.len(), 1);

    let decision = state
        .broker
        .router()
        .route(&fixtures::analysis("r1", "text"))
        .await
        .unwrap();
    assert_eq!(decision.rule_id.as_deref(), Some(rule_id.as_str()));
}
