//! Test utilities shared by the unit and HTTP-level tests.

use axum_test::TestServer;
use serde_json::Value;

use crate::config::{Config, DatabaseConfig};
use crate::db::models::Fields;

/// Unwrap a JSON object literal into a field map.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        enable_docs: true,
        ..Default::default()
    }
}

/// An application backed by a fresh in-process store.
pub async fn create_test_app() -> TestServer {
    crate::Application::new(create_test_config())
        .await
        .expect("Failed to create application")
        .into_test_server()
}
