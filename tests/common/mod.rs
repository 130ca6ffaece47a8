use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chatline::config::ServiceConfig;
use chatline::{ConversationStore, HttpChatService};
use tempfile::TempDir;

/// Service configuration pointing at a mock server.
#[allow(dead_code)]
pub fn service_config(base_url: &str, token: Option<&str>) -> ServiceConfig {
    ServiceConfig {
        base_url: base_url.to_string(),
        api_token: token.map(str::to_string),
        timeout_seconds: 5,
    }
}

#[allow(dead_code)]
pub fn http_service(base_url: &str) -> HttpChatService {
    HttpChatService::new(&service_config(base_url, Some("test-token")))
        .expect("failed to build http service")
}

#[allow(dead_code)]
pub fn http_store(base_url: &str) -> ConversationStore {
    ConversationStore::new(Arc::new(http_service(base_url)))
}

/// Render SSE frames for a sequence of JSON payloads.
#[allow(dead_code)]
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|p| format!("data: {}\n\n", p))
        .collect()
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
