use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crisis_coach::config::ModelConfig;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Model config pointing at a mock server
#[allow(dead_code)]
pub fn model_config(base_url: &str, api_key: Option<&str>) -> ModelConfig {
    ModelConfig {
        api_key: api_key.map(str::to_string),
        name: "glm-test".to_string(),
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    }
}

/// Chat-completions response body with one choice
#[allow(dead_code)]
pub fn completion_body(content: &str, finish_reason: &str) -> Value {
    json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": finish_reason
        }]
    })
}

/// Four-message transcript in browser wire format
#[allow(dead_code)]
pub fn four_messages() -> Value {
    json!([
        {"role": "assistant", "content": "I don't know why I even called."},
        {"role": "user", "content": "I'm glad you did. What's been happening?"},
        {"role": "assistant", "content": "I lost my job and I can't stop thinking about ending it."},
        {"role": "user", "content": "Thank you for telling me. Are you thinking about suicide right now?"}
    ])
}
