//! Provider module for Crisis Coach
//!
//! This module contains the completion client abstraction and the
//! BigModel chat-completions implementation.

pub mod base;
pub mod bigmodel;

pub use base::{ChatMessage, ChatRole, CompletionClient, CompletionRequest, CompletionResult};
pub use bigmodel::{BigModelClient, MISSING_API_KEY_MESSAGE};

use crate::config::ModelConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a shared completion client from model configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
///
/// # Examples
///
/// ```
/// use crisis_coach::config::ModelConfig;
/// use crisis_coach::providers::create_client;
///
/// let client = create_client(&ModelConfig::default()).unwrap();
/// assert!(!client.is_configured());
/// ```
pub fn create_client(config: &ModelConfig) -> Result<Arc<dyn CompletionClient>> {
    Ok(Arc::new(BigModelClient::new(config.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_uses_config() {
        let config = ModelConfig {
            api_key: Some("key".to_string()),
            name: "glm-4-flash".to_string(),
            ..Default::default()
        };
        let client = create_client(&config).unwrap();
        assert!(client.is_configured());
        assert_eq!(client.model_name(), "glm-4-flash");
    }
}
