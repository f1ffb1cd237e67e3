//! Layered configuration (code > env).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// API keys and base-URL overrides, keyed by vendor name.
#[derive(Debug, Clone, Default)]
pub struct RivuletConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl RivuletConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let config = Self::new();

        let env_mappings = [
            ("OPENAI_API_KEY", "openai"),
            ("ANTHROPIC_API_KEY", "anthropic"),
            ("GOOGLE_API_KEY", "gemini"),
            ("GEMINI_API_KEY", "gemini"),
            ("DEEPSEEK_API_KEY", "deepseek"),
            ("AWS_BEARER_TOKEN_BEDROCK", "bedrock"),
        ];
        for (env_var, vendor) in &env_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(vendor, key);
            }
        }

        let url_mappings = [
            ("OPENAI_BASE_URL", "openai"),
            ("ANTHROPIC_BASE_URL", "anthropic"),
            ("GEMINI_BASE_URL", "gemini"),
            ("DEEPSEEK_BASE_URL", "deepseek"),
            ("BEDROCK_BASE_URL", "bedrock"),
        ];
        for (env_var, vendor) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(vendor, url);
            }
        }

        config
    }

    pub fn set_api_key(&self, vendor: &str, key: String) {
        self.api_keys
            .write()
            .unwrap()
            .insert(vendor.to_string(), key);
    }

    pub fn get_api_key(&self, vendor: &str) -> Option<String> {
        self.api_keys.read().unwrap().get(vendor).cloned()
    }

    pub fn set_base_url(&self, vendor: &str, url: String) {
        self.base_urls
            .write()
            .unwrap()
            .insert(vendor.to_string(), url);
    }

    pub fn get_base_url(&self, vendor: &str) -> Option<String> {
        self.base_urls.read().unwrap().get(vendor).cloned()
    }

    pub fn has_credentials(&self, vendor: &str) -> bool {
        self.get_api_key(vendor).is_some()
    }
}
