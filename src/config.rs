// Runtime configuration - environment-driven settings for the HTTP transport

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{GraphError, GraphResult};

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v2.5";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub access_token: String,
    pub api_base: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl GraphConfig {
    pub fn from_env() -> GraphResult<Self> {
        let access_token = env::var("GRAPH_ACCESS_TOKEN")
            .map_err(|_| GraphError::Config("GRAPH_ACCESS_TOKEN is not set".to_string()))?;

        Ok(Self {
            access_token,
            api_base: env::var("GRAPH_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_version: env::var("GRAPH_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            timeout_secs: env::var("GRAPH_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Token-only construction with stock defaults for everything else.
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token_defaults() {
        let config = GraphConfig::with_token("abc123");
        assert_eq!(config.access_token, "abc123");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.timeout_secs, 30);
    }
}
