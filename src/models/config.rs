//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    crate::DEFAULT_PAGE_SIZE
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for talking to the customer endpoint.
pub struct ClientConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api/v1`.
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            default_page_size: default_page_size(),
            auth_token: None,
            user_name: None,
        }
    }
}

/// Loads `{dir}/default.yaml`, then `{dir}/{app_env}.yaml` when present, then
/// `APP_*` environment variables.
#[cfg(feature = "cli")]
pub fn load(dir: &std::path::Path, app_env: &str) -> Result<ClientConfig, config::ConfigError> {
    use config::{Config, Environment, File};

    let base = dir.join("default");
    let overrides = dir.join(app_env);

    Config::builder()
        .add_source(File::with_name(&base.to_string_lossy()))
        .add_source(File::with_name(&overrides.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ClientConfig>()
}
