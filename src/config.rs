use std::env;
use std::time::Duration;

pub const DEFAULT_FAL_BASE_URL: &str = "https://fal.run";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Credential and endpoint for one upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ProviderConfig {
            api_key: None,
            base_url: base_url.into(),
        }
    }

    pub fn fal() -> Self {
        Self::new(DEFAULT_FAL_BASE_URL)
    }

    pub fn openai() -> Self {
        Self::new(DEFAULT_OPENAI_BASE_URL)
    }

    pub fn fal_from_env() -> Self {
        Self::from_env("FAL_KEY", "FAL_BASE_URL", DEFAULT_FAL_BASE_URL)
    }

    pub fn openai_from_env() -> Self {
        Self::from_env("OPENAI_API_KEY", "OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
    }

    fn from_env(key_var: &str, url_var: &str, default_url: &str) -> Self {
        let api_key = env::var(key_var).ok();
        let base_url = env::var(url_var)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_url.to_string());

        ProviderConfig::new(base_url).with_optional_key(api_key)
    }

    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        self.with_optional_key(Some(api_key.into()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn with_optional_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Joins `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub fal: ProviderConfig,
    pub openai: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fal: ProviderConfig::fal(),
            openai: ProviderConfig::openai(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Config::default();
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Config {
            host,
            port,
            request_timeout,
            fal: ProviderConfig::fal_from_env(),
            openai: ProviderConfig::openai_from_env(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_fal(mut self, config: ProviderConfig) -> Self {
        self.fal = config;
        self
    }

    pub fn with_openai(mut self, config: ProviderConfig) -> Self {
        self.openai = config;
        self
    }

    pub fn has_any_provider(&self) -> bool {
        self.fal.is_configured() || self.openai.is_configured()
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
