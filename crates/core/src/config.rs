use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    /// Bin-service master key, sent as the X-Master-Key header.
    pub master_key: SecretString,
    /// Bin-service access key, sent as the X-Access-Key header.
    pub access_key: SecretString,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub bins: BinConfig,
}

/// Bin ids for each named document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BinConfig {
    pub users: String,
    pub notifications: String,
    pub funding_requests: String,
    pub withdrawal_requests: String,
    pub messages: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session token signing.
    pub jwt_secret: SecretString,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jsonbin.io/v3".to_string(),
            master_key: String::new().into(),
            access_key: String::new().into(),
            requests_per_minute: default_requests_per_minute(),
            timeout_secs: default_timeout_secs(),
            bins: BinConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new().into(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}
