//! Storefront configuration.
//!
//! Loaded from a TOML file, or JSON when the path ends in `.json`. Every
//! field has a default, so an empty file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use lucy_data::FetchClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`ApiConfig::base_url`].
pub const ENV_API_BASE_URL: &str = "STOREFRONT_API_BASE_URL";
/// Environment variable overriding [`PaymentConfig::public_key`].
pub const ENV_PAYMENT_PUBLIC_KEY: &str = "STOREFRONT_PAYSTACK_PUBLIC_KEY";
/// Environment variable overriding [`MessagingConfig::phone_number`].
pub const ENV_WHATSAPP_NUMBER: &str = "STOREFRONT_WHATSAPP_NUMBER";

/// Errors loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Top-level storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorefrontConfig {
    /// Name used in order messages.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// Prefix of order numbers and payment references.
    #[serde(default = "default_order_prefix")]
    pub order_prefix: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub messaging: MessagingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_store_name() -> String {
    "Lucy's Perfumery".to_string()
}

fn default_order_prefix() -> String {
    "LP".to_string()
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            store_name: default_store_name(),
            order_prefix: default_order_prefix(),
            api: ApiConfig::default(),
            payment: PaymentConfig::default(),
            messaging: MessagingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(key) = get(ENV_PAYMENT_PUBLIC_KEY) {
            self.payment.public_key = key;
        }
        if let Some(number) = get(ENV_WHATSAPP_NUMBER) {
            self.messaging.phone_number = number;
        }
        self
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Storefront API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// An HTTP client pointed at the API with JSON defaults.
    pub fn client(&self) -> FetchClient {
        FetchClient::new()
            .with_base_url(self.base_url.clone())
            .with_default_header("Content-Type", "application/json")
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Hosted payment settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentConfig {
    /// Public key handed to the payment popup.
    #[serde(default)]
    pub public_key: String,
}

/// Messaging deep-link settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagingConfig {
    #[serde(default = "default_messaging_base_url")]
    pub base_url: String,

    /// Business number in international format without `+`.
    #[serde(default)]
    pub phone_number: String,
}

fn default_messaging_base_url() -> String {
    "https://wa.me".to_string()
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: default_messaging_base_url(),
            phone_number: String::new(),
        }
    }
}

/// Durable storage slot names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory for file-backed slots. In-memory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    #[serde(default = "default_cart_key")]
    pub cart_key: String,

    #[serde(default = "default_last_order_key")]
    pub last_order_key: String,
}

fn default_cart_key() -> String {
    "cart-storage".to_string()
}

fn default_last_order_key() -> String {
    "lastOrder".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            cart_key: default_cart_key(),
            last_order_key: default_last_order_key(),
        }
    }
}

impl StorageConfig {
    /// Open the configured cache.
    pub fn open_cache(&self) -> Result<lucy_cache::Cache, lucy_cache::CacheError> {
        match &self.dir {
            Some(dir) => lucy_cache::Cache::open(dir),
            None => Ok(lucy_cache::Cache::in_memory()),
        }
    }
}
