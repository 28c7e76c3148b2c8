//! Configuration types for the CBS adapter.

use crate::error::CbsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Main configuration for the CBS adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CbsConfig {
    /// Config version
    pub version: String,

    /// CBS SOAP endpoint URL
    pub endpoint: String,

    /// Session entity embedded in every envelope
    pub credentials: Credentials,

    /// General settings
    pub settings: SettingsConfig,

    /// Subscriber template used by NewSubscriber
    pub new_subscriber: NewSubscriberConfig,
}

impl Default for CbsConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            endpoint: String::new(),
            credentials: Credentials::default(),
            settings: SettingsConfig::default(),
            new_subscriber: NewSubscriberConfig::default(),
        }
    }
}

impl CbsConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CbsError> {
        serde_yaml::from_str(yaml).map_err(|e| CbsError::Config(e.to_string()))
    }

    /// Read and parse a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CbsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check the values every envelope depends on.
    pub fn validate(&self) -> Result<(), CbsError> {
        if self.endpoint.trim().is_empty() {
            return Err(CbsError::Config("endpoint must be set".to_string()));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(CbsError::Config(format!(
                "endpoint must be an http(s) URL, got {}",
                self.endpoint
            )));
        }
        if self.credentials.name.is_empty() {
            return Err(CbsError::Config("credentials.name must be set".to_string()));
        }
        Ok(())
    }
}

/// Session credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Content-Type sent with every request
    pub content_type: String,

    /// Substring of ResultDesc that marks an overloaded backend
    pub busy_marker: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            content_type: "text/xml".to_string(),
            busy_marker: "system is busy".to_string(),
        }
    }
}

/// Fixed subscriber template for NewSubscriber requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSubscriberConfig {
    /// Language code
    pub lang: String,

    /// Paid mode code of the new subscriber
    pub paid_mode: String,

    /// Main offering of the new subscriber
    pub main_product_id: String,

    /// Prepended to the agent ID in the request remark
    pub remark_prefix: String,
}

impl Default for NewSubscriberConfig {
    fn default() -> Self {
        Self {
            lang: "1".to_string(),
            paid_mode: "0".to_string(),
            main_product_id: "2018254719".to_string(),
            remark_prefix: "Pool_recreation_".to_string(),
        }
    }
}
