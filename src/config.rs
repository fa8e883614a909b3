//! Client configuration.
//!
//! Built with [`ClientConfig::default`] and the builder methods, or read from
//! the environment with [`ClientConfig::from_env`]:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `KAFKA_CLIENT_ID` | client id sent in request headers | `kafkaesque-admin` |
//! | `KAFKA_REQUEST_TIMEOUT_MS` | per-request timeout | `30000` |
//! | `KAFKA_MAX_VERSION_DESCRIBE_ACLS` | version cap for DescribeAcls | none |
//! | `KAFKA_MAX_VERSION_CREATE_ACLS` | version cap for CreateAcls | none |
//! | `KAFKA_MAX_VERSION_DELETE_ACLS` | version cap for DeleteAcls | none |

use std::collections::HashMap;
use std::time::Duration;

use crate::constants::{DEFAULT_CLIENT_ID, DEFAULT_REQUEST_TIMEOUT};
use crate::error::{Error, Result};
use crate::protocol::ApiKey;
use crate::protocol::versions::{SUPPORTED_VERSIONS, find_version};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Sent as `client_id` in every request header.
    pub client_id: String,
    /// Upper bound on one request round trip, negotiation included.
    pub request_timeout: Duration,
    /// Per-API caps on the negotiated version.
    pub max_versions: HashMap<ApiKey, i16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_versions: HashMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_version(mut self, api_key: ApiKey, version: i16) -> Self {
        self.max_versions.insert(api_key, version);
        self
    }

    pub fn max_version(&self, api_key: ApiKey) -> Option<i16> {
        self.max_versions.get(&api_key).copied()
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let client_id = std::env::var("KAFKA_CLIENT_ID").unwrap_or(defaults.client_id);

        let request_timeout = match std::env::var("KAFKA_REQUEST_TIMEOUT_MS") {
            Ok(v) => Duration::from_millis(v.parse().map_err(|e| {
                Error::Config(format!("Invalid KAFKA_REQUEST_TIMEOUT_MS: {}", e))
            })?),
            Err(_) => defaults.request_timeout,
        };

        let mut max_versions = HashMap::new();
        for supported in SUPPORTED_VERSIONS {
            let var = max_version_var(supported.api_key);
            if let Ok(v) = std::env::var(&var) {
                let version: i16 = v
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid {}: {}", var, e)))?;
                max_versions.insert(supported.api_key, version);
            }
        }

        let config = Self {
            client_id,
            request_timeout,
            max_versions,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::Config("client_id must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request_timeout must be non-zero".to_string()));
        }
        for (api_key, version) in &self.max_versions {
            let Some(supported) = find_version(*api_key) else {
                return Err(Error::Config(format!(
                    "max version set for unsupported api {}",
                    api_key.as_str()
                )));
            };
            if *version < supported.min_version {
                return Err(Error::Config(format!(
                    "max version for {} must be at least {}, got {}",
                    api_key.as_str(),
                    supported.min_version,
                    version
                )));
            }
        }
        Ok(())
    }
}

/// `DescribeAcls` -> `KAFKA_MAX_VERSION_DESCRIBE_ACLS`
fn max_version_var(api_key: ApiKey) -> String {
    let mut name = String::from("KAFKA_MAX_VERSION_");
    for (i, c) in api_key.as_str().chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            name.push('_');
        }
        name.push(c.to_ascii_uppercase());
    }
    name
}
