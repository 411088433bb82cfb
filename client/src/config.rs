//! Client configuration

use std::path::PathBuf;

use derivative::Derivative;
use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

/// Patient ceiling assumed when the subscription snapshot does not carry one.
pub const DEFAULT_PATIENT_LIMIT: u32 = 50;

/// Logging output format
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Where the client keeps the stored credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Database {
    /// Credentials live in memory only; the session will not survive the
    /// process. Mostly useful for tests and throwaway runs.
    Memory,
    /// SQLite file storage
    SqLite { path: PathBuf },
}

impl Default for Database {
    fn default() -> Self {
        Self::SqLite {
            path: "nutriyess.db".into(),
        }
    }
}

/// REST API endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    #[serde(default = "Api::default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "Api::default_timeout")]
    pub timeout: u64,
}

impl Api {
    fn default_base_url() -> String {
        "https://nutriyessapp.up.railway.app/api".to_owned()
    }

    fn default_timeout() -> u64 {
        30
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout: Self::default_timeout(),
        }
    }
}

/// Fallback values used when the subscription snapshot is missing data.
///
/// Named here rather than inlined in the session store so tests can assert on
/// them and product can tune them without touching logic.
#[derive(Debug, Clone, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Limits {
    #[serde(default = "Limits::default_patient_limit")]
    #[derivative(Default(value = "DEFAULT_PATIENT_LIMIT"))]
    pub default_patient_limit: u32,
}

impl Limits {
    fn default_patient_limit() -> u32 {
        DEFAULT_PATIENT_LIMIT
    }
}

/// Top level client configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST API endpoint
    pub api: Api,

    /// Credential storage
    pub credentials: Database,

    /// Fallback limits
    pub limits: Limits,

    /// Logging configuration
    pub logging: Logging,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.api.base_url, "https://nutriyessapp.up.railway.app/api");
        assert_eq!(config.api.timeout, 30);
        assert_eq!(config.limits.default_patient_limit, DEFAULT_PATIENT_LIMIT);
        assert!(matches!(config.credentials, Database::SqLite { .. }));
    }

    #[test]
    fn sections_can_be_overridden() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:8000/api"

            [credentials]
            kind = "memory"

            [limits]
            default_patient_limit = 10

            [logging]
            filters = ["nutriyess=debug"]
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(matches!(config.credentials, Database::Memory));
        assert_eq!(config.limits.default_patient_limit, 10);
        assert_eq!(config.logging.filters.len(), 1);
    }
}
