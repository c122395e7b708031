use garde::Validate;
use serde::Deserialize;

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_addr")]
    #[garde(length(min = 1))]
    pub bind_addr: String,

    /// AES-256-GCM key for CSRF tokens (base64-encoded, 32 bytes).
    /// A per-process key is generated when unset.
    #[serde(default)]
    #[garde(skip)]
    pub csrf_secret: Option<String>,

    /// How long an issued CSRF token stays valid
    #[serde(default = "default_csrf_token_ttl_secs")]
    #[garde(range(min = 60, max = 86_400))]
    pub csrf_token_ttl_secs: u64,

    /// Turn off token checks, e.g. for scripted API clients in development
    #[serde(default = "default_csrf_enabled")]
    #[garde(skip)]
    pub csrf_enabled: bool,

    /// Largest accepted request body
    #[serde(default = "default_body_limit_bytes")]
    #[garde(range(min = 1024, max = 1_048_576))]
    pub body_limit_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_csrf_token_ttl_secs() -> u64 {
    3600
}

fn default_csrf_enabled() -> bool {
    true
}

fn default_body_limit_bytes() -> usize {
    64 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::checked(envy::from_env()?)
    }

    /// Load from explicit `(NAME, value)` pairs instead of the process
    /// environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::checked(envy::from_iter(vars)?)
    }

    fn checked(config: Self) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(garde::Report),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_vars(Vec::new()).expect("defaults are valid");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.csrf_secret, None);
        assert_eq!(config.csrf_token_ttl_secs, 3600);
        assert!(config.csrf_enabled);
        assert_eq!(config.body_limit_bytes, 65_536);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CSRF_ENABLED", "false"),
            ("CSRF_TOKEN_TTL_SECS", "120"),
        ]))
        .expect("valid");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(!config.csrf_enabled);
        assert_eq!(config.csrf_token_ttl_secs, 120);
    }

    #[test]
    fn rejects_out_of_range_ttl() {
        let result = AppConfig::from_vars(vars(&[("CSRF_TOKEN_TTL_SECS", "5")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unparsable_values() {
        let result = AppConfig::from_vars(vars(&[("BODY_LIMIT_BYTES", "lots")]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
