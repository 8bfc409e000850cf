//! Configuration management.

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Result;
use crate::rbac::PolicyRegistry;
use crate::telemetry::LoggingConfig;

/// Environment variable prefix, e.g. `SAAS_AUTH__POLICY__FILE`.
pub const ENV_PREFIX: &str = "SAAS_AUTH";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Policy source
    #[serde(default)]
    pub policy: PolicySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicySettings {
    /// TOML policy document replacing the built-in policy table
    pub file: Option<PathBuf>,
}

impl Settings {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Load from a specific file path, with environment variables on top.
    pub fn from_file(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// The policy table these settings select.
    pub fn registry(&self) -> Result<PolicyRegistry> {
        match &self.policy.file {
            Some(path) => PolicyRegistry::load(path),
            None => Ok(PolicyRegistry::standard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::Role;
    use crate::telemetry::LogFormat;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"
            format = "json"

            [policy]
            file = "/etc/saas-auth/policy.toml"
            "#
        )
        .unwrap();

        let settings = Settings::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(
            settings.policy.file,
            Some(PathBuf::from("/etc/saas-auth/policy.toml"))
        );
    }

    #[test]
    fn test_default_registry_is_standard() {
        let registry = Settings::default().registry().unwrap();
        assert_eq!(registry.policy(Role::Admin).len(), 3);
    }

    #[test]
    fn test_missing_policy_file() {
        let settings = Settings {
            policy: PolicySettings {
                file: Some(PathBuf::from("/nonexistent/policy.toml")),
            },
            ..Default::default()
        };
        let err = settings.registry().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::IoError);
    }
}
