//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Settings derived from environment variables, configuration files, and CLI
/// flags.
///
/// AWS credentials themselves come from the SDK's ambient configuration
/// chain; only the knobs the SDK cannot guess live here.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "SNAPKEEP")]
pub struct SnapkeepConfig {
    /// Region override for all API calls. When unset, the ambient AWS
    /// configuration chain (environment, profile, instance metadata)
    /// decides.
    pub region: Option<String>,
    /// Execution role ARN handed to Data Lifecycle Manager policies.
    /// Required only when creating lifecycle policies.
    pub dlm_role_arn: Option<String>,
    /// Description applied to created resources when the caller supplies
    /// none.
    #[ortho_config(default = "managed by snapkeep".to_owned())]
    pub default_description: String,
}

impl SnapkeepConfig {
    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("snapkeep")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages include guidance on how
    /// to provide missing values via environment variables or configuration
    /// files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a configured field is
    /// blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::forbid_blank("region", self.region.as_deref(), "SNAPKEEP_REGION")?;
        Self::forbid_blank(
            "dlm_role_arn",
            self.dlm_role_arn.as_deref(),
            "SNAPKEEP_DLM_ROLE_ARN",
        )?;
        if self.default_description.trim().is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "default_description must not be blank: set SNAPKEEP_DEFAULT_DESCRIPTION \
                 or add default_description to snapkeep.toml",
            )));
        }
        Ok(())
    }

    fn forbid_blank(
        key: &str,
        value: Option<&str>,
        env_var: &str,
    ) -> Result<(), ConfigError> {
        if value.is_some_and(|set| set.trim().is_empty()) {
            return Err(ConfigError::MissingField(format!(
                "{key} is set but blank: provide a value via {env_var} or remove \
                 {key} from snapkeep.toml"
            )));
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a configured field is empty where a value is required.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
