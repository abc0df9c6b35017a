//! Decorator configuration.
use std::str::FromStr;

use apollo_compiler::Name;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::error::DecoratorError;

/// Configuration of both decorator passes.
///
/// Every key is optional:
///
/// ```yaml
/// date_formatting:
///   enabled: true
///   scalar: DateTime
/// aggregates:
///   enabled: true
///   directive: injectAggregate
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DecoratorConfig {
    /// Date formatting of fields whose type ends in the date-time scalar
    #[serde(default)]
    pub date_formatting: DateFormattingConfig,

    /// Aggregate fields on connections marked with the aggregate directive
    #[serde(default)]
    pub aggregates: AggregatesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DateFormattingConfig {
    /// Enabled by default
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Name of the date-time scalar
    /// Defaults to `DateTime`
    #[serde(default = "default_date_time_scalar")]
    pub scalar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AggregatesConfig {
    /// Enabled by default
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Name of the directive marking connections
    /// Defaults to `injectAggregate`
    #[serde(default = "default_inject_aggregate_directive")]
    pub directive: String,
}

fn default_enabled() -> bool {
    true
}

fn default_date_time_scalar() -> String {
    crate::date_format::DEFAULT_DATE_TIME_SCALAR.to_string()
}

fn default_inject_aggregate_directive() -> String {
    crate::aggregate::DEFAULT_INJECT_AGGREGATE_DIRECTIVE.to_string()
}

impl Default for DateFormattingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            scalar: default_date_time_scalar(),
        }
    }
}

impl Default for AggregatesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            directive: default_inject_aggregate_directive(),
        }
    }
}

impl DateFormattingConfig {
    pub fn scalar_name(&self) -> Result<Name, DecoratorError> {
        config_name("date_formatting.scalar", &self.scalar)
    }
}

impl AggregatesConfig {
    pub fn directive_name(&self) -> Result<Name, DecoratorError> {
        config_name("aggregates.directive", &self.directive)
    }
}

impl DecoratorConfig {
    /// Parses YAML configuration and checks the names it contains.
    pub fn from_yaml(yaml: &str) -> Result<Self, DecoratorError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|error| DecoratorError::InvalidConfiguration {
                message: error.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DecoratorError> {
        self.date_formatting.scalar_name()?;
        self.aggregates.directive_name()?;
        Ok(())
    }

    /// The JSON schema of the configuration, for editor support.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(Self)
    }
}

impl FromStr for DecoratorConfig {
    type Err = DecoratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml(s)
    }
}

fn config_name(key: &str, value: &str) -> Result<Name, DecoratorError> {
    Name::new(value).map_err(|error| DecoratorError::InvalidConfiguration {
        message: format!("{key}: {error}"),
    })
}
