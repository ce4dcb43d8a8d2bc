use super::{ConfigError, VauthConfig};

/// Metadata about a single configuration property.
#[derive(Debug, Clone)]
pub struct PropertyMeta {
    /// Relative key (e.g., `"issuer"`).
    pub key: String,
    /// Absolute key (e.g., `"jwt_token.issuer"`).
    pub full_key: String,
    /// Rust type name (e.g., `"String"`).
    pub type_name: &'static str,
    /// Whether the property is required (no default).
    pub required: bool,
    /// Default value as a string, if any.
    pub default_value: Option<String>,
    pub description: Option<String>,
}

impl PropertyMeta {
    /// A property that must be present.
    pub fn required(prefix: &str, key: &str, type_name: &'static str) -> Self {
        Self {
            key: key.to_string(),
            full_key: format!("{prefix}.{key}"),
            type_name,
            required: true,
            default_value: None,
            description: None,
        }
    }

    /// A property that falls back to `default` when absent.
    pub fn optional(prefix: &str, key: &str, type_name: &'static str, default: impl ToString) -> Self {
        Self {
            default_value: Some(default.to_string()),
            required: false,
            ..Self::required(prefix, key, type_name)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Environment variable that overrides this property.
    pub fn env_var(&self) -> String {
        self.full_key.to_uppercase().replace('.', "_")
    }
}

/// Trait for strongly-typed configuration sections.
///
/// ```ignore
/// impl ConfigProperties for TokenPolicy {
///     fn prefix() -> &'static str { "jwt_token" }
///     fn properties_metadata() -> Vec<PropertyMeta> { ... }
///     fn from_config(config: &VauthConfig) -> Result<Self, ConfigError> { ... }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"jwt_token"`).
    fn prefix() -> &'static str;

    /// Metadata about all expected properties.
    fn properties_metadata() -> Vec<PropertyMeta>;

    /// Construct from a `VauthConfig` instance.
    fn from_config(config: &VauthConfig) -> Result<Self, ConfigError>;
}
