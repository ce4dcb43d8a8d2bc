use super::typed::ConfigProperties;
use super::{ConfigError, VauthConfig};

/// A single missing or unusable config key.
#[derive(Debug)]
pub struct MissingKeyError {
    /// Section prefix that requires this key.
    pub source: String,
    pub key: String,
    pub expected_type: String,
    /// Environment variable that would supply the key.
    pub env_hint: String,
    pub description: Option<String>,
}

impl std::fmt::Display for MissingKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}`: key '{}' ({}), set env var `{}`",
            self.source, self.key, self.expected_type, self.env_hint
        )?;
        if let Some(desc) = &self.description {
            write!(f, " -- {desc}")?;
        }
        Ok(())
    }
}

/// Validate a `ConfigProperties` section against a `VauthConfig`.
///
/// Reports every required key that is absent. When none are missing, the
/// section is built once so type mismatches and constraint violations show
/// up in the same report.
pub fn validate_section<C: ConfigProperties>(config: &VauthConfig) -> Vec<MissingKeyError> {
    let prefix = C::prefix();

    let mut errors: Vec<MissingKeyError> = C::properties_metadata()
        .into_iter()
        .filter(|prop| prop.required && !config.contains_key(&prop.full_key))
        .map(|prop| MissingKeyError {
            source: prefix.to_string(),
            env_hint: prop.env_var(),
            key: prop.full_key,
            expected_type: prop.type_name.to_string(),
            description: prop.description,
        })
        .collect();

    if !errors.is_empty() {
        return errors;
    }

    match C::from_config(config) {
        Ok(_) => {}
        Err(ConfigError::TypeMismatch { key, expected }) => errors.push(MissingKeyError {
            source: prefix.to_string(),
            env_hint: key.to_uppercase().replace('.', "_"),
            key,
            expected_type: expected.to_string(),
            description: Some(format!("type mismatch: expected {expected}")),
        }),
        Err(ConfigError::Validation(details)) => {
            errors.extend(details.into_iter().map(|detail| MissingKeyError {
                source: prefix.to_string(),
                env_hint: detail.key.to_uppercase().replace('.', "_"),
                key: detail.key,
                expected_type: "valid".to_string(),
                description: Some(detail.message),
            }));
        }
        Err(ConfigError::NotFound(key)) => errors.push(MissingKeyError {
            source: prefix.to_string(),
            env_hint: key.to_uppercase().replace('.', "_"),
            key,
            expected_type: "unknown".to_string(),
            description: None,
        }),
        Err(ConfigError::Load(_)) => {}
    }

    errors
}
