mod loader;
pub mod secrets;
pub mod typed;
pub mod validation;
pub mod value;

use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;

pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use typed::{ConfigProperties, PropertyMeta};
pub use validation::{validate_section, MissingKeyError};
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable selecting the active profile.
pub const PROFILE_ENV_VAR: &str = "VAUTH_PROFILE";

/// A single validation error detail from typed config construction.
#[derive(Debug, Clone)]
pub struct ConfigValidationDetail {
    pub key: String,
    pub message: String,
}

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
    /// Constraint violations reported while building a typed section.
    Validation(Vec<ConfigValidationDetail>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Validation(details) => {
                write!(f, "Config validation errors:")?;
                for detail in details {
                    write!(f, "\n  - {}: {}", detail.key, detail.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration loaded from YAML files, `.env` files, and environment variables.
///
/// `VauthConfig` (= `VauthConfig<()>`) provides raw key-value access only.
/// `VauthConfig<T>` adds typed access to a section via `Deref<Target = T>`.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml` (base)
/// 2. `application-{profile}.yaml` (profile override)
/// 3. `.env` file (loaded into process environment)
/// 4. `.env.{profile}` file (loaded into process environment)
/// 5. Environment variables (`JWT_TOKEN_ISSUER` overrides `jwt_token.issuer`)
///
/// `.env` files never overwrite already-set environment variables.
///
/// Profile is determined by: `VAUTH_PROFILE` env var > argument > default `"dev"`.
#[derive(Debug, Clone)]
pub struct VauthConfig<T = ()> {
    values: HashMap<String, ConfigValue>,
    profile: String,
    typed: T,
}

// ── Constructors — only on VauthConfig (= VauthConfig<()>) ─────────────

impl VauthConfig {
    /// Load configuration for the given profile from files in `dir`.
    ///
    /// Resolves `${...}` placeholders in string values with `resolver`,
    /// then overlays environment variables.
    pub fn load_from_dir(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let active_profile =
            std::env::var(PROFILE_ENV_VAR).unwrap_or_else(|_| profile.to_string());

        let mut values = HashMap::new();

        loader::load_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::load_yaml_file(
            &dir.join(format!("application-{active_profile}.yaml")),
            &mut values,
        )?;

        load_dotenv(&dir.join(".env"))?;
        load_dotenv(&dir.join(format!(".env.{active_profile}")))?;

        resolve_string_values(&mut values, resolver)?;
        overlay_env(&mut values, std::env::vars());

        tracing::debug!(
            profile = %active_profile,
            keys = values.len(),
            "Configuration loaded"
        );

        Ok(VauthConfig {
            values,
            profile: active_profile,
            typed: (),
        })
    }

    /// Load configuration for the given profile from the working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."), profile, &DefaultSecretResolver)
    }

    /// Create a config from a YAML string (useful for testing).
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(VauthConfig {
            values,
            profile: profile.to_string(),
            typed: (),
        })
    }

    /// Create an empty config (useful for testing).
    pub fn empty() -> Self {
        VauthConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
            typed: (),
        }
    }

    /// Set a value programmatically.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Upgrade to a typed config by constructing `C` from the raw values.
    ///
    /// ```ignore
    /// let config = VauthConfig::load("dev")?.with_typed::<TokenPolicy>()?;
    /// config.issuer  // typed field access via Deref
    /// ```
    pub fn with_typed<C: ConfigProperties>(self) -> Result<VauthConfig<C>, ConfigError> {
        let typed = C::from_config(&self)?;
        Ok(VauthConfig {
            values: self.values,
            profile: self.profile,
            typed,
        })
    }
}

// ── Methods available on all VauthConfig<T> ─────────────────────────────

impl<T> VauthConfig<T> {
    /// Get a typed value for the given dot-separated key (raw access).
    ///
    /// Keys containing underscores also match the dotted form produced by
    /// environment variables (`jwt_token.issuer` finds `jwt.token.issuer`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the key does not exist, or
    /// `ConfigError::TypeMismatch` if the value cannot be converted.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .lookup(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get an optional typed value.
    ///
    /// An absent key or a `null` value yields `Ok(None)`. A present value that
    /// cannot be converted is still a `ConfigError::TypeMismatch`.
    pub fn get_optional<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        match self.lookup(key) {
            None => Ok(None),
            Some(value) => Option::<V>::from_config_value(value, key),
        }
    }

    /// Get a typed value, returning a default if the key is missing.
    ///
    /// A present value of the wrong type still falls back to `default`.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Check whether a key exists in the config.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// The active profile name.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Get a reference to the typed config layer.
    pub fn typed(&self) -> &T {
        &self.typed
    }

    /// Consume the config and keep only the typed layer.
    pub fn into_typed(self) -> T {
        self.typed
    }

    fn lookup(&self, key: &str) -> Option<&ConfigValue> {
        self.values
            .get(key)
            .or_else(|| self.values.get(&normalize_key(key)))
    }
}

impl<T> Deref for VauthConfig<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.typed
    }
}

/// Load a `.env` file into the process environment.
///
/// A missing file is skipped; unreadable or malformed files are load errors.
fn load_dotenv(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    }
}

/// Environment-style normal form of a key: lowercase, `_` folded into `.`.
fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace('_', ".")
}

/// Overlay environment variables onto the loaded values.
///
/// `JWT_TOKEN_ISSUER` becomes `jwt.token.issuer` and also replaces any loaded
/// key with the same normal form (here `jwt_token.issuer`).
fn overlay_env(
    values: &mut HashMap<String, ConfigValue>,
    vars: impl IntoIterator<Item = (String, String)>,
) {
    let mut by_normal_form: HashMap<String, Vec<String>> = HashMap::new();
    for key in values.keys() {
        by_normal_form
            .entry(normalize_key(key))
            .or_default()
            .push(key.clone());
    }

    for (env_key, env_val) in vars {
        let config_key = normalize_key(&env_key);
        if let Some(existing) = by_normal_form.get(&config_key) {
            for key in existing {
                values.insert(key.clone(), ConfigValue::String(env_val.clone()));
            }
        }
        values.insert(config_key, ConfigValue::String(env_val));
    }
}

/// Resolve `${...}` placeholders in all string values of the config map.
fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    let keys: Vec<String> = values.keys().cloned().collect();
    for key in keys {
        if let Some(ConfigValue::String(s)) = values.get(&key) {
            if s.contains("${") {
                let resolved = secrets::resolve_placeholders(s, resolver)?;
                values.insert(key, ConfigValue::String(resolved));
            }
        }
    }
    Ok(())
}
