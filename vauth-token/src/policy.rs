use vauth_core::config::{ConfigValidationDetail, PropertyMeta};
use vauth_core::{ConfigError, ConfigProperties, VauthConfig};

use crate::error::TokenError;

/// Default lifetime for first-party tokens, in minutes.
pub const DEFAULT_LIFETIME_MINUTES: u32 = 60;

/// Default lifetime for tokens handed to external assistants, in minutes.
pub const DEFAULT_EXTERNAL_LIFETIME_MINUTES: u32 = 1440;

/// Token issuance and validation policy.
///
/// Built once at startup and shared read-only by every [`TokenEngine`]
/// call. The lifetime fields are defaults for callers; the engine itself
/// always takes an explicit lifetime.
///
/// [`TokenEngine`]: crate::TokenEngine
#[derive(Clone)]
pub struct TokenPolicy {
    /// Symmetric HS256 key material. Must be non-empty ASCII.
    pub signing_secret: String,

    /// Value written to and expected in the "iss" claim.
    pub issuer: String,

    /// Value written to and expected in the "aud" claim.
    pub audience: String,

    /// Base address of the external identity provider. Only consumed by the
    /// HTTP auth integration; the engine never reads it.
    pub authority: String,

    pub default_lifetime_minutes: u32,

    pub external_lifetime_minutes: u32,

    /// Reject tokens whose "iss" differs from `issuer`.
    pub validate_issuer: bool,

    /// Reject tokens whose "aud" does not contain `audience`.
    pub validate_audience: bool,

    /// Reject tokens outside their `nbf`..`exp` window.
    pub validate_lifetime: bool,

    /// Require the signature to verify against `signing_secret`. With a
    /// single shared HS256 key the engine verifies every signature this way,
    /// so turning the switch off never admits unsigned or foreign tokens.
    pub validate_signing_key: bool,
}

impl TokenPolicy {
    /// Create a policy with every check enabled and default lifetimes.
    pub fn new(
        signing_secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            authority: String::new(),
            default_lifetime_minutes: DEFAULT_LIFETIME_MINUTES,
            external_lifetime_minutes: DEFAULT_EXTERNAL_LIFETIME_MINUTES,
            validate_issuer: true,
            validate_audience: true,
            validate_lifetime: true,
            validate_signing_key: true,
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Set the default and external lifetimes, in minutes.
    pub fn with_lifetimes(mut self, default_minutes: u32, external_minutes: u32) -> Self {
        self.default_lifetime_minutes = default_minutes;
        self.external_lifetime_minutes = external_minutes;
        self
    }

    pub fn with_validate_issuer(mut self, enabled: bool) -> Self {
        self.validate_issuer = enabled;
        self
    }

    pub fn with_validate_audience(mut self, enabled: bool) -> Self {
        self.validate_audience = enabled;
        self
    }

    pub fn with_validate_lifetime(mut self, enabled: bool) -> Self {
        self.validate_lifetime = enabled;
        self
    }

    pub fn with_validate_signing_key(mut self, enabled: bool) -> Self {
        self.validate_signing_key = enabled;
        self
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidPolicy` when the signing secret is empty or
    /// contains non-ASCII characters.
    pub fn check(&self) -> Result<(), TokenError> {
        secret_problem(&self.signing_secret)
            .map_or(Ok(()), |msg| Err(TokenError::InvalidPolicy(msg.to_string())))
    }
}

fn secret_problem(secret: &str) -> Option<&'static str> {
    if secret.is_empty() {
        Some("signing secret must not be empty")
    } else if !secret.is_ascii() {
        Some("signing secret must be ASCII")
    } else {
        None
    }
}

impl std::fmt::Debug for TokenPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPolicy")
            .field("signing_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("authority", &self.authority)
            .field("default_lifetime_minutes", &self.default_lifetime_minutes)
            .field("external_lifetime_minutes", &self.external_lifetime_minutes)
            .field("validate_issuer", &self.validate_issuer)
            .field("validate_audience", &self.validate_audience)
            .field("validate_lifetime", &self.validate_lifetime)
            .field("validate_signing_key", &self.validate_signing_key)
            .finish()
    }
}

const PREFIX: &str = "jwt_token";

fn key(name: &str) -> String {
    format!("{PREFIX}.{name}")
}

/// Binds the `jwt_token` configuration section:
///
/// ```yaml
/// jwt_token:
///   issuer_security_key: "${file:/run/secrets/jwt_key}"
///   issuer: "voice-assistants"
///   audience: "voice-assistants-clients"
///   authority: "https://login.example.com"
///   lifetime: 60
///   lifetime_external: 1440
///   validate_issuer: true
///   validate_audience: true
///   validate_lifetime: true
///   validate_issuer_signing_key: true
/// ```
impl ConfigProperties for TokenPolicy {
    fn prefix() -> &'static str {
        PREFIX
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![
            PropertyMeta::required(PREFIX, "issuer_security_key", "String")
                .with_description("HS256 signing secret (ASCII)"),
            PropertyMeta::required(PREFIX, "issuer", "String"),
            PropertyMeta::required(PREFIX, "audience", "String"),
            PropertyMeta::optional(PREFIX, "authority", "String", ""),
            PropertyMeta::optional(PREFIX, "lifetime", "u32", DEFAULT_LIFETIME_MINUTES)
                .with_description("Default token lifetime in minutes"),
            PropertyMeta::optional(
                PREFIX,
                "lifetime_external",
                "u32",
                DEFAULT_EXTERNAL_LIFETIME_MINUTES,
            )
            .with_description("External-login token lifetime in minutes"),
            PropertyMeta::optional(PREFIX, "validate_issuer", "bool", true),
            PropertyMeta::optional(PREFIX, "validate_audience", "bool", true),
            PropertyMeta::optional(PREFIX, "validate_lifetime", "bool", true),
            PropertyMeta::optional(PREFIX, "validate_issuer_signing_key", "bool", true),
        ]
    }

    fn from_config(config: &VauthConfig) -> Result<Self, ConfigError> {
        let signing_secret: String = config.get(&key("issuer_security_key"))?;
        if let Some(msg) = secret_problem(&signing_secret) {
            return Err(ConfigError::Validation(vec![ConfigValidationDetail {
                key: key("issuer_security_key"),
                message: msg.to_string(),
            }]));
        }

        Ok(Self {
            signing_secret,
            issuer: config.get(&key("issuer"))?,
            audience: config.get(&key("audience"))?,
            authority: config
                .get_optional::<String>(&key("authority"))?
                .unwrap_or_default(),
            default_lifetime_minutes: optional(config, "lifetime", DEFAULT_LIFETIME_MINUTES)?,
            external_lifetime_minutes: optional(
                config,
                "lifetime_external",
                DEFAULT_EXTERNAL_LIFETIME_MINUTES,
            )?,
            validate_issuer: optional(config, "validate_issuer", true)?,
            validate_audience: optional(config, "validate_audience", true)?,
            validate_lifetime: optional(config, "validate_lifetime", true)?,
            validate_signing_key: optional(config, "validate_issuer_signing_key", true)?,
        })
    }
}

/// Read an optional key: absent or null falls back to `default`, a present
/// value of the wrong type is an error.
fn optional<V>(config: &VauthConfig, name: &str, default: V) -> Result<V, ConfigError>
where
    V: vauth_core::FromConfigValue,
{
    Ok(config.get_optional(&key(name))?.unwrap_or(default))
}
