//! # vauth-core
//!
//! Runtime pieces shared by the vauth crates:
//!
//! - [`config`]: layered configuration (`application.yaml`, profile overrides,
//!   `.env` files, `${...}` secret placeholders, environment variables) and the
//!   [`ConfigProperties`] trait for typed sections.
//! - [`tracing_setup`]: global `tracing` subscriber installation.

pub mod config;
pub mod tracing_setup;

pub use config::{
    validate_section, ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver,
    FromConfigValue, MissingKeyError, PropertyMeta, SecretResolver, VauthConfig,
};
pub use tracing_setup::init_tracing;
