pub mod check;
pub mod inspect;
pub mod issue;

use std::path::Path;

use vauth_core::{DefaultSecretResolver, VauthConfig};
use vauth_token::{TokenEngine, TokenPolicy};

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load the layered config from `dir` and build an engine from its
/// `jwt_token` section.
pub fn load_engine(dir: &Path, profile: &str) -> CommandResult<TokenEngine> {
    let policy = VauthConfig::load_from_dir(dir, profile, &DefaultSecretResolver)?
        .with_typed::<TokenPolicy>()?
        .into_typed();
    tracing::debug!(?policy, "Token policy loaded");
    Ok(TokenEngine::new(policy)?)
}

/// Parse a `key=value` claim argument. The value may itself contain `=`.
pub fn parse_claim(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid claim '{arg}', expected key=value")),
    }
}
