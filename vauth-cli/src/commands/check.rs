use std::io::Write;
use std::path::Path;

use colored::Colorize;
use vauth_core::{validate_section, DefaultSecretResolver, VauthConfig};
use vauth_token::TokenPolicy;

use super::CommandResult;

/// Report every missing or unusable `jwt_token` key for `profile`.
///
/// Returns `true` when the section binds cleanly.
pub fn run(dir: &Path, profile: &str, out: &mut impl Write) -> CommandResult<bool> {
    let config = VauthConfig::load_from_dir(dir, profile, &DefaultSecretResolver)?;
    let problems = validate_section::<TokenPolicy>(&config);

    if problems.is_empty() {
        writeln!(
            out,
            "{} jwt_token section complete (profile '{}')",
            "✓".green(),
            config.profile()
        )?;
        return Ok(true);
    }

    for problem in &problems {
        writeln!(out, "{} {problem}", "✗".red())?;
    }
    writeln!(out, "{} problem(s) found", problems.len())?;
    Ok(false)
}
