use std::io::Write;

use colored::Colorize;
use vauth_token::TokenEngine;

use super::CommandResult;

/// Print `OK` or `REJECTED` for `token`. Returns whether it validated.
pub fn validate(engine: &TokenEngine, token: &str, out: &mut impl Write) -> CommandResult<bool> {
    let valid = engine.validate(token);
    if valid {
        writeln!(out, "{}", "OK".green())?;
    } else {
        writeln!(out, "{}", "REJECTED".red())?;
    }
    Ok(valid)
}

/// Print one `key: value` line per claim of a valid token.
///
/// A leading `Bearer ` is accepted. Unparseable input prints nothing.
pub fn claims(engine: &TokenEngine, token: &str, out: &mut impl Write) -> CommandResult {
    for claim in engine.claims(token)? {
        writeln!(out, "{}: {}", claim.key, claim.value)?;
    }
    Ok(())
}

/// Print the email and user id of an external-login token.
pub fn login_info(engine: &TokenEngine, token: &str, out: &mut impl Write) -> CommandResult<bool> {
    match engine.external_login_info(token) {
        Some(login) => {
            writeln!(out, "email: {}", login.email)?;
            writeln!(out, "user_id: {}", login.user_id)?;
            Ok(true)
        }
        None => {
            writeln!(out, "{}", "REJECTED".red())?;
            Ok(false)
        }
    }
}
