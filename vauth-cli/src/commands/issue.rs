use std::io::Write;

use vauth_token::{AccessToken, ClaimSet, ExternalLoginInfo, TokenEngine};

use super::CommandResult;

/// Sign a token carrying `claims`, in argument order.
///
/// Repeated keys keep their first value. `minutes` falls back to the
/// policy's default lifetime.
pub fn run(
    engine: &TokenEngine,
    claims: Vec<(String, String)>,
    minutes: Option<u32>,
    out: &mut impl Write,
) -> CommandResult {
    let claims: ClaimSet = claims.into_iter().collect();
    let issued = match minutes {
        Some(minutes) => engine.create_access_token(&claims, minutes)?,
        None => engine.create_default_token(&claims)?,
    };
    print_token(&issued, out)
}

/// Sign the token an external assistant receives after account linking.
pub fn external_login(
    engine: &TokenEngine,
    email: &str,
    user_id: &str,
    out: &mut impl Write,
) -> CommandResult {
    let issued = engine.create_external_login_token(&ExternalLoginInfo::new(email, user_id))?;
    print_token(&issued, out)
}

fn print_token(issued: &AccessToken, out: &mut impl Write) -> CommandResult {
    writeln!(out, "{}", issued.token)?;
    writeln!(out, "expires_at: {}", issued.expires_at.to_rfc3339())?;
    Ok(())
}
