use serde::{Deserialize, Serialize};

use crate::claims::{Claim, ClaimSet, EMAIL_CLAIM, NAME_IDENTIFIER_CLAIM};
use crate::error::TokenError;

/// Minimal identity derived from a validated token: who the external
/// assistant is acting for.
///
/// Never stored; rebuilt from the token on every call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLoginInfo {
    pub email: String,
    pub user_id: String,
}

impl ExternalLoginInfo {
    pub fn new(email: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            user_id: user_id.into(),
        }
    }

    /// Build from claims read back from a token.
    ///
    /// Only the first `email` and `name-identifier` claims are looked at;
    /// everything else is ignored.
    ///
    /// # Errors
    ///
    /// `TokenError::MissingRequiredClaim` naming the first absent claim.
    pub fn from_claims(claims: &[Claim]) -> Result<Self, TokenError> {
        let find = |name: &'static str| {
            claims
                .iter()
                .find(|c| c.key == name)
                .map(|c| c.value.clone())
                .ok_or(TokenError::MissingRequiredClaim(name))
        };

        Ok(Self {
            email: find(EMAIL_CLAIM)?,
            user_id: find(NAME_IDENTIFIER_CLAIM)?,
        })
    }

    /// The claim set an external-login token carries.
    pub fn to_claims(&self) -> ClaimSet {
        ClaimSet::new()
            .with(EMAIL_CLAIM, &self.email)
            .with(NAME_IDENTIFIER_CLAIM, &self.user_id)
    }
}
