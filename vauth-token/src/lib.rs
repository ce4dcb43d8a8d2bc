//! # vauth-token
//!
//! Issues and validates the HS256-signed bearer tokens that authenticate
//! callers of the voice-assistant backend.
//!
//! A [`TokenPolicy`] is built once (usually from the `jwt_token` config
//! section) and handed to a [`TokenEngine`], which exposes four operations:
//!
//! | Operation | Failure surface |
//! |-----------|-----------------|
//! | [`TokenEngine::create_access_token`] | `Result` (encoding, reserved claim names) |
//! | [`TokenEngine::validate`] | `bool`, every failure is `false` |
//! | [`TokenEngine::claims`] | `InvalidToken` error; unparseable input gives no claims |
//! | [`TokenEngine::external_login_info`] | `Option`, `None` on any failure |

pub mod bearer;
pub mod claims;
pub mod clock;
pub mod engine;
pub mod error;
pub mod identity;
pub mod policy;

pub use claims::{AccessToken, Claim, ClaimSet, EMAIL_CLAIM, NAME_IDENTIFIER_CLAIM};
pub use clock::{Clock, SystemClock};
pub use engine::TokenEngine;
pub use error::TokenError;
pub use identity::ExternalLoginInfo;
pub use policy::TokenPolicy;

pub mod prelude {
    //! Re-exports of the most commonly used token types.
    pub use crate::{AccessToken, ClaimSet, ExternalLoginInfo, TokenEngine, TokenError, TokenPolicy};
}
