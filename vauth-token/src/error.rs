/// Errors produced by the token engine.
///
/// Only [`TokenEngine::claims`](crate::TokenEngine::claims) and token
/// creation hand these to callers. `validate` and `external_login_info`
/// collapse every variant into `false` / `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token parsed but failed signature or policy checks.
    InvalidToken(String),

    /// The input is not a compact JWS (three segments, JSON header and payload).
    MalformedToken(String),

    /// The token's "exp" is at or before the current instant.
    TokenExpired,

    /// A validated token lacks a claim the operation needs.
    MissingRequiredClaim(&'static str),

    /// Serialising or signing the token failed.
    Encoding(String),

    /// The policy cannot be used to sign or verify tokens.
    InvalidPolicy(String),

    /// A background task running an engine operation failed.
    Internal(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::InvalidToken(msg) => write!(f, "Invalid token: {msg}"),
            TokenError::MalformedToken(msg) => write!(f, "Malformed token: {msg}"),
            TokenError::TokenExpired => write!(f, "Token expired"),
            TokenError::MissingRequiredClaim(claim) => {
                write!(f, "Missing required claim: {claim}")
            }
            TokenError::Encoding(msg) => write!(f, "Token encoding error: {msg}"),
            TokenError::InvalidPolicy(msg) => write!(f, "Invalid token policy: {msg}"),
            TokenError::Internal(msg) => write!(f, "Internal token engine error: {msg}"),
        }
    }
}

impl std::error::Error for TokenError {}

impl TokenError {
    /// Whether the error means "the caller is not authenticated".
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            TokenError::InvalidToken(_)
                | TokenError::MalformedToken(_)
                | TokenError::TokenExpired
                | TokenError::MissingRequiredClaim(_)
        )
    }

    /// Message safe to return to an unauthenticated caller.
    ///
    /// Every rejection reads the same so responses cannot be used to probe
    /// which check a forged token tripped.
    pub fn public_message(&self) -> &'static str {
        if self.is_unauthorized() {
            "Unauthorized"
        } else {
            "Internal Server Error"
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::InvalidSignature => TokenError::InvalidToken("signature mismatch".into()),
            ErrorKind::InvalidIssuer => TokenError::InvalidToken("invalid issuer".into()),
            ErrorKind::InvalidAudience => TokenError::InvalidToken("invalid audience".into()),
            ErrorKind::InvalidAlgorithm => TokenError::InvalidToken("algorithm not allowed".into()),
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenError::InvalidToken(format!("missing required claim '{claim}'"))
            }
            _ => TokenError::InvalidToken(err.to_string()),
        }
    }
}
