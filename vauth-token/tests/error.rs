use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use vauth_token::TokenError;

#[test]
fn display_messages() {
    assert_eq!(
        TokenError::InvalidToken("signature mismatch".into()).to_string(),
        "Invalid token: signature mismatch"
    );
    assert_eq!(TokenError::TokenExpired.to_string(), "Token expired");
    assert_eq!(
        TokenError::MissingRequiredClaim("email").to_string(),
        "Missing required claim: email"
    );
}

#[test]
fn rejections_share_one_public_message() {
    let rejections = [
        TokenError::InvalidToken("bad issuer".into()),
        TokenError::MalformedToken("two segments".into()),
        TokenError::TokenExpired,
        TokenError::MissingRequiredClaim("name-identifier"),
    ];
    for err in &rejections {
        assert!(err.is_unauthorized(), "{err}");
        assert_eq!(err.public_message(), "Unauthorized");
    }
}

#[test]
fn server_side_failures_are_not_unauthorized() {
    for err in [
        TokenError::Encoding("boom".into()),
        TokenError::InvalidPolicy("empty secret".into()),
        TokenError::Internal("task panicked".into()),
    ] {
        assert!(!err.is_unauthorized());
        assert_eq!(err.public_message(), "Internal Server Error");
    }
}

#[test]
fn maps_jsonwebtoken_errors() {
    let expired: TokenError = JwtError::from(ErrorKind::ExpiredSignature).into();
    assert_eq!(expired, TokenError::TokenExpired);

    let signature: TokenError = JwtError::from(ErrorKind::InvalidSignature).into();
    assert_eq!(signature, TokenError::InvalidToken("signature mismatch".into()));

    let audience: TokenError = JwtError::from(ErrorKind::InvalidAudience).into();
    assert_eq!(audience, TokenError::InvalidToken("invalid audience".into()));

    let missing: TokenError = JwtError::from(ErrorKind::MissingRequiredClaim("iss".into())).into();
    assert_eq!(
        missing,
        TokenError::InvalidToken("missing required claim 'iss'".into())
    );
}

#[test]
fn is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    assert_error(&TokenError::TokenExpired);
}
