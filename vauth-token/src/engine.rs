use std::collections::HashSet;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::bearer::strip_bearer;
use crate::claims::{claims_from_payload, is_registered, AccessToken, Claim, ClaimSet};
use crate::clock::{Clock, SystemClock};
use crate::error::TokenError;
use crate::identity::ExternalLoginInfo;
use crate::policy::TokenPolicy;

/// The only signing algorithm the engine issues or accepts.
const ALGORITHM: Algorithm = Algorithm::HS256;

struct EngineInner {
    policy: TokenPolicy,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

/// Issues and checks HS256 bearer tokens under a fixed [`TokenPolicy`].
///
/// The engine is cheap to clone and safe to share across threads; every
/// operation reads only the immutable policy and its own arguments.
///
/// Failure reporting differs per operation:
///
/// - [`validate`](Self::validate) answers `true`/`false` and never says why.
/// - [`claims`](Self::claims) fails with [`TokenError::InvalidToken`] for a
///   token that parses but does not validate, and returns no claims for input
///   that is not a token at all.
/// - [`external_login_info`](Self::external_login_info) answers `None` for
///   every kind of failure.
///
/// # Example
///
/// ```ignore
/// let engine = TokenEngine::new(TokenPolicy::new(secret, "voice", "clients"))?;
///
/// let claims: ClaimSet = [("email", "a@b.com"), ("name-identifier", "42")].into();
/// let issued = engine.create_access_token(&claims, 30)?;
///
/// assert!(engine.validate(&issued.token));
/// let login = engine.external_login_info(&issued.token);
/// ```
#[derive(Clone)]
pub struct TokenEngine {
    inner: Arc<EngineInner>,
}

impl TokenEngine {
    /// Create an engine using the wall clock.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidPolicy` if the policy's secret is empty or not ASCII.
    pub fn new(policy: TokenPolicy) -> Result<Self, TokenError> {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create an engine that reads the current instant from `clock`.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidPolicy` if the policy's secret is empty or not ASCII.
    pub fn with_clock(policy: TokenPolicy, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        policy.check()?;

        let secret = policy.signing_secret.as_bytes();
        let inner = EngineInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: validation_for(&policy),
            policy,
            clock,
        };

        debug!(
            issuer = %inner.policy.issuer,
            audience = %inner.policy.audience,
            "Token engine ready"
        );
        if !inner.policy.validate_signing_key {
            debug!("Signing key check disabled; signatures are still verified with the configured secret");
        }
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the policy this engine enforces.
    pub fn policy(&self) -> &TokenPolicy {
        &self.inner.policy
    }

    /// Sign a new access token carrying `claims`.
    ///
    /// The payload holds the claims followed by `nbf` (now, whole seconds),
    /// `exp` (`nbf` + `expires_in_minutes`), `iss` and `aud` from the policy.
    /// Caller entries named `iss`, `aud`, `nbf` or `exp` are dropped in favour
    /// of the engine's values. A lifetime of zero yields a token that is
    /// already expired.
    ///
    /// # Errors
    ///
    /// `TokenError::Encoding` if signing fails.
    pub fn create_access_token(
        &self,
        claims: &ClaimSet,
        expires_in_minutes: u32,
    ) -> Result<AccessToken, TokenError> {
        let now = self.inner.clock.now();
        let not_before = DateTime::<Utc>::from_timestamp(now.timestamp(), 0)
            .ok_or_else(|| TokenError::Internal("clock out of range".into()))?;
        let expires_at = not_before + Duration::minutes(i64::from(expires_in_minutes));

        let policy = &self.inner.policy;
        let mut payload: Map<String, Value> = claims
            .entries()
            .iter()
            .filter(|(key, _)| !is_registered(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if payload.len() < claims.len() {
            debug!("Caller-supplied registered claims replaced by engine values");
        }
        payload.insert("nbf".into(), Value::from(not_before.timestamp()));
        payload.insert("exp".into(), Value::from(expires_at.timestamp()));
        payload.insert("iss".into(), Value::from(policy.issuer.as_str()));
        payload.insert("aud".into(), Value::from(policy.audience.as_str()));

        let token = encode(&Header::new(ALGORITHM), &payload, &self.inner.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        debug!(claims = claims.len(), %expires_at, "Access token issued");
        Ok(AccessToken { token, expires_at })
    }

    /// Sign a token using the policy's default lifetime.
    pub fn create_default_token(&self, claims: &ClaimSet) -> Result<AccessToken, TokenError> {
        self.create_access_token(claims, self.inner.policy.default_lifetime_minutes)
    }

    /// Sign the token handed to an external assistant after account linking.
    ///
    /// Carries only the `email` and `name-identifier` claims and lives for the
    /// policy's external lifetime.
    pub fn create_external_login_token(
        &self,
        login: &ExternalLoginInfo,
    ) -> Result<AccessToken, TokenError> {
        self.create_access_token(&login.to_claims(), self.inner.policy.external_lifetime_minutes)
    }

    /// Whether `token` is authentic and passes every check the policy enables.
    ///
    /// Any failure, whether unparseable input, a bad signature or a failed
    /// check, yields `false`. The reason is only logged.
    pub fn validate(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => {
                debug!("Token validated");
                true
            }
            Err(err) if is_routine_rejection(&err) => {
                debug!(error = %err, "Token rejected");
                false
            }
            Err(err) => {
                warn!(error = %err, "Token rejected");
                false
            }
        }
    }

    /// Caller-supplied claims of a valid token, in payload order.
    ///
    /// A leading `Bearer ` scheme is stripped first. The standard `iss`,
    /// `aud`, `nbf` and `exp` fields are not included.
    ///
    /// Input that is not a structured token at all yields an empty list.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidToken` if the token parses but fails signature or
    /// policy checks.
    pub fn claims(&self, token: &str) -> Result<Vec<Claim>, TokenError> {
        match self.verify(strip_bearer(token)) {
            Ok(payload) => Ok(claims_from_payload(&payload)),
            Err(TokenError::MalformedToken(reason)) => {
                debug!(%reason, "Unparseable token carries no claims");
                Ok(Vec::new())
            }
            Err(TokenError::InvalidToken(reason)) => Err(TokenError::InvalidToken(reason)),
            Err(other) => Err(TokenError::InvalidToken(other.to_string())),
        }
    }

    /// Email and user id of the caller a valid token was issued for.
    ///
    /// `None` if the token does not validate or lacks either the `email` or
    /// the `name-identifier` claim.
    pub fn external_login_info(&self, token: &str) -> Option<ExternalLoginInfo> {
        if !self.validate(token) {
            return None;
        }

        let claims = self.claims(token).ok()?;
        match ExternalLoginInfo::from_claims(&claims) {
            Ok(login) => Some(login),
            Err(err) => {
                debug!(error = %err, "Valid token is not an external-login token");
                None
            }
        }
    }

    /// [`create_access_token`](Self::create_access_token) on the blocking pool.
    pub async fn create_access_token_async(
        &self,
        claims: ClaimSet,
        expires_in_minutes: u32,
    ) -> Result<AccessToken, TokenError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.create_access_token(&claims, expires_in_minutes))
            .await
            .map_err(|e| TokenError::Internal(e.to_string()))?
    }

    /// [`validate`](Self::validate) on the blocking pool. A failed task counts
    /// as an invalid token.
    pub async fn validate_async(&self, token: impl Into<String>) -> bool {
        let engine = self.clone();
        let token = token.into();
        tokio::task::spawn_blocking(move || engine.validate(&token))
            .await
            .unwrap_or(false)
    }

    /// Full check of `token`, returning its payload or the first failure.
    fn verify(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        parse_compact(token)?;

        let data = decode::<Map<String, Value>>(
            token,
            &self.inner.decoding_key,
            &self.inner.validation,
        )?;

        if self.inner.policy.validate_lifetime {
            check_lifetime(&data.claims, self.inner.clock.now())?;
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEngine")
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

/// Expired tokens and non-token input are everyday traffic and only logged at
/// debug level.
fn is_routine_rejection(err: &TokenError) -> bool {
    matches!(err, TokenError::TokenExpired | TokenError::MalformedToken(_))
}

/// jsonwebtoken settings for the policy's issuer and audience checks.
///
/// Lifetime is checked by the engine against its own clock, so the library's
/// `exp`/`nbf` handling is switched off.
fn validation_for(policy: &TokenPolicy) -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let mut required = HashSet::new();
    if policy.validate_issuer {
        validation.set_issuer(&[&policy.issuer]);
        required.insert("iss".to_string());
    }
    if policy.validate_audience {
        validation.set_audience(&[&policy.audience]);
        required.insert("aud".to_string());
    } else {
        validation.validate_aud = false;
    }
    validation.required_spec_claims = required;

    validation
}

/// Check that `token` is a compact JWS.
///
/// Fails with `MalformedToken` unless the input has exactly three segments
/// whose first two are base64url-encoded JSON objects.
fn parse_compact(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(TokenError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    decode_segment(header, "header")?;
    decode_segment(payload, "payload")?;
    Ok(())
}

fn decode_segment(segment: &str, name: &str) -> Result<Map<String, Value>, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::MalformedToken(format!("{name} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::MalformedToken(format!("{name} is not a JSON object: {e}")))
}

/// Require `nbf <= now < exp`. `exp` must be present, `nbf` is optional.
fn check_lifetime(payload: &Map<String, Value>, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp();

    let exp = numeric_date(payload, "exp")?
        .ok_or_else(|| TokenError::InvalidToken("missing required claim 'exp'".into()))?;
    if now >= exp {
        return Err(TokenError::TokenExpired);
    }

    if let Some(nbf) = numeric_date(payload, "nbf")? {
        if now < nbf {
            return Err(TokenError::InvalidToken("token not yet valid".into()));
        }
    }

    Ok(())
}

/// Read a NumericDate claim as whole seconds since the epoch.
fn numeric_date(payload: &Map<String, Value>, name: &str) -> Result<Option<i64>, TokenError> {
    let Some(value) = payload.get(name) else {
        return Ok(None);
    };

    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.floor() as i64))
        .map(Some)
        .ok_or_else(|| TokenError::InvalidToken(format!("'{name}' is not a NumericDate")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn lifetime_window_is_half_open() {
        let payload = json!({ "nbf": 100, "exp": 200 });
        let payload = payload.as_object().unwrap();

        assert!(matches!(
            check_lifetime(payload, at(99)),
            Err(TokenError::InvalidToken(_))
        ));
        assert!(check_lifetime(payload, at(100)).is_ok());
        assert!(check_lifetime(payload, at(199)).is_ok());
        assert_eq!(check_lifetime(payload, at(200)), Err(TokenError::TokenExpired));
    }

    #[test]
    fn lifetime_requires_exp() {
        let payload = json!({ "nbf": 100 });
        assert!(matches!(
            check_lifetime(payload.as_object().unwrap(), at(150)),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn fractional_and_invalid_numeric_dates() {
        let payload = json!({ "exp": 200.9, "nbf": "soon" });
        let payload = payload.as_object().unwrap();
        assert_eq!(numeric_date(payload, "exp").unwrap(), Some(200));
        assert!(numeric_date(payload, "nbf").is_err());
        assert_eq!(numeric_date(payload, "iat").unwrap(), None);
    }

    #[test]
    fn parse_compact_rejects_wrong_segment_count() {
        for input in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(
                matches!(parse_compact(input), Err(TokenError::MalformedToken(_))),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn parse_compact_rejects_non_json_segments() {
        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        let object = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);

        let bad_header = format!("{not_json}.{object}.sig");
        let bad_payload = format!("{object}.{not_json}.sig");
        assert!(matches!(parse_compact(&bad_header), Err(TokenError::MalformedToken(_))));
        assert!(matches!(parse_compact(&bad_payload), Err(TokenError::MalformedToken(_))));
    }

    #[test]
    fn only_expiry_and_garbage_are_routine_rejections() {
        assert!(is_routine_rejection(&TokenError::TokenExpired));
        assert!(is_routine_rejection(&TokenError::MalformedToken("abc".into())));
        assert!(!is_routine_rejection(&TokenError::InvalidToken(
            "signature mismatch".into()
        )));
    }

    #[test]
    fn parse_compact_ignores_header_parameters() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT","kid":"k1"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"email":"a@b.com"}"#);
        assert!(parse_compact(&format!("{header}.{payload}.sig")).is_ok());
    }

    #[test]
    fn validation_tracks_policy_toggles() {
        let policy = TokenPolicy::new("secret", "iss", "aud")
            .with_validate_issuer(false)
            .with_validate_audience(false);
        let validation = validation_for(&policy);
        assert!(validation.iss.is_none());
        assert!(!validation.validate_aud);
        assert!(validation.required_spec_claims.is_empty());

        let strict = validation_for(&TokenPolicy::new("secret", "iss", "aud"));
        assert!(strict.iss.is_some());
        assert!(strict.validate_aud);
        assert!(strict.required_spec_claims.contains("aud"));
    }
}
