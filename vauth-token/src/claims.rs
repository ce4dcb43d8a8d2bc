use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim carrying the caller's email address.
pub const EMAIL_CLAIM: &str = "email";

/// Claim carrying the caller's user id.
pub const NAME_IDENTIFIER_CLAIM: &str = "name-identifier";

/// Payload fields the engine writes itself. Caller values for them are
/// replaced, and [`TokenEngine::claims`](crate::TokenEngine::claims) does not
/// return them.
pub const REGISTERED_CLAIMS: [&str; 4] = ["iss", "aud", "nbf", "exp"];

pub(crate) fn is_registered(key: &str) -> bool {
    REGISTERED_CLAIMS.contains(&key)
}

/// A signed token together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Compact JWS serialization (`header.payload.signature`).
    pub token: String,

    /// Creation instant plus the requested lifetime, whole seconds, UTC.
    pub expires_at: DateTime<Utc>,
}

/// One key/value fact read back from a token payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub key: String,
    pub value: String,
}

impl Claim {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered claim input for token creation.
///
/// Keys keep the order of their first insertion, and the first value given
/// for a key wins: later values for the same key are dropped, not merged.
/// Values are stored as their `Display` text.
///
/// ```ignore
/// let claims: ClaimSet = [("email", "a@b.com"), ("role", "owner"), ("email", "x@y.z")]
///     .into_iter()
///     .collect();
/// assert_eq!(claims.get("email"), Some("a@b.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    entries: Map<String, Value>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` unless it is already present.
    ///
    /// Returns `false` when the key existed and `value` was dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, Value::String(value.to_string()));
        true
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap_or_default()))
    }

    pub(crate) fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ClaimSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Into<String>, V: Display> Extend<(K, V)> for ClaimSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for ClaimSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Read the caller-supplied claims out of a decoded payload, in payload order.
///
/// Non-string values (from foreign issuers) are returned as their JSON text.
pub(crate) fn claims_from_payload(payload: &Map<String, Value>) -> Vec<Claim> {
    payload
        .iter()
        .filter(|(key, _)| !is_registered(key))
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Claim::new(key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_value_wins_and_order_is_kept() {
        let mut set = ClaimSet::new();
        assert!(set.insert("b", 1));
        assert!(set.insert("a", "x"));
        assert!(!set.insert("b", 2));

        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs, vec![("b", "1"), ("a", "x")]);
    }

    #[test]
    fn payload_claims_skip_registered_fields() {
        let payload = json!({
            "email": "a@b.com",
            "nbf": 1,
            "exp": 2,
            "iss": "i",
            "aud": "a",
            "scope": ["read", "write"],
        });
        let claims = claims_from_payload(payload.as_object().unwrap());
        assert_eq!(
            claims,
            vec![
                Claim::new("email", "a@b.com"),
                Claim::new("scope", r#"["read","write"]"#),
            ]
        );
    }
}
