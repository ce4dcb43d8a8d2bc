//! `Authorization: Bearer <token>` handling.

const SCHEME: &str = "Bearer";

/// Strip a leading `Bearer ` scheme from `value`, if present.
///
/// The scheme name is matched case-insensitively. Values without the
/// scheme are returned unchanged, so a bare token passes straight through.
pub fn strip_bearer(value: &str) -> &str {
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case(SCHEME) => token.trim_start(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::strip_bearer;

    #[test]
    fn strips_scheme() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("bearer abc.def.ghi"), "abc.def.ghi");
    }

    #[test]
    fn bare_token_unchanged() {
        assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
    }

    #[test]
    fn other_scheme_unchanged() {
        assert_eq!(strip_bearer("Basic dXNlcjpwYXNz"), "Basic dXNlcjpwYXNz");
    }
}
