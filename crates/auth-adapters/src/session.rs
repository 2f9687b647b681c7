//! Locating the session token in a request.
//!
//! The identity provider's front-end SDK sends the token either as a bearer
//! header (API calls) or in the `__session` cookie (page loads). The header
//! wins when both are present.

pub const SESSION_COOKIE: &str = "__session";

/// Returns the raw token, if any.
pub fn token_from_headers<'a>(authorization: Option<&'a str>, cookie: Option<&'a str>) -> Option<&'a str> {
    authorization
        .and_then(bearer)
        .or_else(|| cookie.and_then(|c| cookie_value(c, SESSION_COOKIE)))
}

fn bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Value of cookie `name` from a `Cookie` header (`a=1; b=2`).
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_wins() {
        assert_eq!(
            token_from_headers(Some("Bearer abc.def"), Some("__session=zzz")),
            Some("abc.def")
        );
        assert_eq!(token_from_headers(Some("bearer   xyz "), None), Some("xyz"));
    }

    #[test]
    fn falls_back_to_session_cookie() {
        assert_eq!(
            token_from_headers(Some("Basic dXNlcg=="), Some("lang=no; __session=tok; x=1")),
            Some("tok")
        );
        assert_eq!(token_from_headers(None, Some("lang=no")), None);
        assert_eq!(token_from_headers(Some("Bearer "), Some("__session=")), None);
    }

    #[test]
    fn cookie_lookup_is_exact() {
        assert_eq!(cookie_value("__session_old=1; lang=en", "lang"), Some("en"));
        assert_eq!(cookie_value("__session_old=1", "__session"), None);
    }
}
