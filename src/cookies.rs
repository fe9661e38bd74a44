//! Cookie parsing and construction.
//!
//! The web surface authenticates with a `session_token` cookie and the OAuth
//! round-trip double-submits its `state` through a short-lived cookie. Both
//! are HttpOnly and SameSite=Lax; `Secure` is added whenever the API is
//! served over HTTPS.

use axum::http::HeaderMap;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Cookie carrying the OAuth `state` between login and callback.
pub const OAUTH_STATE_COOKIE: &str = "oauthstate";

/// Session cookie lifetime, kept in sync with the server-side session.
const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// OAuth state cookie lifetime; the round-trip takes seconds, not minutes.
const OAUTH_STATE_MAX_AGE_SECS: i64 = 10 * 60;

/// Read a cookie value from the request headers.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn secure_attr(secure: bool) -> &'static str {
    if secure { "; Secure" } else { "" }
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={SESSION_MAX_AGE_SECS}; HttpOnly; SameSite=Lax{}",
        secure_attr(secure)
    )
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{}",
        secure_attr(secure)
    )
}

/// `Set-Cookie` value storing the OAuth state, scoped to the callback path.
pub fn oauth_state_cookie(state: &str, secure: bool) -> String {
    format!(
        "{OAUTH_STATE_COOKIE}={state}; Path=/auth/google/callback; Max-Age={OAUTH_STATE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax{}",
        secure_attr(secure)
    )
}

/// `Set-Cookie` value clearing the OAuth state after the callback.
pub fn clear_oauth_state_cookie(secure: bool) -> String {
    format!(
        "{OAUTH_STATE_COOKIE}=; Path=/auth/google/callback; Max-Age=0; HttpOnly; SameSite=Lax{}",
        secure_attr(secure)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_several() {
        let headers = headers("a=1; session_token=tok123; b=2");
        assert_eq!(
            get_cookie(&headers, SESSION_COOKIE),
            Some("tok123".to_string())
        );
        assert_eq!(get_cookie(&headers, "b"), Some("2".to_string()));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn no_cookie_header_yields_none() {
        assert_eq!(get_cookie(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let value = session_cookie("tok", true);
        assert!(value.starts_with("session_token=tok; "));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.ends_with("; Secure"));
        assert!(!session_cookie("tok", false).contains("Secure"));
    }

    #[test]
    fn clearing_sets_zero_max_age() {
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
        assert!(clear_oauth_state_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn state_cookie_is_scoped_to_callback() {
        assert!(oauth_state_cookie("s", false).contains("Path=/auth/google/callback"));
    }
}
