//! Google OAuth: consent URL construction, code exchange, and profile fetch.
//!
//! The server owns the whole handshake. The browser is redirected to Google
//! with a random `state` (double-submitted via cookie), Google redirects back
//! with a `code`, and we exchange that code server-side for an access token
//! which is used once to fetch the user's profile. No provider tokens are
//! stored.

use serde::Deserialize;

use crate::{config::Config, db::DbPool, error::AppError, models::user::User};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Profile fields returned by Google's userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    /// Stable subject identifier; our `provider_id`
    pub sub: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Random state parameter for the OAuth round-trip (32 bytes, hex).
pub fn generate_state() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// The redirect URI registered with Google: our own callback endpoint.
pub fn redirect_uri(config: &Config) -> String {
    format!("{}/auth/google/callback", config.base_url)
}

/// Build the consent URL the browser is redirected to.
pub fn auth_url(config: &Config, state: &str) -> Result<String, AppError> {
    let mut url = url::Url::parse(GOOGLE_AUTH_URL)
        .map_err(|e| AppError::UpstreamResponse(format!("invalid auth url: {e}")))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.google_client_id)
        .append_pair("redirect_uri", &redirect_uri(config))
        .append_pair("response_type", "code")
        .append_pair(
            "scope",
            "https://www.googleapis.com/auth/userinfo.profile https://www.googleapis.com/auth/userinfo.email",
        )
        .append_pair("state", state);
    Ok(url.into())
}

/// Exchange an authorization code for an access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &Config,
    code: &str,
) -> Result<String, AppError> {
    let response = http
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("code", code),
            ("client_id", &config.google_client_id),
            ("client_secret", &config.google_client_secret),
            ("redirect_uri", &redirect_uri(config)),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamResponse(format!(
            "google token exchange returned status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

/// Fetch the logged-in user's profile with a fresh access token.
pub async fn fetch_user_info(
    http: &reqwest::Client,
    access_token: &str,
) -> Result<GoogleUserInfo, AppError> {
    let response = http
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamResponse(format!(
            "google userinfo returned status {}",
            response.status()
        )));
    }

    Ok(response.json().await?)
}

/// Find or create the user for a Google profile.
///
/// Keyed by provider id: repeat logins refresh the stored email and name
/// rather than creating duplicates.
pub async fn upsert_user(pool: &DbPool, info: &GoogleUserInfo) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (provider_id, email, name)
        VALUES ($1, $2, $3)
        ON CONFLICT (provider_id)
        DO UPDATE SET email = $2, name = $3, updated_at = NOW()
        RETURNING id, provider_id, email, name, stripe_customer_id, subscribed, created_at, updated_at
        "#,
    )
    .bind(&info.sub)
    .bind(&info.email)
    .bind(&info.name)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            server_port: 3000,
            client_url: "http://localhost:5173".into(),
            base_url: "http://localhost:3000".into(),
            google_client_id: "client-id".into(),
            google_client_secret: "client-secret".into(),
            stripe_secret_key: "sk_test".into(),
            stripe_webhook_secret: "whsec_test".into(),
            free_file_limit: 3,
            pro_file_limit: 100,
        }
    }

    #[test]
    fn state_is_64_hex_chars() {
        let state = generate_state();
        assert_eq!(state.len(), 64);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn auth_url_carries_client_and_state() {
        let url = auth_url(&config(), "abc123").unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("response_type=code"));
        // redirect target is our own callback, URL encoded
        assert!(url.contains("auth%2Fgoogle%2Fcallback"));
    }
}
