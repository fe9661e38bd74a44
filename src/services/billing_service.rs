//! Stripe billing integration.
//!
//! Talks to Stripe's REST API directly over reqwest with form-encoded bodies:
//! customer creation, subscription-mode checkout sessions, the billing
//! portal, and subscription status lookups. Stripe remains the source of
//! truth for subscription state; the local `subscribed` flag is a synced
//! copy updated by the webhook handler and the post-checkout sync.
//!
//! # Webhook Verification
//!
//! Stripe signs webhook payloads with HMAC-SHA256. The `Stripe-Signature`
//! header carries `t=<unix>,v1=<hex>,...`; the signed message is
//! `"{t}.{raw body}"`. Verification recomputes the MAC with the shared
//! webhook secret and rejects stale timestamps.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::{config::Config, db::DbPool, error::AppError, models::user::User};

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum age of a webhook timestamp before it is rejected as a replay.
const WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PortalSession {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    status: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionList {
    data: Vec<Subscription>,
}

/// A parsed webhook event, reduced to the fields we act on.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookObject,
}

#[derive(Debug, Deserialize)]
pub struct WebhookObject {
    /// Stripe customer id the event concerns
    pub customer: Option<String>,
    /// Subscription status, present on subscription lifecycle events
    pub status: Option<String>,
}

/// Whether a Stripe subscription status counts as an active subscription.
pub fn status_is_active(status: &str) -> bool {
    matches!(status, "active" | "trialing")
}

/// Get the user's Stripe customer id, creating the customer on first use.
pub async fn ensure_customer(
    pool: &DbPool,
    http: &reqwest::Client,
    config: &Config,
    user: &User,
) -> Result<String, AppError> {
    if !user.stripe_customer_id.is_empty() {
        return Ok(user.stripe_customer_id.clone());
    }

    let response = http
        .post(format!("{STRIPE_API_BASE}/customers"))
        .basic_auth(&config.stripe_secret_key, None::<&str>)
        .form(&[
            ("email", user.email.as_str()),
            ("metadata[userId]", &user.id.to_string()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamResponse(format!(
            "stripe customer creation returned status {}",
            response.status()
        )));
    }

    let customer: Customer = response.json().await?;

    sqlx::query("UPDATE users SET stripe_customer_id = $2, updated_at = NOW() WHERE id = $1")
        .bind(user.id)
        .bind(&customer.id)
        .execute(pool)
        .await?;

    Ok(customer.id)
}

/// Create a subscription-mode checkout session and return its hosted URL.
pub async fn create_checkout_session(
    http: &reqwest::Client,
    config: &Config,
    customer_id: &str,
    price_id: &str,
) -> Result<String, AppError> {
    let success_url = format!("{}/success", config.client_url);
    let cancel_url = format!("{}/cancel", config.client_url);

    let response = http
        .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
        .basic_auth(&config.stripe_secret_key, None::<&str>)
        .form(&[
            ("customer", customer_id),
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", &success_url),
            ("cancel_url", &cancel_url),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamResponse(format!(
            "stripe checkout session returned status {}",
            response.status()
        )));
    }

    let session: CheckoutSession = response.json().await?;
    Ok(session.url)
}

/// Create a billing-portal session so the user can manage their plan.
pub async fn create_portal_session(
    http: &reqwest::Client,
    config: &Config,
    customer_id: &str,
) -> Result<String, AppError> {
    let return_url = format!("{}/app", config.client_url);

    let response = http
        .post(format!("{STRIPE_API_BASE}/billing_portal/sessions"))
        .basic_auth(&config.stripe_secret_key, None::<&str>)
        .form(&[("customer", customer_id), ("return_url", &return_url)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamResponse(format!(
            "stripe portal session returned status {}",
            response.status()
        )));
    }

    let session: PortalSession = response.json().await?;
    Ok(session.url)
}

/// Ask Stripe for the customer's most recent subscription and report whether
/// it is active.
pub async fn fetch_subscribed(
    http: &reqwest::Client,
    config: &Config,
    customer_id: &str,
) -> Result<bool, AppError> {
    let response = http
        .get(format!("{STRIPE_API_BASE}/subscriptions"))
        .basic_auth(&config.stripe_secret_key, None::<&str>)
        .query(&[("customer", customer_id), ("status", "all"), ("limit", "1")])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamResponse(format!(
            "stripe subscription list returned status {}",
            response.status()
        )));
    }

    let list: SubscriptionList = response.json().await?;
    Ok(list
        .data
        .first()
        .is_some_and(|sub| status_is_active(&sub.status)))
}

/// Persist a subscription flag for the user owning a Stripe customer id.
///
/// Returns `None` when no local user maps to the customer (e.g., an event
/// for a customer created outside this deployment).
pub async fn set_subscribed(
    pool: &DbPool,
    customer_id: &str,
    subscribed: bool,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET subscribed = $2, updated_at = NOW()
        WHERE stripe_customer_id = $1
        RETURNING id, provider_id, email, name, stripe_customer_id, subscribed, created_at, updated_at
        "#,
    )
    .bind(customer_id)
    .bind(subscribed)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// `now_unix` is passed in rather than read from the clock so the tolerance
/// window is testable.
pub fn verify_webhook_signature(
    secret: &str,
    signature_header: &str,
    payload: &str,
    now_unix: i64,
) -> Result<(), AppError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| AppError::InvalidRequest("malformed stripe signature".to_string()))?;
    if candidates.is_empty() {
        return Err(AppError::InvalidRequest(
            "malformed stripe signature".to_string(),
        ));
    }
    if (now_unix - timestamp).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(AppError::InvalidRequest(
            "stripe signature timestamp outside tolerance".to_string(),
        ));
    }

    let signed_payload = format!("{timestamp}.{payload}");
    for candidate in candidates {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| AppError::InvalidRequest("invalid webhook secret".to_string()))?;
        mac.update(signed_payload.as_bytes());
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::InvalidRequest(
        "stripe signature verification failed".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        format!(
            "t={timestamp},v1={}",
            hex::encode(mac.finalize().into_bytes())
        )
    }

    #[test]
    fn valid_signature_verifies() {
        let header = sign("whsec_test", 1_700_000_000, r#"{"type":"x"}"#);
        assert!(
            verify_webhook_signature("whsec_test", &header, r#"{"type":"x"}"#, 1_700_000_000)
                .is_ok()
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let header = sign("whsec_test", 1_700_000_000, r#"{"type":"x"}"#);
        assert!(
            verify_webhook_signature("whsec_test", &header, r#"{"type":"y"}"#, 1_700_000_000)
                .is_err()
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = sign("whsec_other", 1_700_000_000, "{}");
        assert!(verify_webhook_signature("whsec_test", &header, "{}", 1_700_000_000).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let header = sign("whsec_test", 1_700_000_000, "{}");
        assert!(
            verify_webhook_signature("whsec_test", &header, "{}", 1_700_000_000 + 301).is_err()
        );
    }

    #[test]
    fn timestamp_within_tolerance_is_accepted() {
        let header = sign("whsec_test", 1_700_000_000, "{}");
        assert!(verify_webhook_signature("whsec_test", &header, "{}", 1_700_000_000 + 299).is_ok());
    }

    #[test]
    fn missing_parts_are_rejected() {
        assert!(verify_webhook_signature("whsec_test", "v1=abcd", "{}", 0).is_err());
        assert!(verify_webhook_signature("whsec_test", "t=0", "{}", 0).is_err());
        assert!(verify_webhook_signature("whsec_test", "", "{}", 0).is_err());
    }

    #[test]
    fn active_statuses() {
        assert!(status_is_active("active"));
        assert!(status_is_active("trialing"));
        assert!(!status_is_active("canceled"));
        assert!(!status_is_active("past_due"));
        assert!(!status_is_active("none"));
    }
}
