//! Subscription and billing HTTP handlers.
//!
//! Checkout and portal sessions are created against the Stripe REST API; the
//! local `subscribed` flag is kept in sync by the webhook and re-checked on
//! checkout success as a belt-and-braces fallback.

use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::query_as;
use tracing::{info, warn};

use crate::{
    error::AppError, extract::Json, middleware::session::AuthContext, models::user::User,
    services::billing_service, state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(rename = "priceId")]
    pub price_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(rename = "checkoutUrl")]
    pub checkout_url: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub subscribed: bool,
}

#[derive(Debug, Serialize)]
pub struct PortalResponse {
    #[serde(rename = "portalUrl")]
    pub portal_url: String,
}

async fn load_user(state: &AppState, auth: &AuthContext) -> Result<User, AppError> {
    query_as::<_, User>(
        r#"
        SELECT id, provider_id, email, name, stripe_customer_id, subscribed, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::InvalidSession)
}

/// Start a Stripe Checkout session for the given price.
///
/// # Endpoint
///
/// `POST /subscriptions/checkout`
///
/// # Request Body
///
/// ```json
/// { "priceId": "price_123" }
/// ```
///
/// # Response (200 OK)
///
/// ```json
/// { "checkoutUrl": "https://checkout.stripe.com/c/pay/..." }
/// ```
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    if payload.price_id.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "price id cannot be empty".to_string(),
        ));
    }

    let user = load_user(&state, &auth).await?;
    let customer_id =
        billing_service::ensure_customer(&state.pool, &state.http, &state.config, &user).await?;
    let checkout_url = billing_service::create_checkout_session(
        &state.http,
        &state.config,
        &customer_id,
        payload.price_id.trim(),
    )
    .await?;

    Ok(Json(CheckoutResponse { checkout_url }))
}

/// Report the caller's current subscription flag.
///
/// # Endpoint
///
/// `GET /subscriptions`
///
/// # Response (200 OK)
///
/// ```json
/// { "subscribed": true }
/// ```
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SubscriptionStatusResponse>, AppError> {
    let user = load_user(&state, &auth).await?;
    Ok(Json(SubscriptionStatusResponse {
        subscribed: user.subscribed,
    }))
}

/// Re-check the subscription with Stripe after a completed checkout.
///
/// Webhook delivery can lag the redirect back from Stripe, so the success
/// page calls this to pull the authoritative answer immediately.
///
/// # Endpoint
///
/// `POST /subscriptions/success`
pub async fn checkout_success(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SubscriptionStatusResponse>, AppError> {
    let user = load_user(&state, &auth).await?;
    if user.stripe_customer_id.is_empty() {
        return Ok(Json(SubscriptionStatusResponse { subscribed: false }));
    }

    let subscribed =
        billing_service::fetch_subscribed(&state.http, &state.config, &user.stripe_customer_id)
            .await?;
    billing_service::set_subscribed(&state.pool, &user.stripe_customer_id, subscribed).await?;

    Ok(Json(SubscriptionStatusResponse { subscribed }))
}

/// Open a Stripe customer portal session for self-service management.
///
/// # Endpoint
///
/// `GET /subscriptions/manage`
///
/// # Response (200 OK)
///
/// ```json
/// { "portalUrl": "https://billing.stripe.com/p/session/..." }
/// ```
pub async fn manage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PortalResponse>, AppError> {
    let user = load_user(&state, &auth).await?;
    if user.stripe_customer_id.is_empty() {
        return Err(AppError::InvalidRequest(
            "no billing account for this user".to_string(),
        ));
    }

    let portal_url =
        billing_service::create_portal_session(&state.http, &state.config, &user.stripe_customer_id)
            .await?;

    Ok(Json(PortalResponse { portal_url }))
}

/// Stripe webhook receiver.
///
/// Verifies the `Stripe-Signature` header against the raw body before
/// touching the event. Subscription lifecycle events flip the user's
/// `subscribed` flag; `checkout.session.completed` triggers a fresh lookup
/// against Stripe since the event itself carries no subscription status.
///
/// # Endpoint
///
/// `POST /webhooks/stripe`
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::InvalidRequest("missing stripe signature".to_string()))?;

    billing_service::verify_webhook_signature(
        &state.config.stripe_webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
    )?;

    let event: billing_service::WebhookEvent = serde_json::from_str(&body)
        .map_err(|_| AppError::InvalidRequest("malformed webhook payload".to_string()))?;

    match event.event_type.as_str() {
        "customer.subscription.created" | "customer.subscription.updated" => {
            if let (Some(customer), Some(subscription_status)) =
                (&event.data.object.customer, &event.data.object.status)
            {
                let subscribed = billing_service::status_is_active(subscription_status);
                let updated =
                    billing_service::set_subscribed(&state.pool, customer, subscribed).await?;
                if updated.is_none() {
                    warn!(customer, "webhook for unknown stripe customer");
                }
                info!(customer, subscribed, "subscription state updated");
            }
        }
        "customer.subscription.deleted" => {
            if let Some(customer) = &event.data.object.customer {
                billing_service::set_subscribed(&state.pool, customer, false).await?;
                info!(customer, "subscription cancelled");
            }
        }
        "checkout.session.completed" => {
            if let Some(customer) = &event.data.object.customer {
                let subscribed =
                    billing_service::fetch_subscribed(&state.http, &state.config, customer).await?;
                billing_service::set_subscribed(&state.pool, customer, subscribed).await?;
                info!(customer, subscribed, "checkout completed");
            }
        }
        other => {
            info!(event_type = other, "ignoring stripe event");
        }
    }

    Ok((StatusCode::OK, Json(json!({"received": true}))))
}
