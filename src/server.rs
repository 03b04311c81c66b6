//! Inbound webhook for the messaging gateway.
//!
//! The gateway POSTs each message as a form (`Body`, `From`, and optionally
//! `ProfileName`) and expects a TwiML document back. The handler always
//! answers 200 with well-formed XML: a form that cannot be read, or one
//! without a sender, gets the fallback document, and failures inside the
//! engine already degrade to a fallback reply.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::conversation::{ConversationEngine, Inbound};
use crate::reply::FALLBACK_TWIML;

// ---------------------------------------------------------------------------
// State and parameters
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    engine: Arc<ConversationEngine>,
    reply_delay: Duration,
}

impl AppState {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self {
            engine,
            reply_delay: Duration::ZERO,
        }
    }

    /// Pause before every reply.
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }
}

/// Form fields sent by the gateway. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebhookForm {
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "ProfileName")]
    pub profile_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/whatsapp", post(whatsapp_reply))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn whatsapp_reply(
    State(state): State<AppState>,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(status = %rejection.status(), "Unreadable webhook form: {rejection}");
            return twiml(FALLBACK_TWIML.to_string());
        }
    };

    let user_id = strip_channel_prefix(&form.from);
    if user_id.is_empty() {
        warn!("Webhook form without a sender; not opening a session");
        return twiml(FALLBACK_TWIML.to_string());
    }

    let inbound = Inbound {
        user_id: user_id.to_string(),
        text: form.body,
        display_name: form.profile_name.filter(|n| !n.trim().is_empty()),
    };
    debug!(user = %inbound.user_id, "Inbound message");

    let reply = state.engine.handle(&inbound, Utc::now()).await;

    if !state.reply_delay.is_zero() {
        tokio::time::sleep(state.reply_delay).await;
    }

    twiml(reply.to_twiml())
}

fn twiml(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        body,
    )
        .into_response()
}

async fn health() -> &'static str {
    "ok"
}

/// `whatsapp:+92300...` -> `+92300...`. Identifiers without an alphabetic
/// channel marker are returned unchanged.
pub fn strip_channel_prefix(from: &str) -> &str {
    let from = from.trim();
    match from.split_once(':') {
        Some((channel, rest))
            if !channel.is_empty() && channel.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            rest.trim()
        }
        _ => from,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
