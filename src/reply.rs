//! Reply documents returned to the messaging gateway.
//!
//! A reply is an ordered list of fragments, each delivered as its own chat
//! message. The gateway expects TwiML:
//!
//! ```xml
//! <Response><Message><Body>text</Body><Media>https://…</Media></Message></Response>
//! ```

use serde::Serialize;
use tracing::warn;

/// Served if the reply cannot be serialized.
pub const FALLBACK_TWIML: &str = "<Response><Message><Body>Sorry, something went wrong. Please try a new query.</Body></Message></Response>";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyFragment {
    #[serde(rename = "Body")]
    pub text: String,
    #[serde(rename = "Media", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl ReplyFragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            media_url: None,
        }
    }

    /// Attach a media URL. A URL the gateway could not fetch (unparseable,
    /// or not http/https) is logged and dropped; the text is still sent.
    pub fn with_media(text: impl Into<String>, url: Option<&str>) -> Self {
        let mut fragment = Self::text(text);
        if let Some(url) = url {
            match validate_media_url(url) {
                Ok(valid) => fragment.media_url = Some(valid),
                Err(e) => warn!(url, "Dropping media attachment: {e}"),
            }
        }
        fragment
    }
}

fn validate_media_url(url: &str) -> Result<String, String> {
    let parsed = reqwest::Url::parse(url.trim()).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename = "Response")]
pub struct Reply {
    #[serde(rename = "Message")]
    pub fragments: Vec<ReplyFragment>,
}

impl Reply {
    pub fn new(fragments: Vec<ReplyFragment>) -> Self {
        Self { fragments }
    }

    /// Serialize as TwiML. Never fails: falls back to [`FALLBACK_TWIML`].
    pub fn to_twiml(&self) -> String {
        match quick_xml::se::to_string(self) {
            Ok(xml) => xml,
            Err(e) => {
                warn!("Failed to serialize reply: {e}");
                FALLBACK_TWIML.to_string()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
