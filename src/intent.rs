//! Delegated intent classification.
//!
//! Messages the local heuristics cannot place are sent to an LLM with a
//! fixed instruction and the catalog's category list. The reply is expected
//! to be a small JSON object, but models wrap it in markdown, add prose, or
//! time out, so [`IntentClassifier::classify`] sanitizes what it can and
//! otherwise degrades to [`Intent::Unknown`] / [`Intent::ApiTimeout`].
//! It never returns an error.

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::{LlmClient, LlmError};
use crate::matcher::MatchFilters;

// ============================================================================
// Intent
// ============================================================================

/// Coarse purpose of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ProductSearch,
    ShowCategories,
    DiscountRequest,
    StoreInfo,
    Abuse,
    WarrantyInfo,
    Unknown,
    /// The classifier did not answer in time.
    ApiTimeout,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductSearch => "product_search",
            Self::ShowCategories => "show_categories",
            Self::DiscountRequest => "discount_request",
            Self::StoreInfo => "store_info",
            Self::Abuse => "abuse",
            Self::WarrantyInfo => "warranty_info",
            Self::Unknown => "unknown",
            Self::ApiTimeout => "api_timeout",
        }
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product_search" => Ok(Self::ProductSearch),
            "show_categories" => Ok(Self::ShowCategories),
            "discount_request" => Ok(Self::DiscountRequest),
            "store_info" => Ok(Self::StoreInfo),
            "abuse" => Ok(Self::Abuse),
            "warranty_info" => Ok(Self::WarrantyInfo),
            "unknown" => Ok(Self::Unknown),
            "api_timeout" => Ok(Self::ApiTimeout),
            other => Err(format!("unrecognized intent '{other}'")),
        }
    }
}

/// Structured classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub price_limit: Option<f64>,
}

impl Classification {
    pub fn of(intent: Intent) -> Self {
        Self {
            intent,
            category: None,
            subcategory: None,
            price_limit: None,
        }
    }

    pub fn filters(&self) -> MatchFilters {
        MatchFilters {
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            price_limit: self.price_limit,
        }
    }
}

// ============================================================================
// Classifier
// ============================================================================

const CLASSIFY_SYSTEM_PROMPT: &str = r#"You classify WhatsApp messages sent to an outdoor gear shop.

Respond with ONLY a JSON object (no markdown, no explanation):
{
  "intent": "one of: product_search, show_categories, discount_request, store_info, abuse, warranty_info, unknown",
  "category": "catalog category the customer wants, or null",
  "subcategory": "catalog subcategory, or null",
  "price_limit": "maximum price as a number, or null"
}

Rules:
- Use product_search when the customer is looking for a product, even with typos or Roman Urdu
- category and subcategory must be copied from the list below, or null
- price_limit only when the customer states a budget

Catalog categories:
"#;

/// Delegates classification to an [`LlmClient`].
#[derive(Clone)]
pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, categories: &[String]) -> Self {
        let mut system_prompt = CLASSIFY_SYSTEM_PROMPT.to_string();
        for category in categories {
            system_prompt.push_str(&format!("- {category}\n"));
        }
        Self { llm, system_prompt }
    }

    /// Classify a raw message. Failures degrade instead of propagating.
    pub async fn classify(&self, text: &str) -> Classification {
        match self.llm.complete(&self.system_prompt, text).await {
            Ok(completion) => match parse_classification(&completion.text) {
                Ok(classification) => {
                    debug!(intent = classification.intent.as_str(), "Message classified");
                    classification
                }
                Err(e) => {
                    warn!("Unparseable classifier reply: {e}");
                    Classification::of(Intent::Unknown)
                }
            },
            Err(LlmError::Timeout) => {
                warn!("Intent classifier timed out");
                Classification::of(Intent::ApiTimeout)
            }
            Err(e) => {
                warn!("Intent classifier call failed: {e}");
                Classification::of(Intent::Unknown)
            }
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: Option<String>,
    #[serde(default)]
    category: Option<Value>,
    #[serde(default)]
    subcategory: Option<Value>,
    #[serde(default)]
    price_limit: Option<Value>,
}

/// Parse a classifier reply, tolerating fences and surrounding prose.
pub fn parse_classification(text: &str) -> Result<Classification, String> {
    let cleaned = strip_markdown_fences(text);
    let json = extract_json_object(&cleaned).ok_or("no JSON object in reply")?;
    let raw: RawClassification =
        serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;

    // An unrecognized label is still a reply; it just isn't actionable.
    let intent = raw
        .intent
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Intent::Unknown);

    Ok(Classification {
        intent,
        category: string_field(raw.category),
        subcategory: string_field(raw.subcategory),
        price_limit: raw.price_limit.and_then(number_field),
    })
}

fn string_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            let absent = trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null");
            (!absent).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

fn number_field(value: Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    (n.is_finite() && n > 0.0).then_some(n)
}

/// Strip markdown code fences from LLM output.
fn strip_markdown_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let after_first_fence = trimmed
            .find('\n')
            .map(|i| &trimmed[i + 1..])
            .unwrap_or(trimmed);
        if let Some(end) = after_first_fence.rfind("```") {
            return after_first_fence[..end].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// The outermost `{...}` span, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

// ============================================================================
// Tests
// ============================================================================
