//! Reply wording.
//!
//! Variable phrasing (greetings, "nothing found", fallbacks) lives in
//! template lists; which variant is used is decided by a [`PhraseSelector`]
//! so tests can pin the choice.

use std::sync::Arc;

use rand::Rng;

/// Used in greetings when the sender's name is unknown.
pub const GENERIC_NAME: &str = "there";

// ============================================================================
// Selectors
// ============================================================================

/// Picks one of `len` variants. `len` is always at least 1.
pub trait PhraseSelector: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random choice; the production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl PhraseSelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same variant (wrapped into range).
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl PhraseSelector for FixedSelector {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

// ============================================================================
// Phrase Book
// ============================================================================

#[derive(Clone)]
pub struct PhraseBook {
    /// `{name}` is replaced with the sender's name.
    pub greetings: Vec<String>,
    /// `{categories}` is replaced with the catalog's category list.
    pub no_results: Vec<String>,
    pub fallback: Vec<String>,
    pub category_intro: String,
    pub invalid_selection: String,
    pub more_hint: String,
    pub select_hint: String,
    pub discount: String,
    pub store_info: String,
    pub abuse: String,
    pub warranty: String,
    pub unknown: String,
    pub api_timeout: String,
    selector: Arc<dyn PhraseSelector>,
}

impl std::fmt::Debug for PhraseBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseBook")
            .field("greetings", &self.greetings.len())
            .field("no_results", &self.no_results.len())
            .field("fallback", &self.fallback.len())
            .finish_non_exhaustive()
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PhraseBook {
    fn default() -> Self {
        Self {
            greetings: owned(&[
                "Hi {name}! 👋 Welcome to the gear shop. Tell me what you're looking for, e.g. \"4 person tent under 20000\".",
                "Salam {name}! What gear can I help you find today? Try \"sleeping bag\" or \"rent a tent\".",
                "Hello {name}! Looking for camping or hiking gear? Just type what you need.",
            ]),
            no_results: owned(&[
                "Sorry, I couldn't find anything for that. Try a new query. We carry: {categories}",
                "No items found or end of list reached. Try a new query. Available categories: {categories}",
            ]),
            fallback: owned(&[
                "Something went wrong on our side. Please try a new query.",
                "Sorry, I couldn't process that. Please try a new query.",
            ]),
            category_intro: "Here's what we carry:".to_string(),
            invalid_selection: "Invalid selection. Please reply with a valid number.".to_string(),
            more_hint: "Reply with 'more' to see more options or reply with a number (e.g. 1, 2) to select.".to_string(),
            select_hint: "Reply with a number (e.g. 1, 2) to see an item, or send a new query.".to_string(),
            discount: "Our prices are already the best we can offer, but keep an eye out for seasonal sales!".to_string(),
            store_info: "We're an outdoor gear shop offering sales and rentals. Message us here any time and we'll get back to you.".to_string(),
            abuse: "Let's keep it respectful, please. I'm here to help you find gear.".to_string(),
            warranty: "Warranty depends on the product. Select an item by number to see its warranty.".to_string(),
            unknown: "Sorry, I didn't get that. Try something like \"tent under 15000\" or ask what we sell.".to_string(),
            api_timeout: "I'm taking longer than usual to think. Please send your message again in a moment.".to_string(),
            selector: Arc::new(RandomSelector),
        }
    }
}

impl PhraseBook {
    pub fn with_selector(mut self, selector: Arc<dyn PhraseSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn greeting(&self, name: Option<&str>) -> String {
        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(GENERIC_NAME);
        self.choose(&self.greetings).replace("{name}", name)
    }

    pub fn no_results(&self, categories: &[String]) -> String {
        self.choose(&self.no_results)
            .replace("{categories}", &categories.join(", "))
    }

    pub fn fallback(&self) -> String {
        self.choose(&self.fallback).to_string()
    }

    /// Bulleted category list under the intro line.
    pub fn category_list(&self, categories: &[String]) -> String {
        let mut text = self.category_intro.clone();
        for category in categories {
            text.push_str("\n• ");
            text.push_str(category);
        }
        text
    }

    fn choose<'a>(&self, variants: &'a [String]) -> &'a str {
        if variants.is_empty() {
            return "";
        }
        let index = self.selector.pick(variants.len()).min(variants.len() - 1);
        &variants[index]
    }
}

// ============================================================================
// Tests
// ============================================================================
