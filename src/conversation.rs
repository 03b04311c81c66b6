//! The conversation engine: session handling and pagination.
//!
//! Each inbound message is interpreted against the sender's session, in
//! priority order:
//!
//! 1. no live session (new sender or expired) → fresh session and a greeting
//! 2. greeting → clear the result list and greet
//! 3. "what do you sell"-style question → category list
//! 4. `more` → next page of the current results
//! 5. a number → open that item from the current results
//! 6. anything else → new search (or a canned answer when the classifier
//!    says the message is not a product search)
//!
//! [`ConversationEngine::handle`] always produces a well-formed reply; internal
//! failures are logged and answered with a generic fallback.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, error};

use crate::card::format_product;
use crate::error::BotError;
use crate::intent::{Intent, IntentClassifier};
use crate::matcher::{CatalogMatcher, MatchFilters, MatchedProduct};
use crate::phrases::PhraseBook;
use crate::reply::{Reply, ReplyFragment};
use crate::session::{DEFAULT_SESSION_TIMEOUT, SessionState, SessionStore, StoreError};

/// Items shown per page.
pub const PAGE_SIZE: usize = 5;

/// Messages that reset the conversation, compared after normalization.
const GREETINGS: &[&str] = &[
    "hi",
    "hii",
    "hello",
    "hey",
    "salam",
    "salaam",
    "aoa",
    "assalamualaikum",
    "assalam o alaikum",
    "asalam o alaikum",
    "good morning",
    "good evening",
    "start",
    "menu",
    "restart",
];

static CATALOG_QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \bwhat\s+(do|can|does)\s+(you|u|ya)\s+(sell|have|offer|stock)\s*$
        | \b(show|list|see)\b.*\bcategor
        | ^(categories|catalog|catalogue|products)$
        ",
    )
    .expect("catalog question pattern is valid")
});

/// One inbound message.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub user_id: String,
    pub text: String,
    /// Profile name reported by the messaging channel, if any.
    pub display_name: Option<String>,
}

impl Inbound {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            text: text.into(),
            display_name: None,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

pub struct ConversationEngine {
    matcher: CatalogMatcher,
    sessions: Arc<dyn SessionStore>,
    classifier: Option<IntentClassifier>,
    phrases: PhraseBook,
    session_timeout: chrono::Duration,
}

impl ConversationEngine {
    pub fn new(matcher: CatalogMatcher, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            matcher,
            sessions,
            classifier: None,
            phrases: PhraseBook::default(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    /// Delegate unresolved messages to an external classifier.
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_phrases(mut self, phrases: PhraseBook) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_session_timeout(mut self, timeout: chrono::Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn matcher(&self) -> &CatalogMatcher {
        &self.matcher
    }

    /// Handle one message. Never fails: errors become a fallback reply.
    pub async fn handle(&self, inbound: &Inbound, now: DateTime<Utc>) -> Reply {
        match self.turn(inbound, now).await {
            Ok(fragments) if !fragments.is_empty() => Reply::new(fragments),
            Ok(_) => Reply::new(vec![ReplyFragment::text(self.phrases.fallback())]),
            Err(e) => {
                error!(user = %inbound.user_id, "Turn failed: {e}");
                Reply::new(vec![ReplyFragment::text(self.phrases.fallback())])
            }
        }
    }

    async fn turn(&self, inbound: &Inbound, now: DateTime<Utc>) -> Result<Vec<ReplyFragment>, BotError> {
        let existing = self.sessions.get(&inbound.user_id).await.map_err(store_err)?;

        let mut session = match existing {
            Some(session) if !session.is_expired(now, self.session_timeout) => session,
            stale => {
                debug!(
                    user = %inbound.user_id,
                    expired = stale.is_some(),
                    "Starting new session"
                );
                let mut fresh = SessionState::new(inbound.user_id.clone(), now);
                fresh.display_name = inbound.display_name.clone();
                let greeting = self.phrases.greeting(fresh.display_name.as_deref());
                self.sessions.put(fresh).await.map_err(store_err)?;
                return Ok(vec![ReplyFragment::text(greeting)]);
            }
        };

        session.last_activity = now;
        if inbound.display_name.is_some() {
            session.display_name = inbound.display_name.clone();
        }

        let fragments = self.step(&mut session, inbound.text.trim()).await;
        self.sessions.put(session).await.map_err(store_err)?;
        Ok(fragments)
    }

    /// Interpret a message against a live session.
    async fn step(&self, session: &mut SessionState, text: &str) -> Vec<ReplyFragment> {
        let lowered = text.to_lowercase();

        if is_greeting(&lowered) {
            session.reset_search();
            return vec![ReplyFragment::text(
                self.phrases.greeting(session.display_name.as_deref()),
            )];
        }

        if is_catalog_question(&lowered) {
            return vec![self.category_list()];
        }

        if lowered == "more" && session.has_matches() {
            if session.advance_page(PAGE_SIZE) {
                return self.render_page(session);
            }
            return vec![self.no_results()];
        }

        if is_number(&lowered) && session.has_matches() {
            return self.select(session, &lowered);
        }

        if lowered.is_empty() {
            return vec![ReplyFragment::text(self.phrases.unknown.clone())];
        }

        let filters = match &self.classifier {
            None => MatchFilters::default(),
            Some(classifier) => {
                let classification = classifier.classify(text).await;
                debug!(
                    user = %session.user_id,
                    intent = classification.intent.as_str(),
                    "Delegated classification"
                );
                match classification.intent {
                    Intent::ProductSearch => classification.filters(),
                    other => return vec![self.canned(other)],
                }
            }
        };

        let matches = self.matcher.search(text, &filters);
        session.start_search(text, matches);
        self.render_page(session)
    }

    fn select(&self, session: &mut SessionState, digits: &str) -> Vec<ReplyFragment> {
        let chosen = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| session.select(n).cloned().map(|hit| (n, hit)));

        match chosen {
            Some((ordinal, hit)) => {
                session.viewed_models.push(hit.product.model.clone());
                vec![card(ordinal - 1, &hit)]
            }
            None => vec![ReplyFragment::text(self.phrases.invalid_selection.clone())],
        }
    }

    /// Cards for the current page followed by a navigation hint.
    fn render_page(&self, session: &SessionState) -> Vec<ReplyFragment> {
        let start = session.page * PAGE_SIZE;
        let items = page_slice(&session.current_matches, session.page);
        if items.is_empty() {
            return vec![self.no_results()];
        }

        let mut fragments: Vec<ReplyFragment> = items
            .iter()
            .enumerate()
            .map(|(i, hit)| card(start + i, hit))
            .collect();

        let hint = if start + PAGE_SIZE < session.current_matches.len() {
            &self.phrases.more_hint
        } else {
            &self.phrases.select_hint
        };
        fragments.push(ReplyFragment::text(hint.clone()));
        fragments
    }

    fn canned(&self, intent: Intent) -> ReplyFragment {
        let text = match intent {
            Intent::ShowCategories => return self.category_list(),
            Intent::DiscountRequest => &self.phrases.discount,
            Intent::StoreInfo => &self.phrases.store_info,
            Intent::Abuse => &self.phrases.abuse,
            Intent::WarrantyInfo => &self.phrases.warranty,
            Intent::ApiTimeout => &self.phrases.api_timeout,
            Intent::Unknown | Intent::ProductSearch => &self.phrases.unknown,
        };
        ReplyFragment::text(text.clone())
    }

    fn category_list(&self) -> ReplyFragment {
        ReplyFragment::text(self.phrases.category_list(self.matcher.catalog().categories()))
    }

    fn no_results(&self) -> ReplyFragment {
        ReplyFragment::text(self.phrases.no_results(self.matcher.catalog().categories()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn store_err(err: StoreError) -> BotError {
    BotError::Store(err.to_string())
}

fn card(index: usize, hit: &MatchedProduct) -> ReplyFragment {
    ReplyFragment::with_media(format_product(index, hit), hit.product.image_url.as_deref())
}

/// Items on page `page` (0-based). Empty past the end.
pub fn page_slice(matches: &[MatchedProduct], page: usize) -> &[MatchedProduct] {
    let start = page.saturating_mul(PAGE_SIZE);
    let end = start.saturating_add(PAGE_SIZE).min(matches.len());
    matches.get(start..end).unwrap_or(&[])
}

/// Lowercase, strip punctuation and emoji, collapse whitespace.
fn normalize_words(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_greeting(lowered: &str) -> bool {
    let words = normalize_words(lowered);
    GREETINGS.contains(&words.as_str())
}

fn is_catalog_question(lowered: &str) -> bool {
    CATALOG_QUESTION_RE.is_match(&normalize_words(lowered))
}

fn is_number(lowered: &str) -> bool {
    !lowered.is_empty() && lowered.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ProductRecord};
    use crate::llm::{LlmError, MockLlmClient};
    use crate::matcher::DEFAULT_PRICE_TOLERANCE;
    use crate::phrases::FixedSelector;
    use crate::session::InMemorySessionStore;
    use crate::synonyms::SynonymTable;
    use async_trait::async_trait;
    use chrono::Duration;
    use proptest::prelude::*;

    const USER: &str = "+923001234567";

    fn tents(n: usize) -> Vec<ProductRecord> {
        (0..n)
            .map(|i| ProductRecord {
                buy_price: 1000.0 + i as f64,
                stock: 1,
                image_url: (i == 0).then(|| "https://example.com/t0.jpg".to_string()),
                ..ProductRecord::new(format!("T{}", i + 1), "Tent")
            })
            .collect()
    }

    fn catalog(mut products: Vec<ProductRecord>) -> Arc<Catalog> {
        products.push(ProductRecord {
            buy_price: 500.0,
            ..ProductRecord::new("S1", "Stove")
        });
        Arc::new(Catalog::from_products(products))
    }

    fn engine_with(products: Vec<ProductRecord>) -> (ConversationEngine, InMemorySessionStore) {
        let store = InMemorySessionStore::new();
        let matcher = CatalogMatcher::new(
            catalog(products),
            SynonymTable::default(),
            DEFAULT_PRICE_TOLERANCE,
        );
        let engine = ConversationEngine::new(matcher, Arc::new(store.clone()))
            .with_phrases(PhraseBook::default().with_selector(Arc::new(FixedSelector(0))));
        (engine, store)
    }

    fn classified(mock: MockLlmClient) -> (ConversationEngine, InMemorySessionStore, Arc<MockLlmClient>) {
        let (engine, store) = engine_with(tents(7));
        let mock = Arc::new(mock);
        let categories = engine.matcher().catalog().categories().to_vec();
        let classifier = IntentClassifier::new(mock.clone(), &categories);
        (engine.with_classifier(classifier), store, mock)
    }

    async fn send(engine: &ConversationEngine, text: &str, now: DateTime<Utc>) -> Vec<ReplyFragment> {
        engine.handle(&Inbound::new(USER, text), now).await.fragments
    }

    /// First contact only greets; prime the session so the next message is processed.
    async fn primed(engine: &ConversationEngine) -> DateTime<Utc> {
        let now = Utc::now();
        send(engine, "hi", now).await;
        now
    }

    fn texts(fragments: &[ReplyFragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.text.as_str()).collect()
    }

    // --- session lifecycle ---

    #[tokio::test]
    async fn test_first_contact_greets_without_processing() {
        let (engine, store) = engine_with(tents(7));
        let reply = send(&engine, "tent", Utc::now()).await;

        assert_eq!(reply.len(), 1);
        assert!(reply[0].text.starts_with("Hi there!"));
        let session = store.get(USER).await.unwrap().unwrap();
        assert!(!session.has_matches());
    }

    #[tokio::test]
    async fn test_first_contact_uses_profile_name() {
        let (engine, store) = engine_with(tents(1));
        let inbound = Inbound {
            display_name: Some("Ayesha".into()),
            ..Inbound::new(USER, "hello")
        };
        let reply = engine.handle(&inbound, Utc::now()).await;
        assert!(reply.fragments[0].text.starts_with("Hi Ayesha!"));
        let session = store.get(USER).await.unwrap().unwrap();
        assert_eq!(session.display_name.as_deref(), Some("Ayesha"));
    }

    #[tokio::test]
    async fn test_expired_session_behaves_like_new() {
        let (engine, store) = engine_with(tents(7));
        let start = primed(&engine).await;
        send(&engine, "tent", start).await;

        let later = start + Duration::seconds(901);
        let reply = send(&engine, "more", later).await;
        assert_eq!(reply.len(), 1);
        assert!(reply[0].text.starts_with("Hi there!"));

        let session = store.get(USER).await.unwrap().unwrap();
        assert!(!session.has_matches());
        assert_eq!(session.page, 0);
        assert_eq!(session.last_activity, later);
    }

    #[tokio::test]
    async fn test_activity_within_timeout_keeps_session() {
        let (engine, store) = engine_with(tents(7));
        let start = primed(&engine).await;
        send(&engine, "tent", start + Duration::seconds(600)).await;
        let reply = send(&engine, "more", start + Duration::seconds(1200)).await;

        assert!(reply[0].text.starts_with("6. T6"));
        let session = store.get(USER).await.unwrap().unwrap();
        assert_eq!(session.page, 1);
    }

    #[tokio::test]
    async fn test_greeting_resets_matches_keeps_identity() {
        let (engine, store) = engine_with(tents(7));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;
        send(&engine, "2", now).await;

        let reply = send(&engine, "Hello!", now).await;
        assert_eq!(reply.len(), 1);
        let session = store.get(USER).await.unwrap().unwrap();
        assert!(!session.has_matches());
        assert_eq!(session.viewed_models, vec!["T2".to_string()]);
    }

    // --- pagination ---

    #[tokio::test]
    async fn test_seven_items_paginate_in_two_pages() {
        let (engine, _) = engine_with(tents(7));
        let now = primed(&engine).await;

        let first = send(&engine, "tent", now).await;
        assert_eq!(first.len(), 6);
        for (i, fragment) in first[..5].iter().enumerate() {
            assert!(fragment.text.starts_with(&format!("{}. T{}", i + 1, i + 1)));
        }
        assert_eq!(first[5].text, PhraseBook::default().more_hint);

        let second = send(&engine, "more", now).await;
        assert_eq!(second.len(), 3);
        assert!(second[0].text.starts_with("6. T6"));
        assert!(second[1].text.starts_with("7. T7"));
        assert_eq!(second[2].text, PhraseBook::default().select_hint);
    }

    #[tokio::test]
    async fn test_more_at_end_does_not_advance() {
        let (engine, store) = engine_with(tents(7));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;
        send(&engine, "more", now).await;

        let reply = send(&engine, "MORE", now).await;
        assert_eq!(reply.len(), 1);
        assert!(reply[0].text.contains("Tent, Stove"));
        assert_eq!(store.get(USER).await.unwrap().unwrap().page, 1);
    }

    #[tokio::test]
    async fn test_short_list_hints_selection() {
        let (engine, _) = engine_with(tents(2));
        let now = primed(&engine).await;
        let reply = send(&engine, "tent", now).await;
        assert_eq!(texts(&reply)[2], PhraseBook::default().select_hint);
    }

    #[tokio::test]
    async fn test_no_results_lists_categories() {
        let (engine, store) = engine_with(tents(2));
        let now = primed(&engine).await;
        let reply = send(&engine, "kayak", now).await;
        assert_eq!(reply.len(), 1);
        assert!(reply[0].text.contains("Tent, Stove"));
        assert!(!store.get(USER).await.unwrap().unwrap().has_matches());
    }

    #[tokio::test]
    async fn test_more_without_matches_is_a_query() {
        let (engine, _) = engine_with(tents(2));
        let now = primed(&engine).await;
        let reply = send(&engine, "more", now).await;
        assert!(reply[0].text.contains("Tent, Stove"));
    }

    #[tokio::test]
    async fn test_cards_carry_media() {
        let (engine, _) = engine_with(tents(2));
        let now = primed(&engine).await;
        let reply = send(&engine, "tent", now).await;
        assert_eq!(
            reply[0].media_url.as_deref(),
            Some("https://example.com/t0.jpg")
        );
        assert!(reply[1].media_url.is_none());
    }

    // --- selection ---

    #[tokio::test]
    async fn test_select_by_number() {
        let (engine, store) = engine_with(tents(7));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;

        let reply = send(&engine, "7", now).await;
        assert_eq!(reply.len(), 1);
        assert!(reply[0].text.starts_with("7. T7"));

        let session = store.get(USER).await.unwrap().unwrap();
        assert_eq!(session.viewed_models, vec!["T7".to_string()]);
        assert_eq!(session.current_matches.len(), 7); // selection keeps the list
    }

    #[tokio::test]
    async fn test_select_first_item_has_media() {
        let (engine, _) = engine_with(tents(3));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;
        let reply = send(&engine, "1", now).await;
        assert!(reply[0].media_url.is_some());
    }

    #[tokio::test]
    async fn test_select_out_of_range() {
        let (engine, store) = engine_with(tents(3));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;

        for bad in ["0", "4", "99999999999999999999999"] {
            let reply = send(&engine, bad, now).await;
            assert_eq!(texts(&reply), vec![PhraseBook::default().invalid_selection.as_str()]);
        }
        assert!(store.get(USER).await.unwrap().unwrap().viewed_models.is_empty());
    }

    #[tokio::test]
    async fn test_selection_matches_most_recent_results() {
        let (engine, store) = engine_with(tents(7));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;
        let session = store.get(USER).await.unwrap().unwrap();

        for i in 1..=session.current_matches.len() {
            let reply = send(&engine, &i.to_string(), now).await;
            let expected = format_product(i - 1, &session.current_matches[i - 1]);
            assert_eq!(reply[0].text, expected);
        }
    }

    // --- local intents ---

    #[tokio::test]
    async fn test_catalog_question_lists_categories() {
        let (engine, _) = engine_with(tents(1));
        let now = primed(&engine).await;
        let reply = send(&engine, "What do you sell?", now).await;
        assert_eq!(reply.len(), 1);
        assert_eq!(reply[0].text, "Here's what we carry:\n• Tent\n• Stove");
    }

    #[test]
    fn test_greeting_detection() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("hello 👋"));
        assert!(is_greeting("assalam-o-alaikum!"));
        assert!(!is_greeting("hi do you have tents"));
    }

    #[test]
    fn test_catalog_question_detection() {
        assert!(is_catalog_question("what do you have?"));
        assert!(is_catalog_question("can you show me the categories"));
        assert!(is_catalog_question("catalog"));
        assert!(!is_catalog_question("what do you have in tents"));
    }

    // --- delegated classification ---

    #[tokio::test]
    async fn test_classifier_product_search_uses_filters() {
        let (engine, store, _) = classified(MockLlmClient::new(vec![
            r#"{"intent":"product_search","category":"stove"}"#.to_string(),
        ]));
        let now = primed(&engine).await;
        let reply = send(&engine, "khana pakane wala", now).await;

        assert!(reply[0].text.starts_with("1. S1"));
        let session = store.get(USER).await.unwrap().unwrap();
        assert_eq!(session.current_matches.len(), 1);
    }

    #[tokio::test]
    async fn test_classifier_admin_intents_are_canned() {
        let phrases = PhraseBook::default();
        let cases = [
            ("discount_request", phrases.discount.clone()),
            ("store_info", phrases.store_info.clone()),
            ("abuse", phrases.abuse.clone()),
            ("warranty_info", phrases.warranty.clone()),
            ("unknown", phrases.unknown.clone()),
        ];
        for (label, expected) in cases {
            let (engine, store, _) = classified(MockLlmClient::new(vec![format!(
                r#"{{"intent":"{label}"}}"#
            )]));
            let now = primed(&engine).await;
            let reply = send(&engine, "something", now).await;
            assert_eq!(texts(&reply), vec![expected.as_str()], "intent {label}");
            assert!(!store.get(USER).await.unwrap().unwrap().has_matches());
        }
    }

    #[tokio::test]
    async fn test_classifier_show_categories() {
        let (engine, _, _) = classified(MockLlmClient::new(vec![
            r#"{"intent":"show_categories"}"#.to_string(),
        ]));
        let now = primed(&engine).await;
        let reply = send(&engine, "aap kya bechte ho", now).await;
        assert!(reply[0].text.starts_with("Here's what we carry:"));
    }

    #[tokio::test]
    async fn test_classifier_timeout_keeps_matches() {
        let (engine, store, _) = classified(MockLlmClient::with_results(vec![
            Ok(r#"{"intent":"product_search","category":"tent"}"#.to_string()),
            Err(LlmError::Timeout),
        ]));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;
        let before = store.get(USER).await.unwrap().unwrap().current_matches;

        let reply = send(&engine, "stove please", now).await;
        assert_eq!(texts(&reply), vec![PhraseBook::default().api_timeout.as_str()]);
        let after = store.get(USER).await.unwrap().unwrap().current_matches;
        assert_eq!(before, after);
        assert_eq!(after.len(), 7);
    }

    #[tokio::test]
    async fn test_local_heuristics_skip_classifier() {
        let (engine, _, mock) = classified(MockLlmClient::new(vec![
            r#"{"intent":"product_search","category":"tent"}"#.to_string(),
        ]));
        let now = primed(&engine).await;
        send(&engine, "tent", now).await;
        send(&engine, "more", now).await;
        send(&engine, "3", now).await;
        send(&engine, "what do you sell", now).await;
        assert_eq!(mock.call_count(), 1);
    }

    // --- boundary ---

    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn get(&self, _user_id: &str) -> Result<Option<SessionState>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn put(&self, _state: SessionState) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_yields_fallback_reply() {
        let matcher = CatalogMatcher::new(catalog(tents(1)), SynonymTable::default(), 1.25);
        let engine = ConversationEngine::new(matcher, Arc::new(FailingStore))
            .with_phrases(PhraseBook::default().with_selector(Arc::new(FixedSelector(0))));

        let reply = engine.handle(&Inbound::new(USER, "tent"), Utc::now()).await;
        assert_eq!(texts(&reply.fragments), vec![PhraseBook::default().fallback[0].as_str()]);
    }

    #[tokio::test]
    async fn test_empty_message() {
        let (engine, _) = engine_with(tents(1));
        let now = primed(&engine).await;
        let reply = send(&engine, "   ", now).await;
        assert_eq!(texts(&reply), vec![PhraseBook::default().unknown.as_str()]);
    }

    // --- page_slice ---

    fn hits(n: usize) -> Vec<MatchedProduct> {
        tents(n)
            .into_iter()
            .map(|product| MatchedProduct {
                product,
                include_rent: false,
            })
            .collect()
    }

    #[test]
    fn test_page_slice_past_end_is_empty() {
        let matches = hits(7);
        assert_eq!(page_slice(&matches, 1).len(), 2);
        assert!(page_slice(&matches, 2).is_empty());
        assert!(page_slice(&matches, usize::MAX).is_empty());
    }

    proptest! {
        #[test]
        fn prop_pages_reconstruct_matches(n in 0usize..40) {
            let matches = hits(n);
            let pages = n.div_ceil(PAGE_SIZE);
            let rebuilt: Vec<MatchedProduct> = (0..pages)
                .flat_map(|page| page_slice(&matches, page).to_vec())
                .collect();
            prop_assert_eq!(rebuilt, matches);
        }
    }
}
