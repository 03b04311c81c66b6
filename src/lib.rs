//! Catalog Bot: shared library for the webhook server and the CLI.

pub mod card;
pub mod catalog;
pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod llm;
pub mod matcher;
pub mod phrases;
pub mod reply;
pub mod server;
pub mod session;
pub mod synonyms;

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::BotConfig;
use crate::conversation::ConversationEngine;
use crate::intent::IntentClassifier;
use crate::llm::GeminiClient;
use crate::matcher::CatalogMatcher;
use crate::session::InMemorySessionStore;
use crate::synonyms::SynonymTable;

/// Load the catalog and assemble an engine from configuration.
///
/// The classifier is attached only when an API key is configured; without
/// one the bot answers from local heuristics alone.
pub fn build_engine(config: &BotConfig) -> Result<ConversationEngine, error::CatalogError> {
    let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
    let synonyms = SynonymTable::default().with_threshold(config.fuzzy_threshold);
    let matcher = CatalogMatcher::new(catalog.clone(), synonyms, config.price_tolerance);

    let mut engine = ConversationEngine::new(matcher, Arc::new(InMemorySessionStore::new()))
        .with_session_timeout(config.session_timeout);

    match &config.gemini_api_key {
        Some(key) => {
            let llm = GeminiClient::new(key.clone())
                .with_model(config.gemini_model.clone())
                .with_timeout(config.classifier_timeout);
            engine = engine.with_classifier(IntentClassifier::new(Arc::new(llm), catalog.categories()));
            info!(model = %config.gemini_model, "Intent classifier enabled");
        }
        None => warn!("GEMINI_API_KEY not set; using local intent heuristics only"),
    }

    Ok(engine)
}
