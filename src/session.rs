//! Per-user conversation sessions.
//!
//! A session holds the current result list and pagination cursor for one
//! sender. Sessions are never deleted; they expire logically once
//! `last_activity` is older than the inactivity timeout, and the engine
//! replaces an expired session with a fresh one.
//!
//! Storage sits behind [`SessionStore`] so a persistent backend can replace
//! [`InMemorySessionStore`] without touching the conversation engine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::matcher::MatchedProduct;

/// Default inactivity timeout: 15 minutes.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::seconds(900);

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user_id: String,
    pub last_activity: DateTime<Utc>,
    pub current_matches: Vec<MatchedProduct>,
    pub page: usize,
    pub display_name: Option<String>,
    /// Models the user opened by number, oldest first.
    pub viewed_models: Vec<String>,
    pub last_query: Option<String>,
}

impl SessionState {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            last_activity: now,
            current_matches: Vec::new(),
            page: 0,
            display_name: None,
            viewed_models: Vec::new(),
            last_query: None,
        }
    }

    /// Expired once strictly more than `timeout` has passed since the last turn.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }

    /// Drop the result list and cursor; identity and history are kept.
    pub fn reset_search(&mut self) {
        self.current_matches.clear();
        self.page = 0;
        self.last_query = None;
    }

    pub fn has_matches(&self) -> bool {
        !self.current_matches.is_empty()
    }

    /// Replace the result list with a new search and rewind the cursor.
    pub fn start_search(&mut self, query: &str, matches: Vec<MatchedProduct>) {
        self.current_matches = matches;
        self.page = 0;
        self.last_query = Some(query.to_string());
    }

    /// Move to the next page if one exists. Returns whether the cursor moved.
    pub fn advance_page(&mut self, page_size: usize) -> bool {
        let next_start = (self.page + 1) * page_size;
        if next_start < self.current_matches.len() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Look up a 1-based selection in the current result list.
    pub fn select(&self, ordinal: usize) -> Option<&MatchedProduct> {
        ordinal
            .checked_sub(1)
            .and_then(|index| self.current_matches.get(index))
    }
}

// ============================================================================
// Session Store
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session backend unavailable: {0}")]
    Unavailable(String),
}

/// Keyed storage for [`SessionState`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<SessionState>, StoreError>;

    /// Insert or replace the session for `state.user_id`.
    async fn put(&self, state: SessionState) -> Result<(), StoreError>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> Result<Option<SessionState>, StoreError> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn put(&self, state: SessionState) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(state.user_id.clone(), state);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
