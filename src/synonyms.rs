//! Synonym normalization for free-form queries.
//!
//! Customers write in a mix of English and transliterated Urdu, with plenty
//! of typos. Each query token is mapped onto the catalog's vocabulary before
//! matching: an exact hit in the synonym table wins, otherwise the closest
//! table key by Damerau-Levenshtein similarity is used if it clears the
//! threshold. Words the catalog already uses are never rewritten.

use std::collections::HashSet;

use indexmap::IndexMap;

/// Default minimum normalized Damerau-Levenshtein similarity for a fuzzy
/// synonym hit. At this level a single edit is tolerated from seven
/// characters up.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Tokens shorter than this are only ever matched exactly.
const MIN_FUZZY_LEN: usize = 3;

/// Shorter/longer character count below which a key is not a candidate.
const MIN_LENGTH_RATIO: f64 = 0.8;

/// Colloquial or misspelled term -> catalog vocabulary.
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("tambu", "tent"),
    ("tambo", "tent"),
    ("khaima", "tent"),
    ("jaket", "jacket"),
    ("jacet", "jacket"),
    ("coat", "jacket"),
    ("sleepingbag", "sleeping bag"),
    ("bistar", "sleeping bag"),
    ("rucksack", "backpack"),
    ("bagpack", "backpack"),
    ("joota", "shoes"),
    ("jootay", "shoes"),
    ("boots", "shoes"),
    ("chulha", "stove"),
    ("burner", "stove"),
    ("torch", "flashlight"),
    ("lamp", "lantern"),
    ("kursi", "chair"),
];

/// Ordered synonym table. Order breaks ties between equally similar keys.
///
/// `vocabulary` holds words that are already canonical: every word of every
/// table value, plus whatever the catalog contributes through
/// [`SynonymTable::with_vocabulary`]. Those words pass through unchanged.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: IndexMap<String, String>,
    vocabulary: HashSet<String>,
    threshold: f64,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_SYNONYMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
            DEFAULT_FUZZY_THRESHOLD,
        )
    }
}

impl SynonymTable {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>, threshold: f64) -> Self {
        let entries: IndexMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
        let vocabulary = entries
            .values()
            .flat_map(|v| v.split_whitespace())
            .map(str::to_string)
            .collect();
        Self {
            entries,
            vocabulary,
            threshold,
        }
    }

    /// Empty table: normalization only lowercases.
    pub fn empty() -> Self {
        Self::new(std::iter::empty(), DEFAULT_FUZZY_THRESHOLD)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Protect the words of `terms` (category names and the like) from
    /// being rewritten.
    pub fn with_vocabulary<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            self.vocabulary.extend(
                term.as_ref()
                    .to_lowercase()
                    .split_whitespace()
                    .map(str::to_string),
            );
        }
        self
    }

    /// Lowercase `text` and canonicalize each whitespace-separated token.
    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .map(|token| self.normalize_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn normalize_token(&self, token: &str) -> String {
        // Keep surrounding punctuation ("tambu?" -> "tent?").
        let start = token
            .find(|c: char| c.is_alphanumeric())
            .unwrap_or(token.len());
        let end = token
            .rfind(|c: char| c.is_alphanumeric())
            .map(|i| i + token[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(start);
        if start >= end {
            return token.to_string();
        }

        let (prefix, rest) = token.split_at(start);
        let (core, suffix) = rest.split_at(end - start);

        match self.lookup(core) {
            Some(canonical) => format!("{prefix}{canonical}{suffix}"),
            None => token.to_string(),
        }
    }

    fn lookup(&self, word: &str) -> Option<&str> {
        if self.vocabulary.contains(word) {
            return None;
        }
        if let Some(canonical) = self.entries.get(word) {
            return Some(canonical.as_str());
        }

        let len = word.chars().count();
        if len < MIN_FUZZY_LEN || word.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        // "sleeping" and "bag" are unfinished "sleepingbag" / "bagpack", not typos.
        if self.entries.keys().any(|key| key.starts_with(word)) {
            return None;
        }

        let mut best: Option<(f64, &str)> = None;
        for (key, canonical) in &self.entries {
            if length_ratio(len, key.chars().count()) < MIN_LENGTH_RATIO {
                continue;
            }
            let score = strsim::normalized_damerau_levenshtein(word, key);
            if score >= self.threshold && best.is_none_or(|(s, _)| score > s) {
                best = Some((score, canonical.as_str()));
            }
        }
        best.map(|(_, canonical)| canonical)
    }
}

fn length_ratio(a: usize, b: usize) -> f64 {
    let (short, long) = if a <= b { (a, b) } else { (b, a) };
    if long == 0 {
        return 1.0;
    }
    short as f64 / long as f64
}

// ============================================================================
// Tests
// ============================================================================
