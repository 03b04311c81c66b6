//! Catalog matching for free-form product queries.
//!
//! A query is normalized through the [`SynonymTable`], filtered against the
//! catalog (by explicit classifier filters or by substring tests on the
//! row's category, subcategory and type), narrowed by an optional price
//! ceiling, and ordered by stock so in-stock items come first.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, ProductRecord};
use crate::synonyms::SynonymTable;

/// Default multiplier applied to a price ceiling that matched nothing.
pub const DEFAULT_PRICE_TOLERANCE: f64 = 1.25;

/// Query tokens starting with any of these signal rental intent.
const RENT_KEYWORDS: &[&str] = &["rent", "borrow", "kiraye"];

/// A standalone 3-5 digit amount, optionally written with a thousands
/// separator ("2,500").
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2},\d{3}\b|\b\d{3,5}\b").expect("price pattern is valid")
});

// ============================================================================
// Types
// ============================================================================

/// Pre-classified constraints, usually supplied by the intent classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilters {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub price_limit: Option<f64>,
}

/// A search hit. `include_rent` is set when the query asked to rent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedProduct {
    pub product: ProductRecord,
    pub include_rent: bool,
}

// ============================================================================
// Matcher
// ============================================================================

#[derive(Debug, Clone)]
pub struct CatalogMatcher {
    catalog: Arc<Catalog>,
    synonyms: SynonymTable,
    price_tolerance: f64,
}

impl CatalogMatcher {
    /// The catalog's own categories, subcategories and types are added to
    /// the synonym table's protected vocabulary.
    pub fn new(catalog: Arc<Catalog>, synonyms: SynonymTable, price_tolerance: f64) -> Self {
        let synonyms = synonyms.with_vocabulary(catalog.products().iter().flat_map(|p| {
            [
                Some(p.category.as_str()),
                p.subcategory.as_deref(),
                p.product_type.as_deref(),
            ]
            .into_iter()
            .flatten()
        }));
        Self {
            catalog,
            synonyms,
            price_tolerance,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run a query against the catalog.
    ///
    /// Results are ordered by stock, highest first; rows with equal stock
    /// keep their catalog order.
    pub fn search(&self, query: &str, filters: &MatchFilters) -> Vec<MatchedProduct> {
        let normalized = self.synonyms.normalize(query);

        let mut rows: Vec<&ProductRecord> = if has_explicit_filter(filters) {
            self.catalog
                .products()
                .iter()
                .filter(|p| matches_filters(p, filters))
                .collect()
        } else {
            self.catalog
                .products()
                .iter()
                .filter(|p| mentioned_in(p, &normalized))
                .collect()
        };

        let ceiling = filters.price_limit.or_else(|| extract_price_limit(&normalized));
        if let Some(ceiling) = ceiling {
            rows = apply_price_ceiling(rows, ceiling, self.price_tolerance);
        }

        // `sort_by` is stable, so ties keep catalog order.
        rows.sort_by(|a, b| b.stock.cmp(&a.stock));

        let include_rent = wants_rental(&normalized);
        debug!(
            query = %normalized,
            ?ceiling,
            include_rent,
            hits = rows.len(),
            "Catalog search"
        );

        rows.into_iter()
            .map(|p| MatchedProduct {
                product: p.clone(),
                include_rent,
            })
            .collect()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn has_explicit_filter(filters: &MatchFilters) -> bool {
    filters.category.is_some() || filters.subcategory.is_some()
}

fn eq_ignore_case(field: Option<&str>, wanted: &str) -> bool {
    field.is_some_and(|f| f.trim().eq_ignore_ascii_case(wanted.trim()))
}

fn matches_filters(product: &ProductRecord, filters: &MatchFilters) -> bool {
    let category_ok = filters
        .category
        .as_deref()
        .is_none_or(|c| eq_ignore_case(Some(product.category.as_str()), c));
    let subcategory_ok = filters
        .subcategory
        .as_deref()
        .is_none_or(|s| eq_ignore_case(product.subcategory.as_deref(), s));
    category_ok && subcategory_ok
}

/// True when the row's category, subcategory or type appears in the query.
fn mentioned_in(product: &ProductRecord, query: &str) -> bool {
    [
        Some(product.category.as_str()),
        product.subcategory.as_deref(),
        product.product_type.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::to_lowercase)
    .any(|field| !field.is_empty() && query.contains(&field))
}

/// Pull the first standalone 3-5 digit amount out of a query.
pub fn extract_price_limit(query: &str) -> Option<f64> {
    PRICE_RE
        .find(query)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// Keep rows priced at or under `ceiling`. If none qualify, retry once at
/// `ceiling * tolerance`. The relaxed ceiling is always derived from the
/// face value, never from a previously relaxed one.
pub fn apply_price_ceiling<'a>(
    rows: Vec<&'a ProductRecord>,
    ceiling: f64,
    tolerance: f64,
) -> Vec<&'a ProductRecord> {
    let within = |limit: f64| -> Vec<&'a ProductRecord> {
        rows.iter()
            .copied()
            .filter(|p| p.is_priced() && p.buy_price <= limit)
            .collect()
    };

    let exact = within(ceiling);
    if !exact.is_empty() {
        return exact;
    }
    within(ceiling * tolerance)
}

pub fn wants_rental(query: &str) -> bool {
    query
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| RENT_KEYWORDS.iter().any(|k| token.starts_with(k)))
}

// ============================================================================
// Tests
// ============================================================================
