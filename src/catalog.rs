//! Product catalog: typed records and the validated loader.
//!
//! The catalog is maintained as a spreadsheet and exported to JSON (one
//! object per row, keyed by the sheet's column headers). It is loaded once
//! at startup; any invalid row aborts the load so the bot never serves a
//! partial catalog.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;

// ============================================================================
// Constants
// ============================================================================

/// Marker rendered for optional fields the catalog does not track.
pub const NOT_APPLICABLE: &str = "N/A";

/// Sentinel buy price for rows with an empty `Buy Price` cell.
pub const UNPRICED: f64 = 0.0;

/// Stock assumed for rows with an empty `Instock` cell.
pub const DEFAULT_STOCK: u32 = 0;

// ============================================================================
// Product Record
// ============================================================================

/// One catalog row. Immutable after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub model: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub product_type: Option<String>,
    pub size_or_people: String,
    pub buy_price: f64,
    pub rent_price: Option<f64>,
    pub stock: u32,
    pub image_url: Option<String>,
    pub warranty: Option<String>,
}

impl ProductRecord {
    /// Minimal record with every optional field at its default.
    pub fn new(model: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            category: category.into(),
            subcategory: None,
            product_type: None,
            size_or_people: NOT_APPLICABLE.to_string(),
            buy_price: UNPRICED,
            rent_price: None,
            stock: DEFAULT_STOCK,
            image_url: None,
            warranty: None,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.buy_price > UNPRICED
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// The in-memory product list, in sheet order.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    categories: Vec<String>,
}

impl Catalog {
    /// Load and validate a JSON export of the catalog sheet.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            products = catalog.len(),
            categories = catalog.categories.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and validate catalog rows from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let rows: Vec<RawRow> = serde_json::from_str(json)?;
        let products = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| row.into_record(i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        if products.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::from_products(products))
    }

    pub fn from_products(products: Vec<ProductRecord>) -> Self {
        // Deduplicate case-insensitively, keeping the first spelling seen.
        let mut seen: IndexMap<String, String> = IndexMap::new();
        for product in &products {
            seen.entry(product.category.to_lowercase())
                .or_insert_with(|| product.category.clone());
        }

        Self {
            products,
            categories: seen.into_values().collect(),
        }
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// ============================================================================
// Raw Rows
// ============================================================================

/// A spreadsheet cell. Exports emit numbers for numeric cells but users
/// routinely type prices as text ("2,500"), so both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn text(&self) -> Option<String> {
        match self {
            Self::Number(n) if n.fract() == 0.0 => Some(format!("{n:.0}")),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    fn number(&self, row: usize, column: &str) -> Result<Option<f64>, CatalogError> {
        match self {
            Self::Number(n) => Ok(Some(*n)),
            Self::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() {
                    return Ok(None);
                }
                cleaned
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| CatalogError::InvalidRow {
                        row,
                        reason: format!("{column} is not a number: '{s}'"),
                    })
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(rename = "Category")]
    category: Option<Cell>,
    #[serde(rename = "Subcategory")]
    subcategory: Option<Cell>,
    #[serde(rename = "Type")]
    product_type: Option<Cell>,
    #[serde(rename = "Model")]
    model: Option<Cell>,
    #[serde(rename = "People/Size")]
    size_or_people: Option<Cell>,
    #[serde(rename = "Buy Price")]
    buy_price: Option<Cell>,
    #[serde(rename = "Rent Price")]
    rent_price: Option<Cell>,
    #[serde(rename = "Instock")]
    stock: Option<Cell>,
    #[serde(rename = "Image URL")]
    image_url: Option<Cell>,
    #[serde(rename = "Warranty")]
    warranty: Option<Cell>,
}

fn text_of(cell: &Option<Cell>) -> Option<String> {
    cell.as_ref().and_then(Cell::text)
}

fn number_of(cell: &Option<Cell>, row: usize, column: &str) -> Result<Option<f64>, CatalogError> {
    match cell {
        Some(c) => c.number(row, column),
        None => Ok(None),
    }
}

impl RawRow {
    fn into_record(self, row: usize) -> Result<ProductRecord, CatalogError> {
        let model = text_of(&self.model).ok_or_else(|| CatalogError::InvalidRow {
            row,
            reason: "Model is empty".into(),
        })?;
        let category = text_of(&self.category).ok_or_else(|| CatalogError::InvalidRow {
            row,
            reason: "Category is empty".into(),
        })?;

        let buy_price = number_of(&self.buy_price, row, "Buy Price")?.unwrap_or(UNPRICED);
        if buy_price < 0.0 {
            return Err(CatalogError::InvalidRow {
                row,
                reason: format!("Buy Price is negative: {buy_price}"),
            });
        }

        let stock = match number_of(&self.stock, row, "Instock")? {
            None => DEFAULT_STOCK,
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => n as u32,
            Some(n) => {
                return Err(CatalogError::InvalidRow {
                    row,
                    reason: format!("Instock must be a whole non-negative number, got {n}"),
                });
            }
        };

        Ok(ProductRecord {
            model,
            category,
            subcategory: text_of(&self.subcategory),
            product_type: text_of(&self.product_type),
            size_or_people: text_of(&self.size_or_people)
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            buy_price,
            rent_price: number_of(&self.rent_price, row, "Rent Price")?,
            stock,
            image_url: text_of(&self.image_url),
            warranty: text_of(&self.warranty),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
