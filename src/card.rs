//! Product cards: the text block sent for each search hit.

use crate::catalog::{NOT_APPLICABLE, ProductRecord};
use crate::matcher::MatchedProduct;

/// Render a hit as a multi-line card. `index` is 0-based; the card shows
/// `index + 1`.
///
/// The rent line only appears when the search asked to rent. Fields the
/// catalog does not track render as [`NOT_APPLICABLE`].
pub fn format_product(index: usize, hit: &MatchedProduct) -> String {
    let p = &hit.product;
    let mut lines = vec![
        format!(
            "{}. {} ({} - {})",
            index + 1,
            p.model,
            p.category,
            or_na(p.product_type.as_deref())
        ),
        format!("👥 Size: {}", p.size_or_people),
        format!("💸 Price: {}", buy_price(p)),
    ];
    if hit.include_rent {
        lines.push(format!(
            "💼 Rent: {}",
            p.rent_price.map_or_else(|| NOT_APPLICABLE.to_string(), format_amount)
        ));
    }
    lines.push(format!("🛡️ Warranty: {}", or_na(p.warranty.as_deref())));
    lines.push(format!("📦 Stock: {}", p.stock));
    lines.join("\n")
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_APPLICABLE)
}

fn buy_price(p: &ProductRecord) -> String {
    if p.is_priced() {
        format_amount(p.buy_price)
    } else {
        NOT_APPLICABLE.to_string()
    }
}

/// Whole amounts without decimals, everything else with two.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}
