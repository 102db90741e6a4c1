//! Canonical cross-provider record shape.

use serde::{Deserialize, Serialize};

/// Title shown when a listing card carries no recognizable title.
pub const NO_TITLE_SENTINEL: &str = "No title available";

/// Price shown when a listing card carries no recognizable price.
pub const NO_PRICE_SENTINEL: &str = "Price not available";

/// A single normalized listing, independent of the site it came from.
///
/// `price` is a display string (currency symbols allowed), not a numeric
/// value — sites render prices in wildly different forms ("Rs 25.00 Lacs",
/// "PKR 1,500") and the consumer only ever displays it. `title` and `price`
/// are never empty: extraction substitutes [`NO_TITLE_SENTINEL`] /
/// [`NO_PRICE_SENTINEL`] rather than omitting the field. `url` is always
/// absolute; items whose URL cannot be resolved are dropped before they
/// reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider display name, e.g. `"OLX"` or `"PakWheels"`.
    pub retailer: String,
    pub title: String,
    /// Display-form price, e.g. `"Rs 25.00 Lacs"`.
    pub price: String,
    /// ISO-ish currency code, e.g. `"PKR"`.
    pub currency: String,
    /// Absolute URL of the listing detail page.
    pub url: String,
    /// Absolute image URL, when the card carries one.
    pub image: Option<String>,
}
