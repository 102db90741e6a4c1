//! Normalization from raw extraction output to [`SearchResult`].
//!
//! The normalizer enforces the record invariants: `url` absolute or the
//! item is dropped, `title`/`price` never empty (sentinel strings instead),
//! numeric prices rendered in display form.

use seekly_core::{SearchResult, NO_PRICE_SENTINEL, NO_TITLE_SENTINEL};

use crate::providers::ProviderConfig;
use crate::types::{RawItem, RawPrice};
use crate::urls::absolutize;

/// Convert one raw item into the canonical record shape.
///
/// Returns `None` when the item has no resolvable URL — a record that
/// cannot be clicked through is worthless, so it is dropped rather than
/// emitted with an empty link.
#[must_use]
pub fn normalize_item(raw: RawItem, provider: &ProviderConfig) -> Option<SearchResult> {
    let url = raw
        .url
        .as_deref()
        .and_then(|href| absolutize(href, provider.base_url))?;

    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| NO_TITLE_SENTINEL.to_string());

    let price = match raw.price {
        Some(RawPrice::Display(text)) if !text.trim().is_empty() => text,
        Some(RawPrice::Numeric(amount)) => format_price(amount, provider),
        _ => NO_PRICE_SENTINEL.to_string(),
    };

    let image = raw
        .image
        .as_deref()
        .and_then(|src| absolutize(src, provider.base_url));

    Some(SearchResult {
        retailer: provider.name.to_string(),
        title,
        price,
        currency: provider.currency.to_string(),
        url,
        image,
    })
}

/// Render a numeric amount in the provider's display form. Amounts above
/// the abbreviation threshold use the "Lacs" unit (1 Lac = 100,000)
/// conventional for used-vehicle prices; everything else is the bare
/// prefixed amount.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_price(amount: u64, provider: &ProviderConfig) -> String {
    if amount > provider.abbreviate_above {
        format!(
            "{} {:.2} Lacs",
            provider.price_prefix,
            amount as f64 / 100_000.0
        )
    } else {
        format!("{} {amount}", provider.price_prefix)
    }
}
