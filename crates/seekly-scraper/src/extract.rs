//! Site extraction: turn one fetched document into raw items using a
//! provider's declarative rules.
//!
//! Three document shapes are handled by the same entry point:
//!
//! - listing HTML, walked card-by-card with ordered fallback selector
//!   chains per field (first non-empty match wins);
//! - per-card or page-level structured data (`application/ld+json`
//!   `Product`/`Offer` objects, with Open Graph `<meta>` tags as the
//!   secondary mapping);
//! - decoded JSON API payloads, read via fixed key paths.
//!
//! Extraction is a pure function of (document, config). A failure inside
//! one card drops that card with a debug log and never aborts the page.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::providers::{ApiRules, DomRules, FieldRule, ProviderConfig};
use crate::types::{Document, RawItem, RawPrice};

/// Extract zero or more raw items from a fetched document.
#[must_use]
pub fn extract_items(document: &Document, provider: &ProviderConfig) -> Vec<RawItem> {
    match document {
        Document::Html(html) => extract_from_html(html, provider),
        Document::Json(value) => provider
            .api
            .as_ref()
            .map(|api| extract_from_json(value, api))
            .unwrap_or_default(),
    }
}

/// Inspect the document for a next-page affordance. `Some(false)` means
/// the affordance is absent or disabled; `None` means the document cannot
/// tell (JSON payloads, providers without pagination selectors).
#[must_use]
pub fn detect_next_page(document: &Document, provider: &ProviderConfig) -> Option<bool> {
    let Document::Html(html) = document else {
        return None;
    };
    if provider.dom.next_page.is_empty() {
        return None;
    }
    let doc = Html::parse_document(html);
    let found = provider.dom.next_page.iter().any(|raw| {
        Selector::parse(raw)
            .map(|sel| doc.select(&sel).next().is_some())
            .unwrap_or(false)
    });
    Some(found)
}

fn extract_from_html(html: &str, provider: &ProviderConfig) -> Vec<RawItem> {
    let doc = Html::parse_document(html);

    // Listing cards take precedence: catalog pages carry Open Graph tags
    // describing the page itself, so the structured-data path only runs
    // when no cards match (single-product pages).
    let cards = select_cards(&doc, &provider.dom);
    if cards.is_empty() && provider.dom.page_structured {
        if let Some(item) = extract_structured_page(&doc) {
            return vec![item];
        }
    }

    let mut items = Vec::with_capacity(cards.len());
    for card in cards {
        match extract_card(card, &provider.dom) {
            Some(item) => items.push(item),
            None => {
                tracing::debug!(provider = provider.name, "skipping card with no extractable fields");
            }
        }
    }
    items
}

/// Find listing cards via the first container selector chain that matches
/// anything.
fn select_cards<'a>(doc: &'a Html, dom: &DomRules) -> Vec<ElementRef<'a>> {
    for raw in dom.listing {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let cards: Vec<ElementRef<'a>> = doc.select(&selector).collect();
        if !cards.is_empty() {
            return cards;
        }
    }
    Vec::new()
}

fn extract_card(card: ElementRef<'_>, dom: &DomRules) -> Option<RawItem> {
    if dom.card_jsonld {
        if let Some(item) = extract_card_jsonld(card) {
            return Some(item);
        }
        // Card carries no parseable structured data; fall through to the
        // field chains.
    }

    let title = first_field(card, dom.title);
    let price = first_field(card, dom.price).map(RawPrice::Display);
    // Some sites make the card itself the anchor element.
    let url = first_field(card, dom.link).or_else(|| card.value().attr("href").map(str::to_string));
    let image = first_field(card, dom.image);

    if title.is_none() && price.is_none() && url.is_none() {
        return None;
    }
    Some(RawItem {
        title,
        price,
        url,
        image,
    })
}

/// Evaluate an ordered selector chain against one card; the first rule
/// yielding non-empty text (or a non-empty attribute) wins.
fn first_field(card: ElementRef<'_>, rules: &[FieldRule]) -> Option<String> {
    for rule in rules {
        let Ok(selector) = Selector::parse(rule.selector) else {
            tracing::debug!(selector = rule.selector, "unparseable selector in rule chain");
            continue;
        };
        for element in card.select(&selector) {
            let value = match rule.attr {
                Some(attr) => element.value().attr(attr).map(str::to_string),
                None => Some(element.text().collect::<String>()),
            };
            if let Some(value) = value {
                let trimmed = collapse_whitespace(&value);
                if !trimmed.is_empty() {
                    return Some(trimmed);
                }
            }
        }
    }
    None
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Per-card JSON-LD extraction (PakWheels embeds one `Offer` blob inside
/// every listing card).
fn extract_card_jsonld(card: ElementRef<'_>) -> Option<RawItem> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    let script = card.select(&selector).next()?;
    let text: String = script.text().collect();
    let value: Value = serde_json::from_str(&text).ok()?;
    jsonld_to_item(&value)
}

/// Page-level structured data: JSON-LD `Product`/`Offer` objects first,
/// Open Graph meta tags as the secondary mapping when no structured block
/// parses.
fn extract_structured_page(doc: &Html) -> Option<RawItem> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    for script in doc.select(&selector) {
        let text: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        if let Some(item) = jsonld_to_item(&value) {
            return Some(item);
        }
    }
    extract_open_graph(doc)
}

/// Convert one JSON-LD payload (object or array-of-objects) into a raw
/// item, accepting `Product` and `Offer` typed objects.
fn jsonld_to_item(value: &Value) -> Option<RawItem> {
    let object = match value {
        Value::Array(entries) => entries.first()?,
        other => other,
    };

    let type_matches = match object.get("@type") {
        Some(Value::String(t)) => t == "Product" || t == "Offer",
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t == "Product" || t == "Offer"),
        _ => false,
    };
    if !type_matches {
        return None;
    }

    let offers = object.get("offers");
    let title = object
        .get("name")
        .and_then(Value::as_str)
        .or_else(|| object.get("description").and_then(Value::as_str))
        .map(collapse_whitespace);
    let price = offers
        .and_then(|o| o.get("price"))
        .or_else(|| object.get("price"))
        .and_then(value_as_amount)
        .map(RawPrice::Numeric);
    let url = offers
        .and_then(|o| o.get("url"))
        .or_else(|| object.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let image = match object.get("image") {
        Some(Value::String(src)) => Some(src.clone()),
        Some(Value::Array(srcs)) => srcs.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    };

    if title.is_none() && price.is_none() && url.is_none() {
        return None;
    }
    Some(RawItem {
        title,
        price,
        url,
        image,
    })
}

/// Open Graph fallback: collect `<meta property="og:..." content="...">`
/// pairs and map them through the OG field names.
fn extract_open_graph(doc: &Html) -> Option<RawItem> {
    let selector = Selector::parse("meta[property][content]").ok()?;
    let mut title = None;
    let mut image = None;
    let mut price = None;
    for meta in doc.select(&selector) {
        let (Some(property), Some(content)) =
            (meta.value().attr("property"), meta.value().attr("content"))
        else {
            continue;
        };
        match property {
            "og:title" => title = Some(collapse_whitespace(content)),
            "og:image" => image = Some(content.to_string()),
            "og:price:amount" => price = parse_amount(content).map(RawPrice::Numeric),
            _ => {}
        }
    }

    if title.is_none() && price.is_none() {
        return None;
    }
    Some(RawItem {
        title,
        price,
        url: None,
        image,
    })
}

/// JSON API payload extraction via fixed key paths.
fn extract_from_json(value: &Value, api: &ApiRules) -> Vec<RawItem> {
    let Some(items) = lookup(value, api.items_path).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|entry| {
            let title = lookup_string(entry, api.title_path);
            let price = lookup_string(entry, api.price_display_path)
                .map(RawPrice::Display)
                .or_else(|| {
                    lookup(entry, api.price_raw_path)
                        .and_then(value_as_amount)
                        .map(RawPrice::Numeric)
                });
            let url = lookup_string(entry, api.url_path)
                .or_else(|| lookup_string(entry, api.slug_path).map(|slug| format!("/item/{slug}")));
            let image = lookup_string(entry, api.image_path);

            if title.is_none() && price.is_none() && url.is_none() {
                tracing::debug!("skipping API entry with no extractable fields");
                return None;
            }
            Some(RawItem {
                title,
                price,
                url,
                image,
            })
        })
        .collect()
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

fn lookup_string(value: &Value, path: &[&str]) -> Option<String> {
    lookup(value, path)
        .and_then(Value::as_str)
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}

/// Prices appear as numbers or as digit strings depending on the site.
fn value_as_amount(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn parse_amount(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
