use crate::error::ParseError;
use crate::models::{NOT_AVAILABLE, RawProduct, capture_time};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

static CARD_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".collection-card").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".product-title").unwrap());
static PRICE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".price-container").unwrap());
static DETAIL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

// ── Listing page ──────────────────────────────────────────────────────────────

/// Every listing card on the page, in document order. No cards → empty vec.
pub fn parse_listing_page(html: &str) -> Vec<RawProduct> {
    let doc = Html::parse_document(html);
    doc.select(&CARD_SEL).map(parse_product).collect()
}

// ── Listing card ──────────────────────────────────────────────────────────────

/// Parse one card. A card that cannot be read becomes an all-"N/A" record.
pub fn parse_product(card: ElementRef<'_>) -> RawProduct {
    let timestamp = capture_time();
    try_parse_product(card, timestamp).unwrap_or_else(|e| {
        warn!("Unreadable listing card: {}", e);
        RawProduct::unavailable(timestamp)
    })
}

fn try_parse_product(
    card: ElementRef<'_>,
    timestamp: chrono::NaiveDateTime,
) -> Result<RawProduct, ParseError> {
    let title = card
        .select(&TITLE_SEL)
        .next()
        .map(text_of)
        .ok_or(ParseError::MissingTitle)?;

    let price = card
        .select(&PRICE_SEL)
        .next()
        .map(text_of)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    // rating | colors | size | gender, by position
    let details: Vec<String> = card.select(&DETAIL_SEL).map(text_of).collect();
    let detail = |i: usize, prefix: &str| {
        details
            .get(i)
            .map(|s| if prefix.is_empty() { s.clone() } else { s.replace(prefix, "") })
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    Ok(RawProduct {
        title,
        price,
        rating: detail(0, "Rating: "),
        colors: detail(1, ""),
        size: detail(2, "Size: "),
        gender: detail(3, "Gender: "),
        timestamp,
    })
}

/// Concatenated text of an element, each text node trimmed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
