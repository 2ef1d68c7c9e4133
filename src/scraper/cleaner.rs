use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Placeholder strings the catalog prints instead of real data.
pub const INVALID_TOKENS: [&str; 6] = [
    "Unknown Product",
    "Invalid Rating",
    "Not Rated",
    "Price Unavailable",
    "N/A",
    "",
];

const CURRENCY_MARKER: char = '$';

static RATING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9.]+").unwrap());

pub fn is_invalid_token(s: &str) -> bool {
    INVALID_TOKENS.contains(&s)
}

// ── Field cleaners ────────────────────────────────────────────────────────────

/// "$10" → 10 × rate. Anything without the leading "$" is not a price.
/// "$12.5" → 200000.0 (rate 16000) | "100" → None | "Free" → None
pub fn clean_price(raw: &str, exchange_rate: f64) -> Option<f64> {
    let rest = raw.trim().strip_prefix(CURRENCY_MARKER)?;
    let amount = match rest.replace(CURRENCY_MARKER, "").trim().parse::<f64>() {
        Ok(v) => v,
        Err(e) => {
            warn!("Unparseable price {:?}: {}", raw, e);
            return None;
        }
    };
    let value = amount * exchange_rate;
    if !value.is_finite() || value < 0.0 {
        warn!("Price {:?} out of range", raw);
        return None;
    }
    Some(value)
}

/// First run of digits/dots anywhere in the string.
/// "4.5" → 4.5 | "⭐ 4.8 / 5" → 4.8 | "Not Rated" → None
pub fn clean_rating(raw: &str) -> Option<f64> {
    let m = RATING_RE.find(raw)?;
    match m.as_str().parse::<f64>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Unparseable rating {:?}: {}", raw, e);
            None
        }
    }
}

/// Every digit in the string, in order, read as one integer. No digits → 0.
/// "3 Colors" → 3 | "Red, Blue, Green" → 0
/// Counts past `u64::MAX` saturate.
pub fn clean_color_count(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or_else(|e| {
        warn!("Color count {:?} does not fit: {}", raw, e);
        u64::MAX
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
