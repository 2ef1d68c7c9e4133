use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Placeholder for a field the listing card did not carry.
pub const NOT_AVAILABLE: &str = "N/A";

// ── Raw listing card ──────────────────────────────────────────────────────────

/// One listing card as scraped: verbatim text, nothing validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProduct {
    pub title: String,
    pub price: String,
    pub rating: String,
    pub colors: String,
    pub size: String,
    pub gender: String,
    /// Captured when the card was parsed, not when the page was fetched.
    pub timestamp: NaiveDateTime,
}

impl RawProduct {
    /// Stand-in for a card that could not be read. Every field is "N/A", so
    /// the transform stage always drops it.
    pub fn unavailable(timestamp: NaiveDateTime) -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            rating: NOT_AVAILABLE.to_string(),
            colors: NOT_AVAILABLE.to_string(),
            size: NOT_AVAILABLE.to_string(),
            gender: NOT_AVAILABLE.to_string(),
            timestamp,
        }
    }

    /// Field name / value pairs in column order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Title", self.title.as_str()),
            ("Price", self.price.as_str()),
            ("Rating", self.rating.as_str()),
            ("Colors", self.colors.as_str()),
            ("Size", self.size.as_str()),
            ("Gender", self.gender.as_str()),
        ]
    }
}

pub fn capture_time() -> NaiveDateTime {
    Local::now().naive_local()
}

// ── Cleaned product ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CleanedProduct {
    pub title: String,
    /// Rupiah.
    pub price: f64,
    pub rating: f64,
    pub colors: u64,
    pub size: String,
    pub gender: String,
    pub timestamp: NaiveDateTime,
}

pub const COLUMNS: [&str; 7] = ["Title", "Price", "Rating", "Colors", "Size", "Gender", "Timestamp"];

impl CleanedProduct {
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            title: self.title.clone(),
            price: float_key(self.price),
            rating: float_key(self.rating),
            colors: self.colors,
            size: self.size.clone(),
            gender: self.gender.clone(),
        }
    }
}

/// Everything except the timestamp: two captures of one listing share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    title: String,
    price: u64,
    rating: u64,
    colors: u64,
    size: String,
    gender: String,
}

// 0.0 and -0.0 compare equal, so they must hash equal too.
fn float_key(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}
