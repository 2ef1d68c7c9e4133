//! Transform stage: raw listing cards → validated, deduplicated products.
//!
//! Single pass over the input. A record is dropped when any field is a
//! placeholder token, when price or rating do not clean, or when an earlier
//! record already has the same identity key. First occurrence wins, so the
//! output keeps input order and the earliest timestamp.

use crate::config::TransformConfig;
use crate::error::Reject;
use crate::models::{CleanedProduct, IdentityKey, RawProduct};
use crate::scraper::cleaner::{clean_color_count, clean_price, clean_rating, is_invalid_token};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformStats {
    pub input: usize,
    pub kept: usize,
    pub invalid: usize,
    pub duplicates: usize,
}

pub fn transform(raw: &[RawProduct], config: &TransformConfig) -> (Vec<CleanedProduct>, TransformStats) {
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut stats = TransformStats { input: raw.len(), ..Default::default() };

    for (i, item) in raw.iter().enumerate() {
        match clean_record(item, config).and_then(|p| dedup(p, &mut seen)) {
            Ok(product) => cleaned.push(product),
            Err(Reject::Duplicate) => {
                debug!("Record {}: duplicate of an earlier record", i);
                stats.duplicates += 1;
            }
            Err(reason) => {
                debug!("Record {}: {}", i, reason);
                stats.invalid += 1;
            }
        }
    }

    stats.kept = cleaned.len();
    info!(
        "Transformed {} records → {} kept ({} invalid, {} duplicates)",
        stats.input, stats.kept, stats.invalid, stats.duplicates
    );
    (cleaned, stats)
}

/// Validate and clean one record, without looking at its neighbours.
pub fn clean_record(item: &RawProduct, config: &TransformConfig) -> Result<CleanedProduct, Reject> {
    let fields = item.fields().map(|(name, value)| (name, value.trim()));

    if let Some(&(field, _)) = fields.iter().find(|(_, v)| is_invalid_token(v)) {
        return Err(Reject::InvalidToken { field });
    }

    let [(_, title), (_, price), (_, rating), (_, colors), (_, size), (_, gender)] = fields;

    let price = clean_price(price, config.exchange_rate).ok_or(Reject::InvalidPrice)?;
    let rating = clean_rating(rating).ok_or(Reject::InvalidRating)?;

    Ok(CleanedProduct {
        title: title.to_string(),
        price,
        rating,
        colors: clean_color_count(colors),
        size: size.to_string(),
        gender: gender.to_string(),
        timestamp: item.timestamp,
    })
}

fn dedup(product: CleanedProduct, seen: &mut HashSet<IdentityKey>) -> Result<CleanedProduct, Reject> {
    if seen.insert(product.identity()) {
        Ok(product)
    } else {
        Err(Reject::Duplicate)
    }
}
