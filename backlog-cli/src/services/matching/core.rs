//! Core title matching functions
//! Priority: Exact (normalized) → Fuzzy (best score at or above threshold)

use super::models::TitleMatch;
use crate::import::CatalogEntry;
use crate::services::similarity;

/// Minimum similarity for a title to count as the same game
pub const TITLE_MATCH_THRESHOLD: u8 = 90;

/// Find the catalog entry a title refers to
///
/// Exact matches after normalization win outright. Otherwise the entry with
/// the highest similarity is chosen if it reaches the threshold; on ties the
/// entry listed first wins.
pub fn match_title(title: &str, entries: &[CatalogEntry]) -> Option<TitleMatch> {
    let needle = similarity::normalize(title);
    if needle.is_empty() {
        return None;
    }

    // 1. Exact normalized title
    if let Some(entry) = entries
        .iter()
        .find(|e| similarity::normalize(&e.title) == needle)
    {
        return Some(TitleMatch::exact(entry.id));
    }

    // 2. Best fuzzy score
    let (idx, score) = similarity::best_of(title, entries.iter().map(|e| e.title.as_str()))?;
    if score >= TITLE_MATCH_THRESHOLD {
        Some(TitleMatch::fuzzy(entries[idx].id, score))
    } else {
        None
    }
}
