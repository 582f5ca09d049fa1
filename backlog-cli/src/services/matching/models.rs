use serde::Serialize;

/// How a title was matched to a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact, // Same title after normalization
    Fuzzy, // Similarity score at or above the threshold
}

impl MatchType {
    /// Get display label for match type
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Exact => "[Exact]",
            MatchType::Fuzzy => "[Fuzzy]",
        }
    }
}

/// A catalog entry chosen for a candidate title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleMatch {
    pub catalog_id: i64,
    pub score: u8, // 0-100
    pub match_type: MatchType,
}

impl TitleMatch {
    pub fn exact(catalog_id: i64) -> Self {
        Self {
            catalog_id,
            score: 100,
            match_type: MatchType::Exact,
        }
    }

    pub fn fuzzy(catalog_id: i64, score: u8) -> Self {
        Self {
            catalog_id,
            score,
            match_type: MatchType::Fuzzy,
        }
    }
}
