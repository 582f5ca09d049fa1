//! Header to canonical field proposals
//!
//! Spreadsheet exports name their columns in whatever language and spelling
//! the author used. Each canonical field carries a list of known aliases and
//! every sheet header is scored against them; the best header is proposed
//! when it clears [`HEADER_MATCH_THRESHOLD`], otherwise the field is left for
//! the user to map by hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CanonicalField, is_unnamed};
use crate::services::similarity;

/// A header is proposed only when its score is strictly above this
pub const HEADER_MATCH_THRESHOLD: u8 = 60;

/// Number of runner-up headers kept per field
const MAX_ALTERNATIVES: usize = 2;

/// Known header spellings per field
pub const FIELD_ALIASES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Title, &["Title", "Título", "Juego", "Game", "Nombre"]),
    (CanonicalField::Status, &["Status", "Estado", "Lista", "List"]),
    (CanonicalField::HypeScore, &["Hype", "Ganas", "Score", "Puntuación"]),
    (CanonicalField::Rating, &["Rating", "Nota", "Score", "Puntuación"]),
    (CanonicalField::Progress, &["Progress", "Progreso", "Estado Juego"]),
    (
        CanonicalField::PlaytimeHours,
        &["Playtime", "Horas", "Tiempo", "Hours", "Duration"],
    ),
    (
        CanonicalField::FinishYear,
        &["Finish Year", "Año Terminado", "Terminado", "Finished"],
    ),
    (
        CanonicalField::ReleaseYear,
        &["Release Year", "Año Lanzamiento", "Lanzamiento", "Released"],
    ),
    (CanonicalField::Price, &["Price", "Precio", "Coste"]),
    (
        CanonicalField::Platform,
        &["Platform", "Plataforma", "Consola", "System"],
    ),
    (CanonicalField::SteamDeck, &["Steam Deck", "Deck", "Portable"]),
    (CanonicalField::Notes, &["Notes", "Notas", "Comentarios"]),
];

/// Aliases registered for a field
pub fn aliases(field: CanonicalField) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, a)| *a)
        .unwrap_or(&[])
}

/// Best guess for one canonical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingProposal {
    /// Set only when `score` is above the threshold
    pub selected_header: Option<String>,
    /// Score of the top header, 0-100
    pub score: u8,
    /// Up to two runner-up headers, best first
    pub alternatives: Vec<String>,
}

/// Propose a header for every canonical field
///
/// Synthesized `Unnamed:N` headers never take part. With no usable headers
/// the proposal is empty.
pub fn propose_mapping(headers: &[String]) -> BTreeMap<CanonicalField, MappingProposal> {
    let candidates: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|h| !is_unnamed(h))
        .collect();

    let mut proposals = BTreeMap::new();
    if candidates.is_empty() {
        return proposals;
    }

    for (field, field_aliases) in FIELD_ALIASES {
        let mut scored: Vec<(&str, u8)> = candidates
            .iter()
            .map(|header| (*header, header_score(header, field_aliases)))
            .collect();
        // Stable: equal scores keep sheet order
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let (top_header, top_score) = scored[0];
        let proposal = MappingProposal {
            selected_header: (top_score > HEADER_MATCH_THRESHOLD).then(|| top_header.to_string()),
            score: top_score,
            alternatives: scored
                .iter()
                .skip(1)
                .take(MAX_ALTERNATIVES)
                .map(|(h, _)| h.to_string())
                .collect(),
        };

        log::debug!(
            "Field {}: best header {:?} ({}), selected: {}",
            field,
            top_header,
            top_score,
            proposal.selected_header.is_some()
        );
        proposals.insert(*field, proposal);
    }

    proposals
}

/// Selected headers only, as a column mapping
pub fn selected_columns(
    proposals: &BTreeMap<CanonicalField, MappingProposal>,
) -> BTreeMap<CanonicalField, String> {
    proposals
        .iter()
        .filter_map(|(field, p)| p.selected_header.clone().map(|h| (*field, h)))
        .collect()
}

fn header_score(header: &str, field_aliases: &[&str]) -> u8 {
    similarity::best_of(header, field_aliases.iter().copied())
        .map(|(_, score)| score)
        .unwrap_or(0)
}
