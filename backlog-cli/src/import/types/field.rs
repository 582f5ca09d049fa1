//! The fixed catalog schema: canonical fields and their enumerations

use serde::{Deserialize, Serialize};

use super::Value;

/// One of the fixed attributes a catalog entry may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Title,
    Status,
    HypeScore,
    Rating,
    Progress,
    PlaytimeHours,
    FinishYear,
    ReleaseYear,
    Price,
    Platform,
    SteamDeck,
    Notes,
}

/// Storage type of a canonical field, used by write-time validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Year,
    Decimal,
    Flag,
    Status,
    Progress,
}

impl CanonicalField {
    /// All fields in schema order
    pub const ALL: [CanonicalField; 12] = [
        CanonicalField::Title,
        CanonicalField::Status,
        CanonicalField::HypeScore,
        CanonicalField::Rating,
        CanonicalField::Progress,
        CanonicalField::PlaytimeHours,
        CanonicalField::FinishYear,
        CanonicalField::ReleaseYear,
        CanonicalField::Price,
        CanonicalField::Platform,
        CanonicalField::SteamDeck,
        CanonicalField::Notes,
    ];

    /// Column/key name (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Title => "title",
            CanonicalField::Status => "status",
            CanonicalField::HypeScore => "hype_score",
            CanonicalField::Rating => "rating",
            CanonicalField::Progress => "progress",
            CanonicalField::PlaytimeHours => "playtime_hours",
            CanonicalField::FinishYear => "finish_year",
            CanonicalField::ReleaseYear => "release_year",
            CanonicalField::Price => "price",
            CanonicalField::Platform => "platform",
            CanonicalField::SteamDeck => "steam_deck",
            CanonicalField::Notes => "notes",
        }
    }

    /// Parse from the snake_case key name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            CanonicalField::Title | CanonicalField::Platform | CanonicalField::Notes => {
                FieldKind::Text
            }
            CanonicalField::HypeScore => FieldKind::Integer,
            CanonicalField::FinishYear | CanonicalField::ReleaseYear => FieldKind::Year,
            CanonicalField::Rating | CanonicalField::PlaytimeHours | CanonicalField::Price => {
                FieldKind::Decimal
            }
            CanonicalField::SteamDeck => FieldKind::Flag,
            CanonicalField::Status => FieldKind::Status,
            CanonicalField::Progress => FieldKind::Progress,
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which list a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Backlog,
    Finished,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Backlog => "backlog",
            GameStatus::Finished => "finished",
        }
    }

    /// Parse the exact stored representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "backlog" => Some(GameStatus::Backlog),
            "finished" => Some(GameStatus::Finished),
            _ => None,
        }
    }

    /// Loose interpretation of a free-text status cell
    ///
    /// Anything mentioning "finish" or "terminado" counts as finished.
    pub fn from_sheet_text(s: &str) -> Self {
        let lower = s.to_lowercase();
        if lower.contains("finish") || lower.contains("terminado") {
            GameStatus::Finished
        } else {
            GameStatus::Backlog
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("status must be 'backlog' or 'finished', got '{}'", s))
    }
}

impl From<GameStatus> for Value {
    fn from(status: GameStatus) -> Self {
        Value::String(status.as_str().to_string())
    }
}

/// How far into a game the player got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameProgress {
    #[serde(rename = "Empezado")]
    Started,
    #[serde(rename = "A mitad")]
    Halfway,
    #[serde(rename = "Avanzado")]
    Advanced,
    #[serde(rename = "Terminado")]
    Finished,
}

impl GameProgress {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameProgress::Started => "Empezado",
            GameProgress::Halfway => "A mitad",
            GameProgress::Advanced => "Avanzado",
            GameProgress::Finished => "Terminado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Empezado" => Some(GameProgress::Started),
            "A mitad" => Some(GameProgress::Halfway),
            "Avanzado" => Some(GameProgress::Advanced),
            "Terminado" => Some(GameProgress::Finished),
            _ => None,
        }
    }
}

impl From<GameProgress> for Value {
    fn from(progress: GameProgress) -> Self {
        Value::String(progress.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::parse(field.as_str()), Some(field));
        }
        assert_eq!(CanonicalField::parse("unknown"), None);
    }

    #[test]
    fn test_status_from_sheet_text() {
        assert_eq!(GameStatus::from_sheet_text("Finished!"), GameStatus::Finished);
        assert_eq!(GameStatus::from_sheet_text("TERMINADO"), GameStatus::Finished);
        assert_eq!(GameStatus::from_sheet_text("Pendiente"), GameStatus::Backlog);
    }

    #[test]
    fn test_enums_convert_to_scalar() {
        assert_eq!(Value::from(GameStatus::Finished), Value::from("finished"));
        assert_eq!(Value::from(GameProgress::Halfway), Value::from("A mitad"));
    }
}
