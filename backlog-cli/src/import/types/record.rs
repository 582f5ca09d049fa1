//! Candidate records, catalog entries, and write-time validation

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{CanonicalField, FieldKind, GameProgress, GameStatus, RowValidationError, Value};

/// Field values resolved for one row, before reconciliation
///
/// Only non-null values are kept; a record without a title is unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateRecord {
    fields: BTreeMap<CanonicalField, Value>,
}

impl CandidateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value; null values are dropped
    pub fn set(&mut self, field: CanonicalField, value: Value) {
        if value.is_null() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, value);
        }
    }

    /// Builder form of [`CandidateRecord::set`]
    pub fn with(mut self, field: CanonicalField, value: impl Into<Value>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn get(&self, field: CanonicalField) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Title rendered as text, if present and not blank
    pub fn title(&self) -> Option<String> {
        let value = self.fields.get(&CanonicalField::Title)?;
        let text = value.key_string();
        if text.trim().is_empty() { None } else { Some(text) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(CanonicalField, Value)> for CandidateRecord {
    fn from_iter<I: IntoIterator<Item = (CanonicalField, Value)>>(iter: I) -> Self {
        let mut record = CandidateRecord::new();
        for (field, value) in iter {
            record.set(field, value);
        }
        record
    }
}

/// A persisted catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub status: GameStatus,
    pub hype_score: Option<i64>,
    pub rating: Option<f64>,
    pub progress: Option<GameProgress>,
    pub playtime_hours: Option<f64>,
    pub finish_year: Option<i64>,
    pub release_year: Option<i64>,
    pub price: Option<f64>,
    pub platform: Option<String>,
    pub steam_deck: bool,
    pub notes: Option<String>,
}

impl CatalogEntry {
    /// Materialize a new entry once the store has assigned its id
    pub fn from_new(id: i64, owner_id: i64, new: NewEntry) -> Self {
        CatalogEntry {
            id,
            owner_id,
            title: new.title,
            status: new.status,
            hype_score: new.hype_score,
            rating: new.rating,
            progress: new.progress,
            playtime_hours: new.playtime_hours,
            finish_year: new.finish_year,
            release_year: new.release_year,
            price: new.price,
            platform: new.platform,
            steam_deck: new.steam_deck,
            notes: new.notes,
        }
    }

    /// Current value of a field, with enums normalized to their scalar form
    pub fn value(&self, field: CanonicalField) -> Value {
        match field {
            CanonicalField::Title => Value::from(self.title.as_str()),
            CanonicalField::Status => Value::from(self.status),
            CanonicalField::HypeScore => Value::from(self.hype_score),
            CanonicalField::Rating => Value::from(self.rating),
            CanonicalField::Progress => Value::from(self.progress),
            CanonicalField::PlaytimeHours => Value::from(self.playtime_hours),
            CanonicalField::FinishYear => Value::from(self.finish_year),
            CanonicalField::ReleaseYear => Value::from(self.release_year),
            CanonicalField::Price => Value::from(self.price),
            CanonicalField::Platform => Value::from(self.platform.clone()),
            CanonicalField::SteamDeck => Value::from(self.steam_deck),
            CanonicalField::Notes => Value::from(self.notes.clone()),
        }
    }

    /// Full field snapshot (every canonical field, nulls included)
    pub fn snapshot(&self) -> BTreeMap<CanonicalField, Value> {
        CanonicalField::ALL
            .iter()
            .map(|f| (*f, self.value(*f)))
            .collect()
    }

    /// Apply a validated patch in place
    pub fn apply(&mut self, patch: &EntryPatch) {
        for (field, value) in patch.iter() {
            match field {
                CanonicalField::Title => {
                    if let Some(s) = value.as_str() {
                        self.title = s.to_string();
                    }
                }
                CanonicalField::Status => {
                    if let Some(status) = value.as_str().and_then(GameStatus::parse) {
                        self.status = status;
                    }
                }
                CanonicalField::HypeScore => self.hype_score = value.as_int(),
                CanonicalField::Rating => self.rating = value.as_float(),
                CanonicalField::Progress => {
                    self.progress = value.as_str().and_then(GameProgress::parse)
                }
                CanonicalField::PlaytimeHours => self.playtime_hours = value.as_float(),
                CanonicalField::FinishYear => self.finish_year = value.as_int(),
                CanonicalField::ReleaseYear => self.release_year = value.as_int(),
                CanonicalField::Price => self.price = value.as_float(),
                CanonicalField::Platform => self.platform = value.as_str().map(String::from),
                CanonicalField::SteamDeck => {
                    if let Some(b) = value.as_bool() {
                        self.steam_deck = b;
                    }
                }
                CanonicalField::Notes => self.notes = value.as_str().map(String::from),
            }
        }
    }
}

/// A validated entry ready to be created in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub status: GameStatus,
    pub hype_score: Option<i64>,
    pub rating: Option<f64>,
    pub progress: Option<GameProgress>,
    pub playtime_hours: Option<f64>,
    pub finish_year: Option<i64>,
    pub release_year: Option<i64>,
    pub price: Option<f64>,
    pub platform: Option<String>,
    pub steam_deck: bool,
    pub notes: Option<String>,
}

impl NewEntry {
    /// Validate candidate values into a new entry
    ///
    /// `status` falls back to `default_status` when absent.
    pub fn from_values<'a>(
        values: impl IntoIterator<Item = (CanonicalField, &'a Value)>,
        default_status: GameStatus,
    ) -> Result<Self, RowValidationError> {
        let mut entry = NewEntry {
            title: String::new(),
            status: default_status,
            hype_score: None,
            rating: None,
            progress: None,
            playtime_hours: None,
            finish_year: None,
            release_year: None,
            price: None,
            platform: None,
            steam_deck: false,
            notes: None,
        };

        for (field, raw) in values {
            let value = coerce(field, raw)?;
            match field {
                CanonicalField::Title => {
                    entry.title = value.as_str().map(String::from).unwrap_or_default()
                }
                CanonicalField::Status => {
                    if let Some(status) = value.as_str().and_then(GameStatus::parse) {
                        entry.status = status;
                    }
                }
                CanonicalField::HypeScore => entry.hype_score = value.as_int(),
                CanonicalField::Rating => entry.rating = value.as_float(),
                CanonicalField::Progress => {
                    entry.progress = value.as_str().and_then(GameProgress::parse)
                }
                CanonicalField::PlaytimeHours => entry.playtime_hours = value.as_float(),
                CanonicalField::FinishYear => entry.finish_year = value.as_int(),
                CanonicalField::ReleaseYear => entry.release_year = value.as_int(),
                CanonicalField::Price => entry.price = value.as_float(),
                CanonicalField::Platform => entry.platform = value.as_str().map(String::from),
                CanonicalField::SteamDeck => entry.steam_deck = value.as_bool().unwrap_or(false),
                CanonicalField::Notes => entry.notes = value.as_str().map(String::from),
            }
        }

        if entry.title.trim().is_empty() {
            return Err(RowValidationError::new(
                CanonicalField::Title,
                "title is required",
            ));
        }

        Ok(entry)
    }
}

/// A validated partial update
///
/// Values are held in their canonical shape: integers as `Int`, decimals as
/// `Float`, enumerations as their stored string. `Null` clears a nullable
/// field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryPatch {
    fields: BTreeMap<CanonicalField, Value>,
}

impl EntryPatch {
    /// Validate raw values into a patch
    pub fn from_values<'a>(
        values: impl IntoIterator<Item = (CanonicalField, &'a Value)>,
    ) -> Result<Self, RowValidationError> {
        let mut fields = BTreeMap::new();
        for (field, raw) in values {
            if raw.is_null() && !is_nullable(field) {
                return Err(RowValidationError::new(field, "value cannot be null"));
            }
            fields.insert(field, coerce(field, raw)?);
        }
        Ok(EntryPatch { fields })
    }

    pub fn get(&self, field: CanonicalField) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn is_nullable(field: CanonicalField) -> bool {
    !matches!(
        field,
        CanonicalField::Title | CanonicalField::Status | CanonicalField::SteamDeck
    )
}

/// Coerce a raw value into the canonical shape of `field`
///
/// Null passes through unchanged; nullability is the caller's concern.
pub fn coerce(field: CanonicalField, raw: &Value) -> Result<Value, RowValidationError> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let invalid = |what: &str| RowValidationError::new(field, format!("expected {}, got '{}'", what, raw));

    match field.kind() {
        FieldKind::Text => match raw {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Int(_) | Value::Float(_) => Ok(Value::String(raw.to_string())),
            _ => Err(invalid("text")),
        },
        FieldKind::Integer => coerce_int(raw).map(Value::Int).ok_or_else(|| invalid("an integer")),
        FieldKind::Year => {
            let year = coerce_year(raw).ok_or_else(|| invalid("a year"))?;
            if (1000..=9999).contains(&year) {
                Ok(Value::Int(year))
            } else {
                Err(invalid("a four-digit year"))
            }
        }
        FieldKind::Decimal => match raw {
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float)
                .ok_or_else(|| invalid("a number")),
            _ => Err(invalid("a number")),
        },
        FieldKind::Flag => coerce_flag(raw).map(Value::Bool).ok_or_else(|| invalid("a boolean")),
        FieldKind::Status => raw
            .as_str()
            .and_then(GameStatus::parse)
            .map(Value::from)
            .ok_or_else(|| invalid("'backlog' or 'finished'")),
        FieldKind::Progress => raw
            .as_str()
            .and_then(GameProgress::parse)
            .map(Value::from)
            .ok_or_else(|| invalid("one of Empezado, A mitad, Avanzado, Terminado")),
    }
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Whole number, or the year of a `YYYY-MM-DD` date cell
fn coerce_year(raw: &Value) -> Option<i64> {
    coerce_int(raw).or_else(|| {
        let date = raw.as_str()?.trim().get(..10)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| i64::from(d.year()))
    })
}

fn coerce_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "t" | "on" | "1" => Some(true),
            "false" | "no" | "n" | "f" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
