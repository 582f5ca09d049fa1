//! SQLite-backed catalog store

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::CatalogStore;
use crate::import::{CatalogEntry, EntryPatch, GameProgress, GameStatus, NewEntry, Value};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS catalog_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'backlog',
    hype_score INTEGER,
    rating REAL,
    progress TEXT,
    playtime_hours REAL,
    finish_year INTEGER,
    release_year INTEGER,
    price REAL,
    platform TEXT,
    steam_deck INTEGER NOT NULL DEFAULT 0,
    notes TEXT
)";

const COLUMNS: &str = "id, owner_id, title, status, hype_score, rating, progress, playtime_hours,
     finish_year, release_year, price, platform, steam_deck, notes";

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Open (creating if needed) the database file and its table
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open catalog database: {}", path.display()))?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database, one connection so every query sees it
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database URL")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory catalog database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to create catalog schema")?;
        Ok(Self { pool })
    }

    async fn fetch(&self, id: i64, owner_id: i64) -> Result<Option<CatalogEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM catalog_entries WHERE id = ? AND owner_id = ?",
            COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get catalog entry")?;

        row.as_ref().map(entry_from_row).transpose()
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list_entries(
        &self,
        owner_id: i64,
        status: Option<GameStatus>,
    ) -> Result<Vec<CatalogEntry>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {} FROM catalog_entries WHERE owner_id = ? AND status = ? ORDER BY id",
                    COLUMNS
                ))
                .bind(owner_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM catalog_entries WHERE owner_id = ? ORDER BY id",
                    COLUMNS
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list catalog entries")?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn create_entry(&self, owner_id: i64, entry: NewEntry) -> Result<CatalogEntry> {
        let result = sqlx::query(
            "INSERT INTO catalog_entries (owner_id, title, status, hype_score, rating, progress,
                 playtime_hours, finish_year, release_year, price, platform, steam_deck, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(&entry.title)
        .bind(entry.status.as_str())
        .bind(entry.hype_score)
        .bind(entry.rating)
        .bind(entry.progress.map(|p| p.as_str()))
        .bind(entry.playtime_hours)
        .bind(entry.finish_year)
        .bind(entry.release_year)
        .bind(entry.price)
        .bind(&entry.platform)
        .bind(entry.steam_deck)
        .bind(&entry.notes)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to create catalog entry '{}'", entry.title))?;

        Ok(CatalogEntry::from_new(result.last_insert_rowid(), owner_id, entry))
    }

    async fn update_entry(
        &self,
        id: i64,
        owner_id: i64,
        patch: &EntryPatch,
    ) -> Result<Option<CatalogEntry>> {
        if patch.is_empty() {
            return self.fetch(id, owner_id).await;
        }

        // Column names come from the closed field set, never from input
        let assignments: Vec<String> = patch
            .iter()
            .map(|(field, _)| format!("{} = ?", field.as_str()))
            .collect();
        let sql = format!(
            "UPDATE catalog_entries SET {} WHERE id = ? AND owner_id = ?",
            assignments.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in patch.iter() {
            query = match value {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::Int(i) => query.bind(*i),
                Value::Float(f) => query.bind(*f),
                Value::String(s) => query.bind(s.clone()),
            };
        }

        let result = query
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update catalog entry {}", id))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id, owner_id).await
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<CatalogEntry> {
    let status: String = row.try_get("status")?;
    let progress: Option<String> = row.try_get("progress")?;

    Ok(CatalogEntry {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        status: GameStatus::parse(&status)
            .with_context(|| format!("Unknown status '{}' in catalog", status))?,
        hype_score: row.try_get("hype_score")?,
        rating: row.try_get("rating")?,
        progress: match progress {
            Some(p) => Some(
                GameProgress::parse(&p)
                    .with_context(|| format!("Unknown progress '{}' in catalog", p))?,
            ),
            None => None,
        },
        playtime_hours: row.try_get("playtime_hours")?,
        finish_year: row.try_get("finish_year")?,
        release_year: row.try_get("release_year")?,
        price: row.try_get("price")?,
        platform: row.try_get("platform")?,
        steam_deck: row.try_get("steam_deck")?,
        notes: row.try_get("notes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::CanonicalField;

    fn new_entry(title: &str) -> NewEntry {
        NewEntry::from_values(
            [
                (CanonicalField::Title, &Value::from(title)),
                (CanonicalField::Progress, &Value::from("A mitad")),
                (CanonicalField::SteamDeck, &Value::Bool(true)),
            ],
            GameStatus::Backlog,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_round_trip() {
        let store = SqliteCatalog::in_memory().await.unwrap();
        let created = store.create_entry(1, new_entry("Hades")).await.unwrap();
        store.create_entry(2, new_entry("Celeste")).await.unwrap();

        let listed = store.list_entries(1, None).await.unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].progress, Some(GameProgress::Halfway));
        assert!(listed[0].steam_deck);

        assert!(store.list_entries(1, Some(GameStatus::Finished)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_sets_and_clears_fields() {
        let store = SqliteCatalog::in_memory().await.unwrap();
        let created = store.create_entry(1, new_entry("Hades")).await.unwrap();

        let patch = EntryPatch::from_values([
            (CanonicalField::Rating, &Value::Int(9)),
            (CanonicalField::Status, &Value::from("finished")),
            (CanonicalField::Progress, &Value::Null),
        ])
        .unwrap();
        let updated = store.update_entry(created.id, 1, &patch).await.unwrap().unwrap();

        assert_eq!(updated.rating, Some(9.0));
        assert_eq!(updated.status, GameStatus::Finished);
        assert_eq!(updated.progress, None);
    }

    #[tokio::test]
    async fn test_update_unknown_entry_is_none() {
        let store = SqliteCatalog::in_memory().await.unwrap();
        let patch = EntryPatch::from_values([(CanonicalField::Rating, &Value::Float(1.0))]).unwrap();
        assert!(store.update_entry(42, 1, &patch).await.unwrap().is_none());
    }
}
