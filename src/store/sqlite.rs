use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use serde::de::DeserializeOwned;

use crate::app::{PlatescoutError, Result};
use crate::domain::{ReconciledRestaurant, SourceRecord, StoredSummary};
use crate::store::{Store, Upserted};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| PlatescoutError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            PlatescoutError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn find_document<T: DeserializeOwned>(conn: &Connection, table: &str, name: &str) -> Result<Option<T>> {
        let document: Option<String> = conn
            .query_row(
                &format!("SELECT document FROM {} WHERE name = ?1", table),
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn exists(conn: &Connection, table: &str, name: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE name = ?1", table),
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn summaries(conn: &Connection, table: &str, kind: &'static str) -> Result<Vec<StoredSummary>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT name, updated_at FROM {} ORDER BY name COLLATE NOCASE",
            table
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(StoredSummary {
                name: row.get(0)?,
                kind,
                updated_at: row
                    .get::<_, String>(1)
                    .ok()
                    .and_then(|s| Self::parse_datetime(&s))
                    .unwrap_or_else(Utc::now),
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl Store for SqliteStore {
    fn find_restaurant(&self, name: &str) -> Result<Option<ReconciledRestaurant>> {
        let conn = self.lock()?;
        Self::find_document(&conn, "restaurants", name)
    }

    fn insert_restaurant(&self, restaurant: &ReconciledRestaurant) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO restaurants (name, document, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![
                restaurant.restaurant_name,
                serde_json::to_string(restaurant)?,
                now
            ],
        )?;

        Ok(())
    }

    fn update_restaurant(&self, restaurant: &ReconciledRestaurant) -> Result<()> {
        let conn = self.lock()?;

        let changed = conn.execute(
            "UPDATE restaurants SET document = ?2, updated_at = ?3 WHERE name = ?1",
            params![
                restaurant.restaurant_name,
                serde_json::to_string(restaurant)?,
                Utc::now().to_rfc3339()
            ],
        )?;

        if changed == 0 {
            return Err(PlatescoutError::RestaurantNotFound(
                restaurant.restaurant_name.clone(),
            ));
        }
        Ok(())
    }

    fn find_place(&self, name: &str) -> Result<Option<SourceRecord>> {
        let conn = self.lock()?;
        Self::find_document(&conn, "places", name)
    }

    fn upsert_place(&self, name: &str, place: &SourceRecord) -> Result<Upserted> {
        let conn = self.lock()?;
        let existed = Self::exists(&conn, "places", name)?;

        conn.execute(
            "INSERT INTO places (name, document, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(name) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
            params![name, serde_json::to_string(place)?, Utc::now().to_rfc3339()],
        )?;

        Ok(if existed {
            Upserted::Updated
        } else {
            Upserted::Inserted
        })
    }

    fn list(&self) -> Result<Vec<StoredSummary>> {
        let conn = self.lock()?;
        let mut summaries = Self::summaries(&conn, "restaurants", "restaurant")?;
        summaries.extend(Self::summaries(&conn, "places", "place")?);
        Ok(summaries)
    }
}
