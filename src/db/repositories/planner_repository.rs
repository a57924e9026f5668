use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::str::FromStr;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::AppResult;

pub const KEY_WORK_SETTINGS: &str = "work_settings";
pub const KEY_WORK_OVERRIDES: &str = "work_overrides";
pub const KEY_COMMITMENTS: &str = "commitments";
pub const KEY_SCHEDULE_EVENTS: &str = "schedule_events";
pub const KEY_MY_CLASSES: &str = "my_classes";
pub use crate::db::migrations::KEY_PLANNER_CONFIG;

#[derive(Debug, Clone)]
pub struct PlannerDocumentRow {
    pub key: String,
    pub value: String,
    pub revision: i64,
    pub updated_at: String,
}

impl TryFrom<&Row<'_>> for PlannerDocumentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            key: row.get("key")?,
            value: row.get("value")?,
            revision: row.get("revision")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct PlannerRepository;

impl PlannerRepository {
    pub fn get(conn: &Connection, key: &str) -> AppResult<Option<PlannerDocumentRow>> {
        let mut stmt = conn.prepare(
            "SELECT key, value, revision, updated_at FROM planner_documents WHERE key = ?1",
        )?;

        let row = stmt
            .query_row([key], |row| PlannerDocumentRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<PlannerDocumentRow>> {
        let mut stmt = conn.prepare(
            "SELECT key, value, revision, updated_at FROM planner_documents ORDER BY key ASC",
        )?;

        let rows = stmt
            .query_map([], |row| PlannerDocumentRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn upsert(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO planner_documents (key, value, revision)
                VALUES (:key, :value, 1)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    revision = planner_documents.revision + 1,
                    updated_at = CURRENT_TIMESTAMP
            "#,
            named_params! {":key": key, ":value": value},
        )?;

        Ok(())
    }

    pub fn delete(conn: &Connection, key: &str) -> AppResult<()> {
        conn.execute("DELETE FROM planner_documents WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Reads a JSON document. Missing or malformed documents yield the
    /// default value so a damaged store never blocks start-up.
    pub fn load_document<T>(conn: &Connection, key: &str) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(row) = Self::get(conn, key)? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&row.value) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(
                    target: "app::db",
                    key,
                    error = %err,
                    "malformed planner document, using defaults"
                );
                Ok(T::default())
            }
        }
    }

    /// Reads a JSON array element by element. Elements that do not decode
    /// are skipped so one damaged entry never costs the rest of the list.
    pub fn load_list<T: DeserializeOwned>(conn: &Connection, key: &str) -> AppResult<Vec<T>> {
        let raw: Vec<Value> = Self::load_document(conn, key)?;
        let total = raw.len();

        let items: Vec<T> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(target: "app::db", key, index, error = %err, "skipping malformed list entry");
                    None
                }
            })
            .collect();

        if items.len() != total {
            warn!(target: "app::db", key, kept = items.len(), total, "planner list partially loaded");
        }
        Ok(items)
    }

    /// Reads a JSON object entry by entry, skipping entries whose key or
    /// value does not decode.
    pub fn load_map<K, V>(conn: &Connection, key: &str) -> AppResult<BTreeMap<K, V>>
    where
        K: FromStr + Ord,
        V: DeserializeOwned,
    {
        let raw: serde_json::Map<String, Value> = Self::load_document(conn, key)?;

        let entries = raw
            .into_iter()
            .filter_map(|(entry_key, value)| {
                let Ok(parsed_key) = entry_key.parse::<K>() else {
                    warn!(target: "app::db", key, entry = %entry_key, "skipping entry with malformed key");
                    return None;
                };
                match serde_json::from_value(value) {
                    Ok(parsed) => Some((parsed_key, parsed)),
                    Err(err) => {
                        warn!(target: "app::db", key, entry = %entry_key, error = %err, "skipping malformed entry");
                        None
                    }
                }
            })
            .collect();
        Ok(entries)
    }

    pub fn save_document<T: Serialize>(conn: &Connection, key: &str, value: &T) -> AppResult<()> {
        let encoded = serde_json::to_string(value)?;
        Self::upsert(conn, key, &encoded)
    }
}
