use crate::store::{parse_timestamp, Store, StoreError};
use chrono::Utc;
use codex_core::{CachedSearchResult, ToolDescriptor};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

/// Query → match list cache. Staleness is checked on read; nothing is evicted.
pub struct SearchCache {
    store: Arc<Store>,
    window: chrono::Duration,
}

impl SearchCache {
    pub fn new(store: Arc<Store>, window: chrono::Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> chrono::Duration {
        self.window
    }

    /// Cached matches if the entry is younger than the freshness window.
    pub fn get(&self, query: &str) -> Result<Option<Vec<ToolDescriptor>>, StoreError> {
        let now = Utc::now();
        Ok(self
            .entry(query)?
            .filter(|entry| entry.is_fresh(now, self.window))
            .map(|entry| entry.matches))
    }

    pub fn put(&self, query: &str, matches: &[ToolDescriptor]) -> Result<CachedSearchResult, StoreError> {
        let results = serde_json::to_string(matches)?;
        let created_at = Utc::now();

        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO search_cache (query, results, created_at) VALUES (?1, ?2, ?3)",
                params![query, results, created_at.to_rfc3339()],
            )?;
            Ok(())
        })?;

        Ok(CachedSearchResult {
            query: query.to_string(),
            matches: matches.to_vec(),
            created_at,
        })
    }

    /// Raw entry, fresh or not.
    pub fn entry(&self, query: &str) -> Result<Option<CachedSearchResult>, StoreError> {
        let row: Option<(String, String)> = self.store.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT results, created_at FROM search_cache WHERE query = ?1",
                    params![query],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?)
        })?;

        match row {
            Some((results, created_at)) => Ok(Some(CachedSearchResult {
                query: query.to_string(),
                matches: serde_json::from_str(&results)?,
                created_at: parse_timestamp(&created_at)?,
            })),
            None => Ok(None),
        }
    }
}
