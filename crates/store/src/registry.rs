use crate::store::{parse_timestamp, Store, StoreError};
use codex_core::{ToolDescriptor, ToolManifest, ToolStatus};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const SELECT_COLUMNS: &str =
    "SELECT tool_id, name, description, server, methods, schemas, status, last_check FROM tool_registry";

struct RawDescriptor {
    id: String,
    name: String,
    description: String,
    server: String,
    methods: String,
    schemas: String,
    status: String,
    last_check: String,
}

impl RawDescriptor {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            server: row.get(3)?,
            methods: row.get(4)?,
            schemas: row.get(5)?,
            status: row.get(6)?,
            last_check: row.get(7)?,
        })
    }

    fn into_descriptor(self) -> Result<ToolDescriptor, StoreError> {
        let supported_methods: BTreeSet<String> = serde_json::from_str(&self.methods)?;
        let argument_schemas: BTreeMap<String, serde_json::Value> = serde_json::from_str(&self.schemas)?;
        let status = ToolStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown status {:?}", self.status)))?;

        Ok(ToolDescriptor {
            id: self.id,
            name: self.name,
            description: self.description,
            executable_path: self.server,
            supported_methods,
            argument_schemas,
            status,
            last_check: parse_timestamp(&self.last_check)?,
        })
    }
}

/// Durable set of tool descriptors, replaced wholesale on reload.
pub struct ToolRegistry {
    store: Arc<Store>,
}

impl ToolRegistry {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Startup load. Same replace semantics as [`ToolRegistry::reload`].
    pub fn load(&self, manifest: &ToolManifest) -> Result<usize, StoreError> {
        self.reload(manifest)
    }

    /// Replace every descriptor with the manifest's tools in one transaction.
    pub fn reload(&self, manifest: &ToolManifest) -> Result<usize, StoreError> {
        let mut rows = Vec::with_capacity(manifest.len());
        for tool in &manifest.tools {
            rows.push((
                tool,
                serde_json::to_string(&tool.supported_methods)?,
                serde_json::to_string(&tool.argument_schemas)?,
            ));
        }

        self.store.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM tool_registry", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO tool_registry
                     (tool_id, name, description, server, methods, schemas, status, last_check)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for (tool, methods, schemas) in &rows {
                    stmt.execute(params![
                        tool.id,
                        tool.name,
                        tool.description,
                        tool.executable_path,
                        methods,
                        schemas,
                        tool.status.as_str(),
                        tool.last_check.to_rfc3339(),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;

        tracing::info!("Registry now holds {} tools", rows.len());
        Ok(rows.len())
    }

    /// Active descriptor for `id`, or `StoreError::NotFound`.
    pub fn lookup(&self, id: &str) -> Result<ToolDescriptor, StoreError> {
        let raw = self.store.with_conn(|conn| {
            let sql = format!("{} WHERE tool_id = ?1 AND status = 'active'", SELECT_COLUMNS);
            Ok(conn.query_row(&sql, params![id], RawDescriptor::from_row).optional()?)
        })?;

        match raw {
            Some(raw) => raw.into_descriptor(),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    pub fn list_active(&self) -> Result<Vec<ToolDescriptor>, StoreError> {
        self.select(&format!("{} WHERE status = 'active' ORDER BY rowid", SELECT_COLUMNS))
    }

    pub fn list_all(&self) -> Result<Vec<ToolDescriptor>, StoreError> {
        self.select(&format!("{} ORDER BY rowid", SELECT_COLUMNS))
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.store.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM tool_registry", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    fn select(&self, sql: &str) -> Result<Vec<ToolDescriptor>, StoreError> {
        let raws = self.store.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map([], RawDescriptor::from_row)?;
            let mut raws = Vec::new();
            for row in rows {
                raws.push(row?);
            }
            Ok(raws)
        })?;

        raws.into_iter().map(RawDescriptor::into_descriptor).collect()
    }
}
