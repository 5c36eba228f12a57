//! SQLite-backed row store

use super::{ExtensionFilter, ExtensionQuery, ExtensionStore};
use crate::error::{Error, Result};
use crate::types::{ColumnValue, ExtensionColumn, ExtensionRow, UpdateSite};
use camino::Utf8Path;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

const EXTENSION_COLUMNS: &str = "extension_id, package_id, name, type, element, folder, \
     client_id, enabled, access, protected, locked, manifest_cache, params, custom_data, \
     state, note";

/// Platform tables in an SQLite database
pub struct SqliteStore {
    conn: Connection,
    prefix: String,
}

impl SqliteStore {
    /// Open an existing database file
    pub fn open(path: &Utf8Path, prefix: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, prefix)
    }

    /// Fresh in-memory database with the platform tables created
    pub fn open_in_memory(prefix: &str) -> Result<Self> {
        let store = Self::with_connection(Connection::open_in_memory()?, prefix)?;
        store.create_schema()?;
        Ok(store)
    }

    /// Version of the SQLite library linked into the binary
    pub fn library_version() -> &'static str {
        rusqlite::version()
    }

    fn with_connection(conn: Connection, prefix: &str) -> Result<Self> {
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_config(format!(
                "Invalid table prefix '{}'",
                prefix
            )));
        }

        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Create the platform tables if they do not exist
    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {extensions} (
                extension_id INTEGER PRIMARY KEY AUTOINCREMENT,
                package_id INTEGER NOT NULL DEFAULT 0,
                name TEXT NOT NULL DEFAULT '',
                type TEXT NOT NULL DEFAULT '',
                element TEXT NOT NULL DEFAULT '',
                changelogurl TEXT,
                folder TEXT NOT NULL DEFAULT '',
                client_id INTEGER,
                enabled INTEGER NOT NULL DEFAULT 0,
                access INTEGER NOT NULL DEFAULT 1,
                protected INTEGER NOT NULL DEFAULT 0,
                locked INTEGER NOT NULL DEFAULT 0,
                manifest_cache TEXT NOT NULL DEFAULT '',
                params TEXT NOT NULL DEFAULT '',
                custom_data TEXT NOT NULL DEFAULT '',
                checked_out INTEGER,
                checked_out_time TEXT,
                ordering INTEGER DEFAULT 0,
                state INTEGER DEFAULT 0,
                note TEXT
            );
            CREATE TABLE IF NOT EXISTS {update_sites} (
                update_site_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT DEFAULT '',
                type TEXT DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                enabled INTEGER DEFAULT 0,
                last_check_timestamp INTEGER DEFAULT 0,
                extra_query TEXT DEFAULT ''
            );
            CREATE TABLE IF NOT EXISTS {update_sites_extensions} (
                update_site_id INTEGER NOT NULL DEFAULT 0,
                extension_id INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (update_site_id, extension_id)
            );
            CREATE TABLE IF NOT EXISTS {schemas} (
                extension_id INTEGER NOT NULL,
                version_id TEXT NOT NULL,
                PRIMARY KEY (extension_id, version_id)
            );
            CREATE TABLE IF NOT EXISTS {updates} (
                update_id INTEGER PRIMARY KEY AUTOINCREMENT,
                update_site_id INTEGER DEFAULT 0,
                extension_id INTEGER DEFAULT 0,
                name TEXT DEFAULT '',
                element TEXT DEFAULT '',
                type TEXT DEFAULT '',
                version TEXT DEFAULT ''
            );",
            extensions = self.table("extensions"),
            update_sites = self.table("update_sites"),
            update_sites_extensions = self.table("update_sites_extensions"),
            schemas = self.table("schemas"),
            updates = self.table("updates"),
        ))?;
        Ok(())
    }

    /// Insert an extension row, returning its id
    ///
    /// A zero `extension_id` lets the database assign one.
    pub fn insert_extension(&self, row: &ExtensionRow) -> Result<i64> {
        let id: Option<i64> = (row.extension_id != 0).then_some(row.extension_id);

        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                self.table("extensions"),
                EXTENSION_COLUMNS
            ),
            params![
                id,
                row.package_id,
                row.name,
                row.kind,
                row.element,
                row.folder,
                row.client_id,
                row.enabled,
                row.access,
                row.protected,
                row.locked,
                row.manifest_cache,
                row.params,
                row.custom_data,
                row.state,
                row.note,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an update site and link it to an extension
    pub fn insert_update_site(&self, extension_id: i64, site: &UpdateSite) -> Result<i64> {
        let id: Option<i64> = (site.update_site_id != 0).then_some(site.update_site_id);

        self.conn.execute(
            &format!(
                "INSERT INTO {} (update_site_id, name, type, location, enabled) VALUES (?1, ?2, ?3, ?4, ?5)",
                self.table("update_sites")
            ),
            params![id, site.name, site.kind, site.location, site.enabled],
        )?;
        let update_site_id = self.conn.last_insert_rowid();

        self.conn.execute(
            &format!(
                "INSERT INTO {} (update_site_id, extension_id) VALUES (?1, ?2)",
                self.table("update_sites_extensions")
            ),
            params![update_site_id, extension_id],
        )?;

        Ok(update_site_id)
    }

    /// Record a schema baseline for an extension
    pub fn insert_schema(&self, extension_id: i64, version: &str) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (extension_id, version_id) VALUES (?1, ?2)",
                self.table("schemas")
            ),
            params![extension_id, version],
        )?;
        Ok(())
    }

    /// Create an empty prefixed table
    pub fn create_table(&self, table: &str) -> Result<()> {
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY)",
                quote_identifier(&self.table(table))
            ),
            [],
        )?;
        Ok(())
    }

    /// Number of cached update rows
    pub fn cached_update_count(&self) -> Result<i64> {
        Ok(self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table("updates")),
            [],
            |row| row.get(0),
        )?)
    }

    fn row_to_extension(row: &Row<'_>) -> rusqlite::Result<ExtensionRow> {
        let text = |idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };
        let int = |idx: usize| -> rusqlite::Result<i64> {
            Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or_default())
        };

        Ok(ExtensionRow {
            extension_id: int(0)?,
            package_id: int(1)?,
            name: text(2)?,
            kind: text(3)?,
            element: text(4)?,
            folder: text(5)?,
            client_id: row.get(6)?,
            enabled: int(7)?,
            access: int(8)?,
            protected: int(9)?,
            locked: int(10)?,
            manifest_cache: text(11)?,
            params: text(12)?,
            custom_data: text(13)?,
            state: int(14)?,
            note: row.get(15)?,
        })
    }

    fn query_extensions(&self, sql: &str, values: Vec<Value>) -> Result<Vec<ExtensionRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(values), Self::row_to_extension)?;

        let mut extensions = Vec::new();
        for row in rows {
            extensions.push(row?);
        }
        Ok(extensions)
    }
}

impl ExtensionStore for SqliteStore {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn extension_by_id(&self, id: i64) -> Result<Option<ExtensionRow>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE extension_id = ?1",
                    EXTENSION_COLUMNS,
                    self.table("extensions")
                ),
                [id],
                Self::row_to_extension,
            )
            .optional()?)
    }

    fn find_extension(&self, query: &ExtensionQuery) -> Result<Option<ExtensionRow>> {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE type = ?1 AND element = ?2",
            EXTENSION_COLUMNS,
            self.table("extensions")
        );
        let mut values = vec![
            Value::Text(query.kind.as_str().to_string()),
            Value::Text(query.element.clone()),
        ];

        if let Some(folder) = &query.folder {
            values.push(Value::Text(folder.clone()));
            sql.push_str(&format!(" AND folder = ?{}", values.len()));
        }
        if let Some(client) = query.client {
            values.push(Value::Integer(client));
            sql.push_str(&format!(" AND client_id = ?{}", values.len()));
        }
        sql.push_str(" ORDER BY extension_id LIMIT 1");

        Ok(self.query_extensions(&sql, values)?.into_iter().next())
    }

    fn list_extensions(&self, filter: &ExtensionFilter) -> Result<Vec<ExtensionRow>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(kind) = filter.kind {
            values.push(Value::Text(kind.as_str().to_string()));
            clauses.push(format!("type = ?{}", values.len()));
        }
        if let Some(package_id) = filter.package_id {
            values.push(Value::Integer(package_id));
            clauses.push(format!("package_id = ?{}", values.len()));
        }
        if let Some(state) = filter.state {
            values.push(Value::Integer(state));
            clauses.push(format!("state = ?{}", values.len()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            values.push(Value::Text(format!("%{}%", search.trim())));
            clauses.push(format!(
                "(name LIKE ?{n} OR element LIKE ?{n})",
                n = values.len()
            ));
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            EXTENSION_COLUMNS,
            self.table("extensions")
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY {} {}",
            filter.order.column.as_str(),
            if filter.order.descending { "DESC" } else { "ASC" }
        ));

        self.query_extensions(&sql, values)
    }

    fn package_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT extension_id FROM {} WHERE type = 'package' ORDER BY extension_id",
            self.table("extensions")
        ))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn set_column(&self, id: i64, column: ExtensionColumn, value: &ColumnValue) -> Result<()> {
        let value = match value {
            ColumnValue::Int(v) => Value::Integer(*v),
            ColumnValue::Text(v) => Value::Text(v.clone()),
            ColumnValue::Null => Value::Null,
        };

        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET {} = ?1 WHERE extension_id = ?2",
                self.table("extensions"),
                column.as_str()
            ),
            params![value, id],
        )?;

        if changed == 0 {
            return Err(Error::extension_not_found(id));
        }

        debug!("Set {} of extension {}", column, id);
        Ok(())
    }

    fn update_sites(&self) -> Result<Vec<(i64, UpdateSite)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT map.extension_id, s.update_site_id, s.name, s.type, s.location, s.enabled
             FROM {} AS map
             INNER JOIN {} AS s ON s.update_site_id = map.update_site_id
             ORDER BY map.extension_id, s.update_site_id",
            self.table("update_sites_extensions"),
            self.table("update_sites")
        ))?;

        let sites = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    UpdateSite {
                        update_site_id: row.get(1)?,
                        name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        kind: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        location: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        enabled: row.get::<_, Option<i64>>(5)?.unwrap_or_default() != 0,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(sites)
    }

    fn set_update_site_enabled(&self, update_site_id: i64, enabled: bool) -> Result<()> {
        self.conn.execute(
            &format!(
                "UPDATE {} SET enabled = ?1 WHERE update_site_id = ?2",
                self.table("update_sites")
            ),
            params![enabled as i64, update_site_id],
        )?;
        info!(
            "Update site {} {}",
            update_site_id,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    fn schema_versions(&self) -> Result<HashMap<i64, String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT extension_id, version_id FROM {} ORDER BY extension_id, version_id",
            self.table("schemas")
        ))?;

        let mut versions = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (extension_id, version) = row?;
            versions.insert(extension_id, version);
        }
        Ok(versions)
    }

    fn set_schema_version(&self, extension_id: i64, version: &str) -> Result<()> {
        let schemas = self.table("schemas");
        self.conn.execute(
            &format!("DELETE FROM {} WHERE extension_id = ?1", schemas),
            [extension_id],
        )?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (extension_id, version_id) VALUES (?1, ?2)",
                schemas
            ),
            params![extension_id, version],
        )?;
        info!("Schema version of extension {} set to {}", extension_id, version);
        Ok(())
    }

    fn live_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names
            .into_iter()
            .filter_map(|name| name.strip_prefix(&self.prefix).map(str::to_string))
            .collect())
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        let table = self.table(table);
        self.conn.execute(
            &format!("DROP TABLE IF EXISTS {}", quote_identifier(&table)),
            [],
        )?;
        info!("Dropped table {}", table);
        Ok(())
    }

    fn purge_update_cache(&self) -> Result<()> {
        self.conn
            .execute(&format!("DELETE FROM {}", self.table("updates")), [])?;
        self.conn.execute(
            &format!(
                "UPDATE {} SET last_check_timestamp = 0",
                self.table("update_sites")
            ),
            [],
        )?;
        info!("Update cache purged");
        Ok(())
    }

    fn refresh_media_version(&self) -> Result<()> {
        let extensions = self.table("extensions");
        let current: Option<(i64, Option<String>)> = self
            .conn
            .query_row(
                &format!(
                    "SELECT extension_id, params FROM {} WHERE type = 'library' AND element = 'joomla'",
                    extensions
                ),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((id, params)) = current else {
            debug!("No platform library row, media version left alone");
            return Ok(());
        };

        let mut params = params
            .and_then(|p| serde_json::from_str::<serde_json::Value>(&p).ok())
            .filter(|p| p.is_object())
            .unwrap_or_else(|| serde_json::json!({}));
        params["mediaversion"] = serde_json::Value::String(Uuid::new_v4().simple().to_string());

        self.conn.execute(
            &format!("UPDATE {} SET params = ?1 WHERE extension_id = ?2", extensions),
            params![serde_json::to_string(&params)?, id],
        )?;
        info!("Media version refreshed");
        Ok(())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
