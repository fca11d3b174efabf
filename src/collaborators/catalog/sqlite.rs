//! SQLite catalog: `resources` table with JSON list columns, WAL journal.

use anyhow::{Context, Result, anyhow};
use log::debug;
use rusqlite::backup::Backup;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{CatalogEntry, CatalogStats};
use crate::engine::tools::now_secs;
use crate::error::PortError;
use crate::ports::{CatalogStore, Collaborator};
use crate::types::{Category, CatalogId, CatalogRecord};
use crate::utils::config::PUBLISHED_STATUS;

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 1000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Schema for the resources table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    alt_title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    meta_description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    file_size INTEGER NOT NULL DEFAULT 0,
    file_format TEXT NOT NULL DEFAULT '',
    checksum TEXT NOT NULL DEFAULT '',
    source_path TEXT NOT NULL DEFAULT '',
    download_links TEXT NOT NULL DEFAULT '[]',
    image_urls TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    simulated_stages TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'published',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_resources_title ON resources(title);
CREATE INDEX IF NOT EXISTS idx_resources_category ON resources(category);
CREATE INDEX IF NOT EXISTS idx_resources_status ON resources(status);
"#;

const INSERT_SQL: &str = r#"
INSERT INTO resources (
    title, alt_title, description, meta_description, category, file_size, file_format,
    checksum, source_path, download_links, image_urls, tags, simulated_stages, status,
    created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, alt_title, description, meta_description, category, \
     file_size, file_format, checksum, source_path, download_links, image_urls, tags, \
     simulated_stages, status, created_at, updated_at FROM resources";

/// Enable WAL and apply schema to an open connection (idempotent).
fn apply_wal_and_schema(conn: &Connection) -> Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(())
}

/// Columns as stored, before JSON decoding.
struct RawRow {
    id: i64,
    text: [String; 9],
    json: [String; 4],
    file_size: i64,
    created_at: i64,
    updated_at: i64,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        text: [
            row.get(1)?,  // title
            row.get(2)?,  // alt_title
            row.get(3)?,  // description
            row.get(4)?,  // meta_description
            row.get(5)?,  // category
            row.get(7)?,  // file_format
            row.get(8)?,  // checksum
            row.get(9)?,  // source_path
            row.get(14)?, // status
        ],
        json: [row.get(10)?, row.get(11)?, row.get(12)?, row.get(13)?],
        file_size: row.get(6)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

impl RawRow {
    fn decode(self) -> Result<CatalogEntry> {
        let [title, alt_title, description, meta_description, category, file_format, checksum, source_path, status] =
            self.text;
        let [links, images, tags, simulated] = self.json;
        Ok(CatalogEntry {
            id: self.id,
            record: CatalogRecord {
                title,
                alt_title,
                description,
                meta_description,
                category: Category::from_slug(&category),
                file_size: self.file_size.max(0) as u64,
                file_format,
                checksum,
                source_path,
                download_links: serde_json::from_str(&links).context("decode download_links")?,
                image_urls: serde_json::from_str(&images).context("decode image_urls")?,
                tags: serde_json::from_str(&tags).context("decode tags")?,
                status,
                created_at: self.created_at,
                simulated_stages: serde_json::from_str(&simulated)
                    .context("decode simulated_stages")?,
            },
            updated_at: self.updated_at,
        })
    }
}

/// Catalog in an SQLite database. The connection is behind a mutex so the store is `Sync`.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open or create the catalog file (parent directories included) with WAL and schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create catalog directory {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("open database")?;
        apply_wal_and_schema(&conn)?;
        debug!("catalog opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory catalog with the same schema (no WAL pragmas needed).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        conn.execute_batch(SCHEMA).context("create schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("catalog lock poisoned"))
    }

    fn insert(&self, record: &CatalogRecord) -> Result<CatalogId> {
        let conn = self.lock()?;
        let now = now_secs();
        conn.execute(
            INSERT_SQL,
            params![
                record.title,
                record.alt_title,
                record.description,
                record.meta_description,
                record.category.as_str(),
                record.file_size as i64,
                record.file_format,
                record.checksum,
                record.source_path,
                serde_json::to_string(&record.download_links)?,
                serde_json::to_string(&record.image_urls)?,
                serde_json::to_string(&record.tags)?,
                serde_json::to_string(&record.simulated_stages)?,
                record.status,
                record.created_at,
                now,
            ],
        )
        .context("insert resource")?;
        Ok(conn.last_insert_rowid())
    }

    fn query_entries(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<CatalogEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.decode()?);
        }
        Ok(out)
    }

    pub fn get(&self, id: CatalogId) -> Result<Option<CatalogEntry>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [id], read_row)
            .optional()?;
        raw.map(RawRow::decode).transpose()
    }

    /// Most recent record with exactly this title.
    pub fn find_by_title(&self, title: &str) -> Result<Option<CatalogEntry>> {
        let sql = format!("{} WHERE title = ?1 ORDER BY id DESC LIMIT 1", SELECT_COLUMNS);
        Ok(self.query_entries(&sql, [title])?.into_iter().next())
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<CatalogEntry>> {
        let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ?1", SELECT_COLUMNS);
        self.query_entries(&sql, [limit as i64])
    }

    /// Substring match over title, description and tags.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogEntry>> {
        let pattern = format!("%{}%", query);
        let sql = format!(
            "{} WHERE title LIKE ?1 OR description LIKE ?1 OR tags LIKE ?1 ORDER BY id DESC LIMIT ?2",
            SELECT_COLUMNS
        );
        self.query_entries(&sql, params![pattern, limit as i64])
    }

    pub fn by_category(&self, category: Category, limit: usize) -> Result<Vec<CatalogEntry>> {
        let sql = format!("{} WHERE category = ?1 ORDER BY id DESC LIMIT ?2", SELECT_COLUMNS);
        self.query_entries(&sql, params![category.as_str(), limit as i64])
    }

    /// Returns false when no record has this id.
    pub fn update_status(&self, id: CatalogId, status: &str) -> Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE resources SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, now_secs(), id],
        )?;
        Ok(n > 0)
    }

    pub fn delete(&self, id: CatalogId) -> Result<bool> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM resources WHERE id = ?1", [id])? > 0)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM resources", [], |r| r.get(0))?;
        Ok(n.max(0) as u64)
    }

    pub fn statistics(&self) -> Result<CatalogStats> {
        let conn = self.lock()?;
        let (total, published, total_size): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(status = ?1), 0), COALESCE(SUM(file_size), 0) FROM resources",
            [PUBLISHED_STATUS],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?;
        let mut stats = CatalogStats {
            total: total.max(0) as u64,
            published: published.max(0) as u64,
            total_size: total_size.max(0) as u64,
            ..CatalogStats::default()
        };
        let mut stmt =
            conn.prepare("SELECT category, COUNT(*) FROM resources GROUP BY category ORDER BY category")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            let (category, n) = row?;
            stats.by_category.insert(category, n.max(0) as u64);
        }
        Ok(stats)
    }

    /// Copy the catalog to a file. Destination is overwritten.
    pub fn backup_to_file(&self, path: &Path) -> Result<()> {
        let source = self.lock()?;
        let mut dest = Connection::open(path).context("open destination database for backup")?;
        {
            let backup = Backup::new(&source, &mut dest).context("create backup")?;
            backup
                .run_to_completion(100, Duration::from_millis(0), None)
                .context("run backup to completion")?;
        }
        let wal_with_mode = format!("PRAGMA journal_mode = WAL;{}", WAL_PRAGMAS);
        dest.execute_batch(&wal_with_mode)
            .context("set WAL pragmas on destination")?;
        Ok(())
    }
}

impl Collaborator for SqliteCatalog {
    fn name(&self) -> &str {
        "sqlite-catalog"
    }
}

impl CatalogStore for SqliteCatalog {
    fn create(&self, record: &CatalogRecord) -> Result<CatalogId, PortError> {
        self.insert(record)
            .map_err(|e| PortError::Persistence(format!("{:#}", e)))
    }
}
