use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{ffi, Connection, ErrorCode};
use tracing::debug;

/// Longer names make SQLite lookups in documentation browsers stall.
pub const MAX_NAME_CHARS: usize = 200;

const INSERT_SQL: &str = "INSERT INTO searchIndex (name, type, path) VALUES (?1, ?2, ?3)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Class,
    Method,
    Field,
    Constructor,
    Interface,
    Exception,
    Error,
    Enum,
    Trait,
    Script,
    Notation,
    Package,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Class => "Class",
            EntryKind::Method => "Method",
            EntryKind::Field => "Field",
            EntryKind::Constructor => "Constructor",
            EntryKind::Interface => "Interface",
            EntryKind::Exception => "Exception",
            EntryKind::Error => "Error",
            EntryKind::Enum => "Enum",
            EntryKind::Trait => "Trait",
            EntryKind::Script => "Script",
            EntryKind::Notation => "Notation",
            EntryKind::Package => "Package",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the docset search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Relative to the Documents root, fragment included.
    pub path: String,
}

impl IndexEntry {
    pub fn new(name: &str, kind: EntryKind, path: String) -> Self {
        let name = if name.chars().count() > MAX_NAME_CHARS {
            name.chars().take(MAX_NAME_CHARS).collect()
        } else {
            name.to_string()
        };
        IndexEntry { name, kind, path }
    }

    pub fn path_without_fragment(&self) -> &str {
        match self.path.split_once('#') {
            Some((file, _)) => file,
            None => &self.path,
        }
    }
}

/// The `searchIndex` table of a docset, written in batches.
pub struct IndexStore {
    conn: Connection,
    buffer: Vec<IndexEntry>,
    batch_size: usize,
    duplicates: usize,
}

impl IndexStore {
    pub fn create(path: &Path, batch_size: usize) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Failed to open index {:?}", path))?;
        let batch_size = batch_size.max(1);
        let store = IndexStore {
            conn,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            duplicates: 0,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS searchIndex (
                    id   INTEGER PRIMARY KEY,
                    name TEXT,
                    type TEXT,
                    path TEXT
                );
                CREATE UNIQUE INDEX IF NOT EXISTS anchor ON searchIndex (name, type, path);
                ",
            )
            .context("Failed to create searchIndex table")?;
        Ok(())
    }

    /// Queue a row. Callers filter duplicates; the store only tolerates the
    /// ones that slip through as constraint violations.
    pub fn insert(&mut self, entry: IndexEntry) -> Result<()> {
        self.buffer.push(entry);
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.buffer);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for e in &pending {
                match stmt.execute(rusqlite::params![e.name, e.kind.as_str(), e.path]) {
                    Ok(_) => {}
                    Err(err) if is_duplicate_key(&err) => {
                        debug!(name = %e.name, kind = %e.kind, path = %e.path, "Duplicate row ignored");
                        self.duplicates += 1;
                    }
                    Err(err) => {
                        return Err(err)
                            .with_context(|| format!("Failed to insert {} {}", e.kind, e.name));
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn count(&mut self) -> Result<usize> {
        self.flush()?;
        let n: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM searchIndex", [], |r| r.get(0))?;
        Ok(n)
    }

    /// Rows rejected by the unique index.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finalize(mut self) -> Result<()> {
        self.flush()?;
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close index")?;
        Ok(())
    }
}

fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

#[cfg(test)]
impl IndexStore {
    pub fn entries(&mut self) -> Result<Vec<IndexEntry>> {
        self.flush()?;
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, path FROM searchIndex ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                let kind: String = row.get(1)?;
                Ok((row.get::<_, String>(0)?, kind, row.get::<_, String>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|(name, kind, path)| IndexEntry {
                name,
                kind: parse_kind(&kind),
                path,
            })
            .collect())
    }
}

#[cfg(test)]
fn parse_kind(s: &str) -> EntryKind {
    match s {
        "Class" => EntryKind::Class,
        "Method" => EntryKind::Method,
        "Field" => EntryKind::Field,
        "Constructor" => EntryKind::Constructor,
        "Interface" => EntryKind::Interface,
        "Exception" => EntryKind::Exception,
        "Error" => EntryKind::Error,
        "Enum" => EntryKind::Enum,
        "Trait" => EntryKind::Trait,
        "Script" => EntryKind::Script,
        "Notation" => EntryKind::Notation,
        "Package" => EntryKind::Package,
        other => panic!("unknown kind {other}"),
    }
}

// ── Tests ──
