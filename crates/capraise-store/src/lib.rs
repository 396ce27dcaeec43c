//! Capraise Storage Layer
//!
//! Implements the [`SheetStore`] trait on SQLite. A sheet is an ordered
//! list of rows: row 0 is the header and every later position holds one
//! filing. The reconciler relies on positions being stable, so rows are
//! only ever appended or overwritten in place, never deleted or reordered.
//!
//! [`MemorySheetStore`] implements the same trait in memory, with call
//! counters and injectable failures for tests.
//!
//! # Examples
//!
//! ```
//! use capraise_domain::SheetStore;
//! use capraise_store::SqliteSheetStore;
//!
//! let mut store = SqliteSheetStore::in_memory().unwrap();
//! store.ensure_table("rights", &["접수번호".to_string()]).unwrap();
//! store.append_rows("rights", &[vec!["20240305000123".to_string()]]).unwrap();
//! assert_eq!(store.read_rows("rights").unwrap().len(), 2);
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::MemorySheetStore;

use capraise_domain::SheetStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Table has not been created
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Overwrite target does not exist
    #[error("Row {position} out of range for table {table}")]
    RowOutOfRange {
        /// Table name
        table: String,
        /// Requested position
        position: usize,
    },

    /// Stored cells could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Failure injected by a test double
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// SQLite-backed sheet store
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should open its own
/// store.
pub struct SqliteSheetStore {
    conn: Connection,
}

impl SqliteSheetStore {
    /// Open (or create) a store at `path`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use capraise_store::SqliteSheetStore;
    ///
    /// let store = SqliteSheetStore::new("capraise.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a private in-memory store
    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Names of all tables, in creation order
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM sheets ORDER BY rowid")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM sheets WHERE name = ?1", params![table], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn require_table(&self, table: &str) -> Result<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(StoreError::TableNotFound(table.to_string()))
        }
    }

    fn encode(cells: &[String]) -> Result<String> {
        serde_json::to_string(cells).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    fn decode(table: &str, position: i64, cells: &str) -> Result<Vec<String>> {
        serde_json::from_str(cells)
            .map_err(|e| StoreError::InvalidData(format!("{} row {}: {}", table, position, e)))
    }
}

impl SheetStore for SqliteSheetStore {
    type Error = StoreError;

    fn ensure_table(&mut self, table: &str, header: &[String]) -> Result<()> {
        let tx = self.conn.transaction()?;
        let created = tx.execute("INSERT OR IGNORE INTO sheets (name) VALUES (?1)", params![table])? > 0;

        let stored: Option<String> = tx
            .query_row(
                "SELECT cells FROM sheet_rows WHERE sheet = ?1 AND position = 0",
                params![table],
                |row| row.get(0),
            )
            .optional()?;
        match stored {
            None => {
                tx.execute(
                    "INSERT INTO sheet_rows (sheet, position, cells) VALUES (?1, 0, ?2)",
                    params![table, Self::encode(header)?],
                )?;
            }
            Some(cells) => {
                if Self::decode(table, 0, &cells)? != header {
                    warn!("Stored header of {} differs from the configured header; keeping it", table);
                }
            }
        }
        tx.commit()?;

        if created {
            debug!("Created table {} with {} columns", table, header.len());
        }
        Ok(())
    }

    fn read_rows(&self, table: &str) -> Result<Vec<Vec<String>>> {
        self.require_table(table)?;
        let mut stmt = self
            .conn
            .prepare("SELECT position, cells FROM sheet_rows WHERE sheet = ?1 ORDER BY position")?;
        let stored = stmt
            .query_map(params![table], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        stored
            .iter()
            .map(|(position, cells)| Self::decode(table, *position, cells))
            .collect()
    }

    fn append_rows(&mut self, table: &str, rows: &[Vec<String>]) -> Result<()> {
        self.require_table(table)?;
        let tx = self.conn.transaction()?;
        let next: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM sheet_rows WHERE sheet = ?1",
            params![table],
            |row| row.get(0),
        )?;
        {
            let mut insert =
                tx.prepare("INSERT INTO sheet_rows (sheet, position, cells) VALUES (?1, ?2, ?3)")?;
            for (offset, row) in (0i64..).zip(rows) {
                insert.execute(params![table, next + offset, Self::encode(row)?])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn overwrite_row(&mut self, table: &str, position: usize, row: &[String]) -> Result<()> {
        self.require_table(table)?;
        let index = i64::try_from(position).map_err(|_| StoreError::RowOutOfRange {
            table: table.to_string(),
            position,
        })?;
        let changed = self.conn.execute(
            "UPDATE sheet_rows
             SET cells = ?3, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE sheet = ?1 AND position = ?2",
            params![table, index, Self::encode(row)?],
        )?;
        if changed == 0 {
            return Err(StoreError::RowOutOfRange {
                table: table.to_string(),
                position,
            });
        }
        Ok(())
    }
}
