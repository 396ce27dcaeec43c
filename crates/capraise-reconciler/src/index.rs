//! Index of persisted rows by identity key

use capraise_domain::{FilingKey, Row};
use std::collections::HashMap;
use tracing::warn;

/// Identity key → row position, with the stored rows themselves
///
/// Built once per category per run by scanning the whole table, then kept
/// current as the run appends and overwrites.
#[derive(Debug, Clone, Default)]
pub struct PersistedIndex {
    positions: HashMap<FilingKey, usize>,
    rows: Vec<Row>,
}

impl PersistedIndex {
    /// Build the index from every row of a table, header at position 0
    ///
    /// Rows whose key cell is not a receipt number are kept in place but not
    /// indexed. When a key appears twice the first row wins.
    pub fn from_rows(rows: Vec<Row>, key_position: usize) -> Self {
        let mut positions = HashMap::new();
        for (position, row) in rows.iter().enumerate().skip(1) {
            let Some(key) = row
                .get(key_position)
                .and_then(|cell| FilingKey::new(cell.as_str()).ok())
            else {
                continue;
            };
            if let Some(first) = positions.get(&key) {
                warn!(
                    "Duplicate stored key {} at rows {} and {}, using row {}",
                    key, first, position, first
                );
                continue;
            }
            positions.insert(key, position);
        }
        Self { positions, rows }
    }

    /// Position of the row holding `key`
    pub fn position(&self, key: &FilingKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Stored row at `position`
    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Stored row of `key`
    pub fn get(&self, key: &FilingKey) -> Option<&Row> {
        self.position(key).and_then(|position| self.row(position))
    }

    /// Record a row appended after the last one
    pub fn record_append(&mut self, key: FilingKey, row: Row) -> usize {
        let position = self.rows.len();
        self.rows.push(row);
        self.positions.insert(key, position);
        position
    }

    /// Record a row overwritten in place
    pub fn record_overwrite(&mut self, position: usize, row: Row) {
        if let Some(slot) = self.rows.get_mut(position) {
            *slot = row;
        }
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no key is indexed
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
