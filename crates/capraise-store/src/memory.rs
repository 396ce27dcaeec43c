//! In-memory sheet store for tests and dry runs

use crate::{Result, StoreError};
use capraise_domain::SheetStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Vec<String>>>,
    append_calls: usize,
    overwrite_calls: usize,
    fail_reads: bool,
    fail_appends: bool,
    fail_overwrites: bool,
}

/// Sheet store held in memory
///
/// Clones share the same tables and counters, so a test can keep a handle
/// while the pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySheetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of `append_rows` calls that reached the store
    pub fn append_calls(&self) -> usize {
        self.state().append_calls
    }

    /// Number of `overwrite_row` calls that reached the store
    pub fn overwrite_calls(&self) -> usize {
        self.state().overwrite_calls
    }

    /// Total write calls
    pub fn write_calls(&self) -> usize {
        let state = self.state();
        state.append_calls + state.overwrite_calls
    }

    /// Reset the write counters
    pub fn reset_counters(&self) {
        let mut state = self.state();
        state.append_calls = 0;
        state.overwrite_calls = 0;
    }

    /// Make every `read_rows` call fail
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Make every `append_rows` call fail
    pub fn fail_appends(&self, fail: bool) {
        self.state().fail_appends = fail;
    }

    /// Make every `overwrite_row` call fail
    pub fn fail_overwrites(&self, fail: bool) {
        self.state().fail_overwrites = fail;
    }

    /// Rows of a table without going through the trait, header included
    pub fn snapshot(&self, table: &str) -> Vec<Vec<String>> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }
}

impl SheetStore for MemorySheetStore {
    type Error = StoreError;

    fn ensure_table(&mut self, table: &str, header: &[String]) -> Result<()> {
        self.state()
            .tables
            .entry(table.to_string())
            .or_insert_with(|| vec![header.to_vec()]);
        Ok(())
    }

    fn read_rows(&self, table: &str) -> Result<Vec<Vec<String>>> {
        let state = self.state();
        if state.fail_reads {
            return Err(StoreError::Injected(format!("read {}", table)));
        }
        state
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn append_rows(&mut self, table: &str, rows: &[Vec<String>]) -> Result<()> {
        let mut state = self.state();
        if state.fail_appends {
            return Err(StoreError::Injected(format!("append to {}", table)));
        }
        state.append_calls += 1;
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        stored.extend(rows.iter().cloned());
        Ok(())
    }

    fn overwrite_row(&mut self, table: &str, position: usize, row: &[String]) -> Result<()> {
        let mut state = self.state();
        if state.fail_overwrites {
            return Err(StoreError::Injected(format!("overwrite {} row {}", table, position)));
        }
        state.overwrite_calls += 1;
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let slot = stored.get_mut(position).ok_or_else(|| StoreError::RowOutOfRange {
            table: table.to_string(),
            position,
        })?;
        *slot = row.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let handle = MemorySheetStore::new();
        let mut store = handle.clone();
        store.ensure_table("rights", &["접수번호".to_string()]).unwrap();
        store.append_rows("rights", &[vec!["1".to_string()]]).unwrap();
        store.overwrite_row("rights", 1, &["2".to_string()]).unwrap();

        assert_eq!(handle.snapshot("rights").len(), 2);
        assert_eq!(handle.append_calls(), 1);
        assert_eq!(handle.overwrite_calls(), 1);
        assert_eq!(handle.write_calls(), 2);

        handle.reset_counters();
        assert_eq!(handle.write_calls(), 0);
    }

    #[test]
    fn test_injected_failures() {
        let mut store = MemorySheetStore::new();
        store.ensure_table("rights", &["접수번호".to_string()]).unwrap();

        store.fail_appends(true);
        assert!(matches!(
            store.append_rows("rights", &[vec!["1".to_string()]]),
            Err(StoreError::Injected(_))
        ));
        assert_eq!(store.append_calls(), 0);

        store.fail_reads(true);
        assert!(store.read_rows("rights").is_err());
        store.fail_reads(false);
        assert_eq!(store.read_rows("rights").unwrap().len(), 1);
    }
}
