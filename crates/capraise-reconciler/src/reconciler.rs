//! Per-filing decision: append, overwrite or skip
//!
//! Rows are compared positionally on their display strings. Before the
//! comparison the fresh row is healed against the stored one: a fresh
//! unknown marker never replaces a stored value, and a fresh "see source"
//! placeholder never replaces a specific one, so later runs can only fill
//! cells in. A derived cell is carried only while its inputs are unchanged.

use crate::index::PersistedIndex;
use capraise_domain::{FilingKey, Row, RowSchema, SEE_SOURCE_MARKER, UNKNOWN_MARKER};

/// A cell computed from other cells of the same row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedCell {
    /// Position of the derived cell
    pub position: usize,
    /// Positions of the cells it is computed from
    pub inputs: Vec<usize>,
}

impl DerivedCell {
    /// Derived cells of a table layout
    ///
    /// A derived column whose inputs are not all in the layout is skipped.
    pub fn for_schema(schema: &RowSchema) -> Vec<DerivedCell> {
        schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| !column.derived_from().is_empty())
            .filter_map(|(position, column)| {
                let inputs = column
                    .derived_from()
                    .iter()
                    .map(|input| schema.position(*input))
                    .collect::<Option<Vec<_>>>()?;
                Some(DerivedCell { position, inputs })
            })
            .collect()
    }
}

/// What to do with one freshly computed row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Key not stored yet
    Append,
    /// Key stored at `position` and at least one cell differs
    Overwrite {
        /// Row position of the stored record
        position: usize,
    },
    /// Key stored at `position` and every cell is identical
    Skip {
        /// Row position of the stored record
        position: usize,
    },
}

impl Decision {
    /// Whether the decision writes to the store
    pub fn writes(&self) -> bool {
        !matches!(self, Decision::Skip { .. })
    }
}

/// A decision and the row it would write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The decision
    pub decision: Decision,
    /// Healed row to write (or the unchanged row on skip)
    pub row: Row,
}

/// Decide what to do with `fresh`, the current row of `key`
///
/// # Examples
///
/// ```
/// use capraise_domain::FilingKey;
/// use capraise_reconciler::{reconcile, Decision, PersistedIndex};
///
/// let stored = vec![
///     vec!["접수번호".to_string(), "발행가".to_string()],
///     vec!["20240305000123".to_string(), "9,200".to_string()],
/// ];
/// let index = PersistedIndex::from_rows(stored, 0);
/// let key = FilingKey::new("20240305000123").unwrap();
///
/// // A fresh unknown never overwrites a stored value
/// let fresh = vec!["20240305000123".to_string(), "-".to_string()];
/// assert_eq!(reconcile(&index, &key, fresh, &[]).decision, Decision::Skip { position: 1 });
/// ```
pub fn reconcile(
    index: &PersistedIndex,
    key: &FilingKey,
    fresh: Row,
    derived: &[DerivedCell],
) -> Reconciliation {
    let Some(position) = index.position(key) else {
        return Reconciliation {
            decision: Decision::Append,
            row: fresh,
        };
    };
    let stored = index.row(position).map(Vec::as_slice).unwrap_or_default();

    let row = heal(fresh, stored, derived);
    let decision = if rows_equal(&row, stored) {
        Decision::Skip { position }
    } else {
        Decision::Overwrite { position }
    };
    Reconciliation { decision, row }
}

/// Keep the stored value wherever the fresh cell says less about the column
///
/// A derived cell whose inputs changed is stale and never carried: the
/// fresh cell stands even when unknown.
pub fn heal(fresh: Row, stored: &[String], derived: &[DerivedCell]) -> Row {
    let stale: Vec<usize> = derived
        .iter()
        .filter(|d| {
            d.inputs.iter().any(|&i| {
                let cell = cell_text(&fresh, i);
                !is_unknown(cell) && cell != cell_text(stored, i)
            })
        })
        .map(|d| d.position)
        .collect();

    fresh
        .into_iter()
        .enumerate()
        .map(|(i, cell)| match stored.get(i) {
            Some(old) if !stale.contains(&i) && specificity(&cell) < specificity(old) => {
                old.trim().to_string()
            }
            _ => cell,
        })
        .collect()
}

/// Compare two rows cell by cell on trimmed text, the shorter padded with blanks
pub fn rows_equal(a: &[String], b: &[String]) -> bool {
    let width = a.len().max(b.len());
    (0..width).all(|i| cell_text(a, i) == cell_text(b, i))
}

fn cell_text(row: &[String], i: usize) -> &str {
    row.get(i).map_or("", |cell| cell.trim())
}

fn is_unknown(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell == UNKNOWN_MARKER
}

/// Unknown < bare "see source" < qualified "see source" < specific value
fn specificity(cell: &str) -> u8 {
    let cell = cell.trim();
    if is_unknown(cell) {
        0
    } else if cell == SEE_SOURCE_MARKER {
        1
    } else if cell.contains(SEE_SOURCE_MARKER) {
        2
    } else {
        3
    }
}
