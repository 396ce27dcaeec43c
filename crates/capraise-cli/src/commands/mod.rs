//! Command implementations.

pub mod config;
pub mod extract;
pub mod show;
pub mod sync;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::show::execute_show;
pub use self::sync::execute_sync;

use crate::error::Result;
use capraise_store::SqliteSheetStore;
use std::fs;
use std::path::Path;

/// Open the SQLite store, creating its directory first.
pub(crate) fn open_store(path: &Path) -> Result<SqliteSheetStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(SqliteSheetStore::new(path)?)
}
