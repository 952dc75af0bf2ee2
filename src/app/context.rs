use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{PlatescoutError, Result};
use crate::config::Config;
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub config: Config,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, config: Config) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Ok(Self { store, config })
    }

    /// Context backed by a throwaway database, for dry runs.
    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self { store, config })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PlatescoutError::Config("Could not find data directory".into()))?;
        let platescout_dir = data_dir.join("platescout");
        std::fs::create_dir_all(&platescout_dir)?;
        Ok(platescout_dir.join("platescout.db"))
    }
}
