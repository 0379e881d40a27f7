use std::sync::Arc;

use nw_core::{Error, Result, Storage};

pub mod backends;

pub use backends::memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use backends::sqlite::SqliteStorage;

/// Build a storage backend from its CLI name.
pub async fn create_storage(kind: &str, db_path: Option<&str>) -> Result<Arc<dyn Storage>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = std::path::PathBuf::from(db_path.unwrap_or("newswire.db"));
            Ok(Arc::new(SqliteStorage::open(&path).await?))
        }
        other => Err(Error::Storage(format!("Unknown storage backend: {other}"))),
    }
}
