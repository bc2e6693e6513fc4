use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::AppResult;
use crate::registry::TypeRegistry;
use std::sync::Arc;

/// Shared entry point for every journal operation.
///
/// Quest lifecycle, origin rotation and day browsing are implemented as
/// `impl JournalCore` blocks in their own modules.
#[derive(Debug, Clone)]
pub struct JournalCore {
    pub(crate) db: Arc<Database>,
    pub(crate) registry: Arc<TypeRegistry>,
}

impl JournalCore {
    pub fn new(db: Arc<Database>, registry: Arc<TypeRegistry>) -> Self {
        Self { db, registry }
    }

    pub fn open(config: &AppConfig) -> AppResult<Arc<Self>> {
        let registry = Arc::new(TypeRegistry::load(&config.types_path)?);
        let db = Arc::new(Database::new(&config.database_path)?);
        Ok(Arc::new(Self::new(db, registry)))
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
pub(crate) fn test_core() -> (tempfile::TempDir, JournalCore) {
    let (dir, db) = crate::db::test_database();
    let core = JournalCore::new(Arc::new(db), Arc::new(crate::registry::test_registry()));
    (dir, core)
}
