use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::seed;
use crate::store::{ContentStore, MemoryStore, SeaStore};

/// URL scheme that selects the in-process store.
pub const MEMORY_URL_PREFIX: &str = "memory:";

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Open the store named by `database.url`, once, at startup.
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn ContentStore>, DbErr> {
    if config.url.starts_with(MEMORY_URL_PREFIX) {
        info!("Using in-memory content store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db = init_db(&config.url).await?;
    seed::ensure_indexes(&db).await?;
    info!("Connected to database");
    Ok(Arc::new(SeaStore::new(db)))
}
