use anyhow::Result;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

mod appointments;
mod availability;
mod categories;
mod clients;
mod dashboard;
mod schedule;
mod services;
mod users;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an already connected pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(self.get_pool()).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    if config.auto_migrate {
        db.migrate().await?;
    }

    Ok(db)
}
