use super::models::ChainContractCount;
use super::stats_repository::StatsRepository;
use super::store::{ContractStore, StoreConnector};
use crate::config::DatabaseConfig;
use crate::error::StatsGenError;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Opens the pool and runs the liveness query. A pool that fails the check
    /// is closed before the error is returned.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StatsGenError> {
        debug!("Initializing database pool");

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let connection_error = |source: sqlx::Error| {
            error!(
                host = %config.host,
                port = config.port,
                database = %config.database,
                user = %config.user,
                error = %source,
                "Cannot connect"
            );
            StatsGenError::Connection {
                host: config.host.clone(),
                port: config.port,
                database: config.database.clone(),
                source,
            }
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy_with(options);

        debug!("Checking database pool health");
        if let Err(e) = StatsRepository::new(&pool).health_check().await {
            pool.close().await;
            return Err(connection_error(e));
        }

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            user = %config.user,
            "Database initialized"
        );

        Ok(Database { pool })
    }
}

#[async_trait]
impl ContractStore for Database {
    async fn count_contracts_per_chain(&self) -> Result<Vec<ChainContractCount>, StatsGenError> {
        StatsRepository::new(&self.pool)
            .count_contracts_per_chain()
            .await
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            debug!("Closing database pool");
            self.pool.close().await;
        }
    }
}

/// Connects to PostgreSQL with the settings loaded at startup.
#[derive(Debug, Clone)]
pub struct PgConnector {
    config: DatabaseConfig,
}

impl PgConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for PgConnector {
    type Store = Database;

    async fn connect(&self) -> Result<Database, StatsGenError> {
        Database::connect(&self.config).await
    }
}
