use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::error::ApiError;
use crate::models::user::User;

/// Repository handle over a PostgreSQL connection pool. Cloning is cheap
/// (deadpool's `Pool` is reference-counted) and every method borrows a
/// connection for the duration of a single statement.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Builds the connection pool. Connections are established lazily, so
    /// this succeeds even when the database is unreachable; the first query
    /// surfaces the failure instead.
    pub fn new(config: &DatabaseConfig) -> Result<Self, ApiError> {
        info!(
            "Creating PostgreSQL connection pool for {}@{}:{}/{}",
            config.username, config.host, config.port, config.database
        );

        let pool = Self::create_pool(config)?;

        Ok(Database { pool })
    }

    fn create_pool(config: &DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host.clone());
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database.clone());
        pg_config.user = Some(config.username.clone());
        pg_config.password = Some(config.password.clone());

        // Same set `DatabaseConfig::validate` accepts; anything else is an
        // error here too rather than a silent fallback.
        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "prefer" => deadpool_postgres::SslMode::Prefer,
            "require" => deadpool_postgres::SslMode::Require,
            other => {
                return Err(ApiError::Database(format!(
                    "unsupported ssl_mode '{}'",
                    other
                )));
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        pg_config.pool = Some(deadpool_postgres::PoolConfig::new(
            config.max_connections as usize,
        ));

        // TLS connector is always built; it is only used when ssl_mode asks
        // for it.
        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// `SELECT 1` against the pool; the readiness probe depends on this.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client
            .execute("SELECT 1", &[])
            .await
            .map_err(ApiError::from)?;

        Ok(())
    }

    /// Creates the `users` table if it does not already exist. Safe to run
    /// on every startup; a failure leaves the server running in a degraded
    /// state where data operations fail at query time.
    pub async fn ensure_schema(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let users_table = r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL
            )
        "#;

        client.execute(users_table, &[]).await.map_err(|e| {
            error!("Failed to create users table: {}", e);
            ApiError::from(e)
        })?;

        info!("Table 'users' OK");
        Ok(())
    }

    /// Inserts a row and returns it as assigned by the database. The caller
    /// is responsible for handing in an already-trimmed, non-empty name.
    pub async fn create_user(&self, name: &str) -> Result<User, ApiError> {
        let client = self.get_connection().await?;

        let query = "INSERT INTO users (name) VALUES ($1) RETURNING id, name";

        let row = client
            .query_one(query, &[&name])
            .await
            .map_err(ApiError::from)?;

        let user = User {
            id: row.get(0),
            name: row.get(1),
        };

        info!("Created user with id: {}", user.id);
        Ok(user)
    }

    /// All users, most recently created first.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let client = self.get_connection().await?;

        let query = "SELECT id, name FROM users ORDER BY id DESC";

        let rows = client.query(query, &[]).await.map_err(ApiError::from)?;

        let users: Vec<User> = rows
            .iter()
            .map(|row| User {
                id: row.get(0),
                name: row.get(1),
            })
            .collect();

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 5432,
            database: "pedidos".to_string(),
            username: "pedido".to_string(),
            password: "pedido".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 10,
        }
    }

    #[test]
    fn test_pool_builds_without_reaching_database() {
        // Connections are lazy; building the pool must succeed even though
        // nothing listens on the configured port.
        let mut config = sample_config();
        config.port = 1;
        assert!(Database::new(&config).is_ok());
    }

    #[test]
    fn test_unknown_ssl_mode_is_an_error() {
        let mut config = sample_config();
        config.ssl_mode = "verify-full".to_string();
        assert!(Database::new(&config).is_err());
    }
}
