use std::env;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let database = DatabaseConfig::from_env()?;
        database.validate()?;

        Ok(Config { port, database })
    }
}

impl DatabaseConfig {
    /// Reads the `DB_*` variables. Every value has a default suitable for a
    /// local PostgreSQL instance, so an empty environment still yields a
    /// usable configuration.
    pub fn from_env() -> Result<Self> {
        let host = env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("DB_PORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse::<u16>()
            .context("DB_PORT must be a valid port number")?;

        let database = env::var("DB_NAME").unwrap_or_else(|_| "pedidos".to_string());
        let username = env::var("DB_USER").unwrap_or_else(|_| "pedido".to_string());
        let password = env::var("DB_PASSWORD").unwrap_or_else(|_| "pedido".to_string());

        let ssl_mode = env::var("DB_SSL_MODE").unwrap_or_else(|_| "disable".to_string());

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        Ok(DatabaseConfig {
            host,
            port,
            database,
            username,
            password,
            ssl_mode,
            max_connections,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Database host cannot be empty");
        }

        if self.port == 0 {
            anyhow::bail!("Database port must be greater than 0");
        }

        if self.database.trim().is_empty() {
            anyhow::bail!("Database name cannot be empty");
        }

        if self.username.trim().is_empty() {
            anyhow::bail!("Database username cannot be empty");
        }

        match self.ssl_mode.as_str() {
            "disable" | "prefer" | "require" => {}
            _ => anyhow::bail!("Invalid SSL mode. Must be one of: disable, prefer, require"),
        }

        if self.max_connections == 0 {
            anyhow::bail!("Max connections must be greater than 0");
        }

        Ok(())
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
    fn test_valid_config_passes_validation() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = sample_config();
        config.host = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_ssl_mode_rejected() {
        let mut config = sample_config();
        config.ssl_mode = "verify-full-extra".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut config = sample_config();
        config.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
