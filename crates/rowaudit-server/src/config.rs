//! Configuration management
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (the constants below)
//! 2. a TOML file: `$ROWAUDIT_CONFIG`, or `rowaudit.toml` when present
//! 3. `ROWAUDIT_*` environment variables, nested with `__`
//!    (`ROWAUDIT_SERVER__PORT=9000`, `ROWAUDIT_AUDIT__TARGET_TABLES=products,sales.orders`)
//! 4. `DATABASE_URL`
//!
//! `.env` is read first via `dotenvy`. Changes require a restart.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::identifier::QualifiedName;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/rowaudit";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin (the audit UI dev server).
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ROWAUDIT_CONFIG";

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rowaudit.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ROWAUDIT_";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub audit: AuditConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(deserialize_with = "string_list")]
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Which tables get a capture trigger at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// `table` or `schema.table`, matched case-sensitively
    #[serde(deserialize_with = "string_list")]
    pub target_tables: Vec<String>,
}

impl AuditConfig {
    /// Parsed target table names, in configuration order.
    pub fn qualified_tables(&self) -> anyhow::Result<Vec<QualifiedName>> {
        self.target_tables
            .iter()
            .map(|raw| {
                QualifiedName::parse(raw)
                    .map_err(|e| anyhow::anyhow!("Invalid audit target table: {}", e))
            })
            .collect()
    }
}

impl Config {
    /// Load configuration from file, environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let config: Config = Self::figment(&path).extract()?;

        config.validate()?;

        Ok(config)
    }

    /// Layered providers behind [`Config::load`]. A missing file is skipped.
    pub fn figment(path: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Ok(url) = std::env::var("DATABASE_URL") {
            figment = figment.merge(("database.url", url));
        }

        figment
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate port
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        // Validate database URL
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        // Validate connection pool settings
        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        let tables = self.audit.qualified_tables()?;
        if tables.is_empty() {
            tracing::warn!("No audit target tables configured - nothing will be captured");
        }

        // Validate CORS origins
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            audit: AuditConfig::default(),
        }
    }
}

/// Accept either a list or a comma-separated string (the form env vars take).
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringList {
        List(Vec<String>),
        Joined(String),
    }

    let items = match StringList::deserialize(deserializer)? {
        StringList::List(items) => items,
        StringList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
        assert!(config.audit.target_tables.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.url.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.min_connections = 50;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.audit.target_tables = vec!["products; DROP TABLE x".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_qualified_tables() {
        let audit = AuditConfig {
            target_tables: vec!["products".to_string(), "sales.orders".to_string()],
        };
        let tables = audit.qualified_tables().unwrap();
        assert_eq!(tables[0].to_string(), "public.products");
        assert_eq!(tables[1].to_string(), "sales.orders");
    }

    #[test]
    #[serial]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 9100

            [audit]
            target_tables = ["products", "inventory.items"]
            "#
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config: Config = Config::figment(&path).extract()?;
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.server.host, DEFAULT_SERVER_HOST);
            assert_eq!(config.audit.target_tables, vec!["products", "inventory.items"]);
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_and_database_url() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "rowaudit.toml",
                r#"
                [server]
                port = 9100
                "#,
            )?;
            jail.set_env("ROWAUDIT_SERVER__PORT", "9200");
            jail.set_env("ROWAUDIT_AUDIT__TARGET_TABLES", "products, sales.orders");
            jail.set_env("ROWAUDIT_CORS__ALLOWED_ORIGINS", "http://a.test,http://b.test");
            jail.set_env("DATABASE_URL", "postgresql://db.test/audit");

            let config: Config = Config::figment(DEFAULT_CONFIG_FILE).extract()?;
            assert_eq!(config.server.port, 9200);
            assert_eq!(config.database.url, "postgresql://db.test/audit");
            assert_eq!(config.audit.target_tables, vec!["products", "sales.orders"]);
            assert_eq!(config.cors.allowed_origins, vec!["http://a.test", "http://b.test"]);
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config: Config = Config::figment("does-not-exist.toml").extract()?;
            assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
            assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
            Ok(())
        });
    }
}
