//! rowaudit server - main entry point

use anyhow::{Context, Result};
use rowaudit_common::logging::{init_logging, LogConfig};
use tracing::info;

use rowaudit_server::{api, capture, config::Config, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::default()
        .with_file_prefix("rowaudit-server")
        .with_filter_directives("rowaudit_server=debug,tower_http=debug,sqlx=info")
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting rowaudit server");

    let config = Config::load().context("Failed to load configuration")?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let registrations = capture::setup(&pool, &config.audit)
        .await
        .context("Failed to install audit capture")?;
    for registration in &registrations {
        info!(
            registration_id = registration.id,
            "Auditing {}.{}", registration.schema_name, registration.table_name
        );
    }

    api::serve(config, pool).await
}
