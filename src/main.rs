use sqlx::mysql::MySqlPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tasklink_server::core::{AppState, Config};
use tasklink_server::email::create_dispatcher;
use tasklink_server::monitoring::{MonitorConfig, start_process_monitoring};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load and print the configuration
    let config = Config::from_env()?;
    config.print_info();

    // One pool for the whole process, injected into every store
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let dispatcher = create_dispatcher(&config)?;
    let state = Arc::new(AppState::new(pool, &config, dispatcher));

    tokio::spawn(start_process_monitoring(MonitorConfig::default()));

    let app = tasklink_server::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
