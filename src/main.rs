use std::sync::Arc;

use advisor_api::{
    config::Config,
    db::{create_pool, run_migrations, PgStore},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,advisor_api=debug,tower_http=debug".parse().unwrap()),
        )
        .init();

    // 1. Load configuration from the environment
    let config = Config::from_env()?;

    // 2. Connect to Postgres and bring the schema up to date
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database ready");

    // 3. Wire up shared state and the router
    let store = Arc::new(PgStore::new(pool));
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(store, config);
    let app = create_router(state);

    // 4. Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
