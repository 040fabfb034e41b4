use cinema_catalog::{API_PREFIX, Config, build_router, migration::Migrator};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinema_catalog=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let db = Database::connect(config.connect_options()).await?;
    Migrator::up(&db, None).await?;
    tracing::info!(max_connections = config.max_connections, "Database ready");

    let app = build_router(&db);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "API: http://{}{API_PREFIX}  Docs: http://{}/docs",
        config.bind_addr,
        config.bind_addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}
