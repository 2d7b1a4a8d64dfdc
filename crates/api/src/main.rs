use anyhow::Result;
use persistence::seed::seed_defaults;
use persistence::UnitOfWork;
use tracing::info;

use urban_system_api::services::admin_bootstrap::bootstrap_admin;
use urban_system_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and the Prometheus recorder
    middleware::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Urban System API v{}", env!("CARGO_PKG_VERSION"));

    let database: persistence::db::DatabaseConfig = (&config.database).into();
    let uow = if database.is_in_memory() {
        info!("Using in-memory storage; data is lost on shutdown");
        UnitOfWork::in_memory()
    } else {
        let pool = persistence::db::create_pool(&database).await?;

        info!("Running database migrations...");
        sqlx::migrate!("../persistence/src/migrations")
            .run(&pool)
            .await?;
        info!("Migrations completed");

        UnitOfWork::postgres(pool)
    };

    let seeded = seed_defaults(&uow).await?;
    if seeded.locations > 0 || seeded.suggestions > 0 {
        info!(
            locations = seeded.locations,
            suggestions = seeded.suggestions,
            "Seeded default data"
        );
    }
    bootstrap_admin(&uow, &config.administrator).await?;

    // Build application
    let addr = config.socket_addr()?;
    let app = app::create_app(config, uow)?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
