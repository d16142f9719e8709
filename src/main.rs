//! EventBoard backend
//!
//! Main application entry point

use std::net::SocketAddr;

use tracing::info;

use EventBoard::{
    config::Settings,
    database::{connection::create_pool, connection::run_migrations, DatabaseService},
    handlers::{self, AppState},
    services::ServiceFactory,
    state::ViewTracker,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file appender on shutdown
    let _logging_guard = logging::init_logging(&settings.logging)?;

    info!("Starting EventBoard backend...");

    // Initialize database connection
    info!("Connecting to database...");
    let pool_config = EventBoard::database::connection::PoolConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&pool_config).await?;

    // Run database migrations
    run_migrations(&pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(pool.clone());
    let view_tracker = ViewTracker::new();
    let services = ServiceFactory::new(&settings, &database_service, view_tracker)?;

    let state = AppState {
        services,
        pool,
    };
    let app = handlers::router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!(address = %addr, "Listening for connections");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
