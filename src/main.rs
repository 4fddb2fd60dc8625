//! Gatherly Participation Service
//!
//! Main application entry point: runs the expiry cleanup sweep on an
//! interval, purging stale pending/invited entries from ended events.

use tracing::{error, info};

use gatherly::{
    config::Settings,
    database::{connection::create_pool, run_migrations, EventRepository, UserRepository},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive until exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting Gatherly participation service...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = gatherly::database::connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..Default::default()
    };
    let db_pool = create_pool(&db_config).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;

    // Initialize services
    info!("Initializing services...");
    let event_repository = EventRepository::new(db_pool.clone());
    let user_repository = UserRepository::new(db_pool);
    let services = ServiceFactory::new(settings.clone(), event_repository, user_repository)?;

    let sweep_interval = std::time::Duration::from_secs(settings.cleanup.interval_seconds);
    info!(interval_seconds = settings.cleanup.interval_seconds, "Expiry cleanup sweep scheduled");

    let mut interval = tokio::time::interval(sweep_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match services.participation_service.cleanup_expired(None).await {
                    Ok(report) => {
                        if report.entries_removed > 0 {
                            info!(
                                events_pruned = report.events_pruned,
                                entries_removed = report.entries_removed,
                                "Cleanup sweep pruned stale entries"
                            );
                        }
                    }
                    Err(e) if e.is_recoverable() => {
                        error!(error = %e, "Cleanup sweep failed, will retry next interval");
                    }
                    Err(e) => {
                        error!(error = %e, "Cleanup sweep failed with unrecoverable error");
                        return Err(e.into());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping");
                break;
            }
        }
    }

    Ok(())
}
