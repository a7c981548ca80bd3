use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use waitlist::app;
use waitlist::repo::{InMemoryWaitlistRepo, PgWaitlistRepo};
use waitlist::settings::Settings;
use waitlist::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    let subscriber = telemetry::create_subscriber(settings.app.log_level(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    if settings.database.in_memory() {
        tracing::warn!("Using the in-memory waitlist, entries will not survive a restart");
        let repo = Arc::new(InMemoryWaitlistRepo::new());
        return app::run(listener, repo, settings.app.allowed_origins())?
            .await
            .context("Failed to run app");
    }

    let pool = settings
        .database
        .pool_options()
        .connect_with(settings.database.with_db())
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Connected to database, migrations applied");

    let repo = Arc::new(PgWaitlistRepo::new(pool));

    let result = app::run(listener, repo.clone(), settings.app.allowed_origins())?
        .await
        .context("Failed to run app");

    // The server only resolves once it has shut down
    repo.close().await;
    tracing::info!("Database connections closed");

    result
}
