use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod reminders;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tabsplit={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let ledger = engine::Ledger::builder().database(db).build()?;

    if let Some(reminder_settings) = settings.reminders {
        let ledger = ledger.clone();
        tasks.spawn(async move {
            tracing::info!("Found reminder settings...");
            let interval = Duration::from_secs(reminder_settings.interval_minutes * 60);
            let scheduler =
                reminders::ReminderScheduler::start(ledger, reminders::LogNotifier, interval);
            // Keep the scheduler alive until the process is told to stop.
            match tokio::signal::ctrl_c().await {
                Ok(()) => scheduler.stop().await,
                Err(err) => tracing::error!("failed to listen for shutdown: {err}"),
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
