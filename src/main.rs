mod adapters;
mod application;
mod config;
mod domain;
mod ports;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapters::{ClinicPageClient, ClinicParser, FixtureFileSource, JsonFileStore, SmtpMailer};
use application::WatcherService;
use config::Config;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("vaxwatch={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting vaxwatch v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Watching for {:?} every {} min, active {:02}:00-{:02}:59 local",
        config.target_address,
        config.poll_interval_minutes,
        config.active_hours.start,
        config.active_hours.end
    );

    // Missing credentials or recipients abort before the loop starts.
    // The password itself is never logged.
    let password = adapters::smtp::load_password(&config.password_file)?;
    let recipients = if config.debug {
        vec![config.debug_recipient.clone()]
    } else {
        adapters::smtp::load_recipients(&config.recipients_file)?
    };
    info!("✓ Loaded {} recipient(s)", recipients.len());

    let page_source: Arc<dyn ports::PageSource> = if config.debug {
        info!("⚠ Debug mode: replaying {}", config.debug_fixture.display());
        Arc::new(FixtureFileSource::new(&config.debug_fixture))
    } else {
        Arc::new(ClinicPageClient::new(
            config.url.as_str(),
            config.query_params(),
            FETCH_TIMEOUT,
        )?)
    };

    let store = Arc::new(JsonFileStore::new(&config.snapshot_file));
    let mailer = Arc::new(SmtpMailer::new(
        &config.smtp_relay,
        &config.smtp_username,
        &password,
        &config.mail_from,
    )?);

    info!("✓ Watcher initialized, snapshot at {}", config.snapshot_file.display());

    let service = WatcherService::new(
        page_source,
        Arc::new(ClinicParser),
        store,
        mailer,
        recipients,
        config,
    );

    service.run().await?;
    Ok(())
}
