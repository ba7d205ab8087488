use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;

use campus::core::Config;
use campus::database::Database;
use campus::features::location::{IpGeolocationProvider, LocationResolver, UnavailableSensor};
use campus::features::navigation::CampusMap;
use campus::features::notifications::{CommandSink, LogSink, NotificationSink};
use campus::features::reminders::ReminderScheduler;
use campus::features::{get_app_version, get_features};

fn build_sink(config: &Config) -> Arc<dyn NotificationSink> {
    match config.notify_command.as_deref().and_then(CommandSink::from_command_line) {
        Some(sink) => {
            let sink = if sink.program().ends_with("notify-send") {
                sink.with_app_name_flag("-a")
            } else {
                sink
            };
            info!("🔔 Delivering notifications via '{}'", sink.program());
            Arc::new(sink)
        }
        None => {
            info!("🔔 No notifier configured, notifications will be logged");
            Arc::new(LogSink)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting campus assistant v{}...", get_app_version());
    for feature in get_features() {
        info!("  {} {}", feature.name, feature.version);
    }

    let database = Database::new(&config.database_path).await?;
    if let Err(e) = database.seed_default_contests().await {
        warn!("Failed to seed default contests: {e}");
    }

    // Location chain: sensor first, then IP lookup, then the campus default
    let mut resolver = LocationResolver::new(Arc::new(UnavailableSensor));
    match IpGeolocationProvider::new(config.geoip_url.clone(), config.geoip_timeout()) {
        Ok(provider) => resolver = resolver.with_fallback(Arc::new(provider)),
        Err(e) => warn!("IP geolocation disabled: {e}"),
    }
    let resolver = Arc::new(resolver);
    let _location_task = resolver.start();

    let campus_map = Arc::new(CampusMap::load_or_default(
        config.campus_locations_path.as_deref(),
    ));

    let database = Arc::new(database);
    let scheduler = ReminderScheduler::new(database.clone(), build_sink(&config))
        .with_settings(database.clone())
        .with_timing(config.reminder_tick_interval(), config.reminder_lead_minutes)
        .with_route_context(resolver.clone(), campus_map);
    let reminders = scheduler.start();

    info!("✅ Campus assistant running. Press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Shutting down...");
    reminders.stop().await;
    resolver.stop();
    info!("Goodbye");

    Ok(())
}
