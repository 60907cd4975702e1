//! Watches LA-area home games and posts to Discord when a promo rule hits.

mod config;
mod discord;
mod messages;
mod monitor;
mod scheduler;

use anyhow::Result;
use config::Config;
use discord::{DiscordClient, DiscordNotifier};
use dotenv::dotenv;
use log::{error, info};
use messages::MessageCatalog;
use monitor::Monitor;
use scheduler::PollScheduler;
use std::sync::Arc;
use watch_core::watchers::WatcherRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting watcher service");

    let config = Config::from_env()?;

    let registry = Arc::new(WatcherRegistry::with_defaults(&config.watcher_settings()));
    info!("Tracking {} teams", registry.len());

    let discord = DiscordClient::new(config.discord_bot_token.clone());
    let notifier = Arc::new(DiscordNotifier::new(
        discord,
        config.discord_channel_id,
        config.timezone,
    ));

    let scheduler = PollScheduler::new(config.active_poll_interval, config.idle_poll_interval);
    let catalog = MessageCatalog::new(config.ducks_goal_threshold, config.angels_run_threshold);
    let monitor = Monitor::new(registry, notifier, scheduler, catalog, config.timezone);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                error!("Monitor loop exited with error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, exiting");
        }
    }

    Ok(())
}
