use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use watch_core::watchers::registry::WatcherSettings;

/// Default polling interval while a tracked game is pending (10 minutes)
pub const DEFAULT_ACTIVE_POLL_SECS: u64 = 600;

/// Default polling interval when no games are on the slate (6 hours)
pub const DEFAULT_IDLE_POLL_SECS: u64 = 21_600;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_bot_token: String,
    pub discord_channel_id: u64,

    pub active_poll_interval: Duration,
    pub idle_poll_interval: Duration,

    pub timezone: Tz,
    pub ducks_goal_threshold: u32,
    pub angels_run_threshold: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_bot_token =
            env::var("DISCORD_BOT_TOKEN").context("DISCORD_BOT_TOKEN must be set")?;

        let discord_channel_id = env::var("DISCORD_CHANNEL_ID")
            .context("DISCORD_CHANNEL_ID must be set")?
            .trim()
            .parse::<u64>()
            .context("Invalid DISCORD_CHANNEL_ID (expected numeric snowflake)")?;

        let active_poll_interval = Duration::from_secs(parse_u64_env(
            "ACTIVE_POLL_INTERVAL_SECS",
            DEFAULT_ACTIVE_POLL_SECS,
        )?);
        let idle_poll_interval = Duration::from_secs(parse_u64_env(
            "IDLE_POLL_INTERVAL_SECS",
            DEFAULT_IDLE_POLL_SECS,
        )?);

        let timezone_str =
            env::var("WATCH_TIMEZONE").unwrap_or_else(|_| "America/Los_Angeles".to_string());
        let timezone = Tz::from_str(&timezone_str).map_err(|_| {
            anyhow!(
                "Invalid WATCH_TIMEZONE: {} (expected IANA tz like America/Los_Angeles)",
                timezone_str
            )
        })?;

        let ducks_goal_threshold = parse_u64_env("DUCKS_GOAL_THRESHOLD", 5)? as u32;
        let angels_run_threshold = parse_u64_env("ANGELS_RUN_THRESHOLD", 7)? as u32;

        Ok(Self {
            discord_bot_token,
            discord_channel_id,
            active_poll_interval,
            idle_poll_interval,
            timezone,
            ducks_goal_threshold,
            angels_run_threshold,
        })
    }

    pub fn watcher_settings(&self) -> WatcherSettings {
        WatcherSettings {
            timezone: self.timezone,
            ducks_goal_threshold: self.ducks_goal_threshold,
            angels_run_threshold: self.angels_run_threshold,
        }
    }
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64_env_default() {
        assert_eq!(
            parse_u64_env("WATCHER_TEST_UNSET_KEY", 600).unwrap(),
            600
        );
    }

    #[test]
    fn test_parse_u64_env_invalid() {
        env::set_var("WATCHER_TEST_BAD_KEY", "ten minutes");
        assert!(parse_u64_env("WATCHER_TEST_BAD_KEY", 600).is_err());
        env::remove_var("WATCHER_TEST_BAD_KEY");
    }
}
