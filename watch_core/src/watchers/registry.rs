//! Watcher registry.
//!
//! Holds the configured team watchers and answers cross-team questions
//! (closest upcoming promo chance).

use super::{MlbTeamWatcher, MlsTeamWatcher, NbaTeamWatcher, NhlTeamWatcher, TeamWatcher};
use crate::models::UpcomingGame;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

/// Tunables for the default watcher set
#[derive(Debug, Clone)]
pub struct WatcherSettings {
    pub timezone: Tz,
    pub ducks_goal_threshold: u32,
    pub angels_run_threshold: u32,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::Los_Angeles,
            ducks_goal_threshold: 5,
            angels_run_threshold: 7,
        }
    }
}

pub struct WatcherRegistry {
    watchers: Vec<Arc<dyn TeamWatcher>>,
}

impl WatcherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            watchers: Vec::new(),
        }
    }

    /// Create a registry with the four tracked teams
    pub fn with_defaults(settings: &WatcherSettings) -> Self {
        let tz = settings.timezone;
        let mut registry = Self::new();

        registry.register(Arc::new(NhlTeamWatcher::new(
            "ducks",
            "Anaheim Ducks",
            24,
            "ANA",
            settings.ducks_goal_threshold,
            tz,
        )));
        registry.register(Arc::new(MlbTeamWatcher::new(
            "angels",
            "Los Angeles Angels",
            108,
            settings.angels_run_threshold,
            tz,
        )));
        registry.register(Arc::new(NbaTeamWatcher::new(
            "clippers",
            "Los Angeles Clippers",
            "Clippers",
            "LAC",
            tz,
        )));
        registry.register(Arc::new(MlsTeamWatcher::new(
            "lafc",
            "LAFC",
            "81d817a3",
            "Los-Angeles-FC",
            "18966/usa.lafc",
            tz,
        )));

        info!(
            "WatcherRegistry initialized with {} teams",
            registry.watchers.len()
        );

        registry
    }

    pub fn register(&mut self, watcher: Arc<dyn TeamWatcher>) {
        self.watchers.push(watcher);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TeamWatcher>> {
        self.watchers.iter()
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn TeamWatcher>> {
        self.watchers.iter().find(|w| w.key() == key).cloned()
    }

    /// Closest upcoming home game across all watchers. Teams whose schedule
    /// lookup fails are skipped with a warning.
    pub async fn next_promo_chance(&self) -> Option<UpcomingGame> {
        let mut closest: Option<UpcomingGame> = None;

        for watcher in &self.watchers {
            match watcher.next_home_game().await {
                Ok(Some(game)) => {
                    let is_closer = closest
                        .as_ref()
                        .map(|c| game.date < c.date)
                        .unwrap_or(true);
                    if is_closer {
                        closest = Some(game);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "next home game lookup failed for {}: {}",
                        watcher.team_name(),
                        e
                    );
                }
            }
        }

        closest
    }
}

impl Default for WatcherRegistry {
    fn default() -> Self {
        Self::with_defaults(&WatcherSettings::default())
    }
}
