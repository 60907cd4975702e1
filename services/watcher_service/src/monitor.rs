//! The periodic check loop.
//!
//! Each tick refreshes the per-team "home game today" flags, polls the promo
//! outcome for every pending game, and fires at most one notification per
//! team per day. The shared state table is a single RwLock-guarded map.

use crate::discord::Notify;
use crate::messages::{self, MessageCatalog};
use crate::scheduler::{PollScheduler, WatchContext};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use watch_core::models::GameOutcome;
use watch_core::watchers::WatcherRegistry;

/// Where a tracked team stands today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No home game on today's slate
    NoGame,
    /// Home game found, not yet polled for an outcome
    Scheduled,
    /// Game is being polled and has not finished
    InProgress,
    /// Game finished and the notification went out
    Done,
}

#[derive(Debug, Clone)]
pub struct TeamStatus {
    pub state: WatchState,
    pub game_ref: Option<String>,
    /// Local date this entry belongs to; entries from previous days reset
    pub day: NaiveDate,
}

pub struct Monitor {
    registry: Arc<WatcherRegistry>,
    notifier: Arc<dyn Notify>,
    scheduler: PollScheduler,
    messages: MessageCatalog,
    tz: Tz,
    state: Arc<RwLock<HashMap<String, TeamStatus>>>,
}

impl Monitor {
    pub fn new(
        registry: Arc<WatcherRegistry>,
        notifier: Arc<dyn Notify>,
        scheduler: PollScheduler,
        messages: MessageCatalog,
        tz: Tz,
    ) -> Self {
        Self {
            registry,
            notifier,
            scheduler,
            messages,
            tz,
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Refresh the "home game today" flag for every team that is not already
    /// being tracked today. Errors are logged and default to NoGame.
    async fn refresh_game_flags(&self) {
        let today = self.today();

        for watcher in self.registry.iter() {
            let key = watcher.key().to_string();

            let carry_forward = {
                let state = self.state.read().await;
                state
                    .get(&key)
                    .map(|entry| entry.day == today && entry.state != WatchState::NoGame)
                    .unwrap_or(false)
            };
            if carry_forward {
                continue;
            }

            let status = match watcher.home_game_today().await {
                Ok(Some(game_ref)) => {
                    info!(
                        "{} has a home game today (game_ref={})",
                        watcher.team_name(),
                        game_ref
                    );
                    TeamStatus {
                        state: WatchState::Scheduled,
                        game_ref: Some(game_ref),
                        day: today,
                    }
                }
                Ok(None) => TeamStatus {
                    state: WatchState::NoGame,
                    game_ref: None,
                    day: today,
                },
                Err(e) => {
                    warn!("Error checking {} game: {}", watcher.team_name(), e);
                    TeamStatus {
                        state: WatchState::NoGame,
                        game_ref: None,
                        day: today,
                    }
                }
            };

            self.state.write().await.insert(key, status);
        }
    }

    /// Poll every pending game and notify on final outcomes.
    /// Returns the number of teams still pending.
    async fn check_pending(&self) -> usize {
        let mut pending = 0;

        for watcher in self.registry.iter() {
            let key = watcher.key().to_string();

            let entry = {
                let state = self.state.read().await;
                state.get(&key).cloned()
            };
            let Some(entry) = entry else { continue };
            if !matches!(entry.state, WatchState::Scheduled | WatchState::InProgress) {
                continue;
            }
            let Some(game_ref) = entry.game_ref.clone() else {
                continue;
            };

            let next_state = match watcher.check_promo(&game_ref).await {
                Ok(GameOutcome::NotFinished) => WatchState::InProgress,
                Ok(GameOutcome::PromoHit) => {
                    info!("{} promo HIT", watcher.team_name());
                    match self
                        .notifier
                        .announce_until_midnight(&self.messages.celebration(&key))
                        .await
                    {
                        Ok(()) => WatchState::Done,
                        Err(e) => {
                            // Keep polling so the announcement retries next tick
                            error!("Failed to announce promo hit for {}: {}", key, e);
                            WatchState::InProgress
                        }
                    }
                }
                Ok(GameOutcome::PromoMiss) => {
                    info!("{} promo missed", watcher.team_name());
                    match self.notifier.announce(&self.messages.consolation(&key)).await {
                        Ok(()) => WatchState::Done,
                        Err(e) => {
                            error!("Failed to announce promo miss for {}: {}", key, e);
                            WatchState::InProgress
                        }
                    }
                }
                Err(e) => {
                    warn!("Error checking {} score: {}", watcher.team_name(), e);
                    WatchState::InProgress
                }
            };

            if matches!(next_state, WatchState::Scheduled | WatchState::InProgress) {
                pending += 1;
            }

            let mut state = self.state.write().await;
            if let Some(stored) = state.get_mut(&key) {
                stored.state = next_state;
            }
        }

        pending
    }

    /// One pass of the loop; returns how long to sleep before the next one
    pub async fn tick(&self) -> Duration {
        self.refresh_game_flags().await;
        let pending = self.check_pending().await;

        let context = self.scheduler.context(pending);
        debug!("watch context: {} ({} pending)", context.as_str(), pending);
        if context == WatchContext::Idle {
            info!("There are no home games pending today");
            if let Some(upcoming) = self.registry.next_promo_chance().await {
                info!("{}", messages::next_chance(&upcoming, self.today()));
            }
        }

        self.scheduler.interval(context)
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting periodic check loop");
        loop {
            let interval = self.tick().await;
            debug!("Next poll in {}s", interval.as_secs());
            tokio::time::sleep(interval).await;
        }
    }
}
