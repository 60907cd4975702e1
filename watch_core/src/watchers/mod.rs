//! Team score watchers.
//!
//! One `TeamWatcher` per tracked team, parameterized by its schedule
//! endpoint, live-score endpoint, home-game predicate, and win condition.
//! The monitor loop only ever talks to this trait; everything
//! league-specific lives in the implementations.

use crate::models::{GameOutcome, Sport, UpcomingGame};
use anyhow::Result;
use async_trait::async_trait;

pub mod mlb;
pub mod mls;
pub mod nba;
pub mod nhl;
pub mod registry;

pub use mlb::MlbTeamWatcher;
pub use mls::MlsTeamWatcher;
pub use nba::NbaTeamWatcher;
pub use nhl::NhlTeamWatcher;
pub use registry::WatcherRegistry;

/// A watcher for one tracked team's home-game promotion
#[async_trait]
pub trait TeamWatcher: Send + Sync {
    /// Stable key for state tracking and message selection, e.g. `ducks`
    fn key(&self) -> &str;

    /// Display name, e.g. `Anaheim Ducks`
    fn team_name(&self) -> &str;

    fn sport(&self) -> Sport;

    /// Check the schedule for a home game today. Returns an opaque game
    /// reference (league game id, or the match date where the league has no
    /// usable id) if one exists.
    async fn home_game_today(&self) -> Result<Option<String>>;

    /// Check the promotion rule against the referenced game
    async fn check_promo(&self, game_ref: &str) -> Result<GameOutcome>;

    /// Next scheduled home game, if the feed knows one
    async fn next_home_game(&self) -> Result<Option<UpcomingGame>>;
}
