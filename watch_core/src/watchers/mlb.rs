//! MLB watcher: home runs scored against a threshold.

use super::TeamWatcher;
use crate::clients::mlb::MlbClient;
use crate::models::{GameOutcome, Sport, UpcomingGame};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;

pub struct MlbTeamWatcher {
    client: MlbClient,
    key: String,
    team_name: String,
    team_id: u32,
    run_threshold: u32,
    tz: Tz,
}

impl MlbTeamWatcher {
    pub fn new(key: &str, team_name: &str, team_id: u32, run_threshold: u32, tz: Tz) -> Self {
        Self {
            client: MlbClient::new(),
            key: key.to_string(),
            team_name: team_name.to_string(),
            team_id,
            run_threshold,
            tz,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

#[async_trait]
impl TeamWatcher for MlbTeamWatcher {
    fn key(&self) -> &str {
        &self.key
    }

    fn team_name(&self) -> &str {
        &self.team_name
    }

    fn sport(&self) -> Sport {
        Sport::MLB
    }

    async fn home_game_today(&self) -> Result<Option<String>> {
        let today = self.today();
        let games = self.client.schedule(self.team_id, today, today).await?;
        Ok(games
            .iter()
            .find(|g| g.home_team_id == self.team_id)
            .map(|g| g.game_pk.to_string()))
    }

    async fn check_promo(&self, game_ref: &str) -> Result<GameOutcome> {
        // The statsapi schedule already carries the score and final status,
        // so re-query today's slate rather than a per-game endpoint.
        let today = self.today();
        let games = self.client.schedule(self.team_id, today, today).await?;

        let Some(game) = games.iter().find(|g| g.game_pk.to_string() == game_ref) else {
            return Ok(GameOutcome::NotFinished);
        };

        if !game.is_final() {
            return Ok(GameOutcome::NotFinished);
        }

        match game.home_score {
            Some(runs) if runs >= self.run_threshold => Ok(GameOutcome::PromoHit),
            _ => Ok(GameOutcome::PromoMiss),
        }
    }

    async fn next_home_game(&self) -> Result<Option<UpcomingGame>> {
        let today = self.today();
        let horizon = today
            .checked_add_days(Days::new(365))
            .unwrap_or(today);
        let games = self.client.schedule(self.team_id, today, horizon).await?;

        for game in games {
            if game.home_team_id == self.team_id && game.is_scheduled() {
                let Ok(date) = NaiveDate::parse_from_str(&game.official_date, "%Y-%m-%d") else {
                    continue;
                };
                return Ok(Some(UpcomingGame {
                    team: self.team_name.clone(),
                    opponent: game.away_team_name,
                    date,
                }));
            }
        }

        Ok(None)
    }
}
