//! NHL watcher: home goals against a threshold, shootout-adjusted.

use super::TeamWatcher;
use crate::clients::nhl::{self, NhlClient};
use crate::models::{GameOutcome, Sport, UpcomingGame};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

pub struct NhlTeamWatcher {
    client: NhlClient,
    key: String,
    team_name: String,
    team_id: u32,
    team_abbr: String,
    goal_threshold: u32,
    tz: Tz,
}

impl NhlTeamWatcher {
    pub fn new(
        key: &str,
        team_name: &str,
        team_id: u32,
        team_abbr: &str,
        goal_threshold: u32,
        tz: Tz,
    ) -> Self {
        Self {
            client: NhlClient::new(),
            key: key.to_string(),
            team_name: team_name.to_string(),
            team_id,
            team_abbr: team_abbr.to_string(),
            goal_threshold,
            tz,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

#[async_trait]
impl TeamWatcher for NhlTeamWatcher {
    fn key(&self) -> &str {
        &self.key
    }

    fn team_name(&self) -> &str {
        &self.team_name
    }

    fn sport(&self) -> Sport {
        Sport::NHL
    }

    async fn home_game_today(&self) -> Result<Option<String>> {
        let games = self.client.scoreboard(self.today()).await?;
        Ok(games
            .iter()
            .find(|g| g.home_team_id == self.team_id)
            .map(|g| g.id.to_string()))
    }

    async fn check_promo(&self, game_ref: &str) -> Result<GameOutcome> {
        let game_id: i64 = game_ref
            .parse()
            .map_err(|_| anyhow!("invalid NHL game id: {game_ref}"))?;

        let pbp = self.client.play_by_play(game_id).await?;

        match nhl::final_home_score(&pbp, self.team_id) {
            None => Ok(GameOutcome::NotFinished),
            Some(score) if score >= self.goal_threshold => Ok(GameOutcome::PromoHit),
            Some(_) => Ok(GameOutcome::PromoMiss),
        }
    }

    async fn next_home_game(&self) -> Result<Option<UpcomingGame>> {
        let today = self.today();
        let schedule = self.client.club_schedule(&self.team_abbr).await?;

        for row in schedule {
            if row.home_team_id != self.team_id {
                continue;
            }
            let Ok(date) = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d") else {
                continue;
            };
            if date >= today {
                return Ok(Some(UpcomingGame {
                    team: self.team_name.clone(),
                    opponent: row.away_place_name,
                    date,
                }));
            }
        }

        Ok(None)
    }
}
