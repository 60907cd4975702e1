//! NBA watcher: opponent misses a trailing free throw in the 4th quarter.

use super::TeamWatcher;
use crate::clients::nba::{self, NbaClient};
use crate::models::{GameOutcome, Sport, UpcomingGame};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

pub struct NbaTeamWatcher {
    client: NbaClient,
    key: String,
    team_name: String,
    nickname: String,
    tricode: String,
    tz: Tz,
}

impl NbaTeamWatcher {
    pub fn new(key: &str, team_name: &str, nickname: &str, tricode: &str, tz: Tz) -> Self {
        Self {
            client: NbaClient::new(),
            key: key.to_string(),
            team_name: team_name.to_string(),
            nickname: nickname.to_string(),
            tricode: tricode.to_string(),
            tz,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

#[async_trait]
impl TeamWatcher for NbaTeamWatcher {
    fn key(&self) -> &str {
        &self.key
    }

    fn team_name(&self) -> &str {
        &self.team_name
    }

    fn sport(&self) -> Sport {
        Sport::NBA
    }

    async fn home_game_today(&self) -> Result<Option<String>> {
        let today = self.today();
        let date_mdy = today.format("%m/%d/%Y").to_string();
        let season = nba::season_for(today);

        let (next, complete) = self.client.broadcaster_schedule(&season, &date_mdy).await?;

        // A game can appear in either list depending on whether it has
        // tipped off yet
        let game = next
            .iter()
            .chain(complete.iter())
            .find(|g| g.home_nickname == self.nickname && g.date == date_mdy);

        Ok(game.map(|g| g.game_id.clone()))
    }

    async fn check_promo(&self, game_ref: &str) -> Result<GameOutcome> {
        let actions = self.client.play_by_play(game_ref).await?;

        if !nba::game_ended(&actions) {
            return Ok(GameOutcome::NotFinished);
        }

        if nba::opponent_missed_trailing_ft(&actions, &self.tricode) {
            Ok(GameOutcome::PromoHit)
        } else {
            Ok(GameOutcome::PromoMiss)
        }
    }

    async fn next_home_game(&self) -> Result<Option<UpcomingGame>> {
        let today = self.today();
        let schedule = self.client.league_schedule().await?;

        for game in schedule {
            let Some(date) = game.date else { continue };
            if game.home_team_name == self.nickname && date >= today {
                let opponent = format!("{} {}", game.away_team_city, game.away_team_name);
                return Ok(Some(UpcomingGame {
                    team: self.team_name.clone(),
                    opponent: opponent.trim().to_string(),
                    date,
                }));
            }
        }

        Ok(None)
    }
}
