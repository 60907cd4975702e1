//! MLS watcher: win the home match.
//!
//! Schedule comes from the fbref matchlogs table; finished-match outcomes
//! from the ESPN team results page. The match date doubles as the game
//! reference since neither page exposes a usable game id.

use super::TeamWatcher;
use crate::clients::soccer::{MatchOutcome, SoccerClient};
use crate::models::{GameOutcome, Sport, UpcomingGame};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

pub struct MlsTeamWatcher {
    client: SoccerClient,
    key: String,
    team_name: String,
    fbref_squad_id: String,
    fbref_squad_slug: String,
    espn_team_path: String,
    tz: Tz,
}

impl MlsTeamWatcher {
    pub fn new(
        key: &str,
        team_name: &str,
        fbref_squad_id: &str,
        fbref_squad_slug: &str,
        espn_team_path: &str,
        tz: Tz,
    ) -> Self {
        Self {
            client: SoccerClient::new(),
            key: key.to_string(),
            team_name: team_name.to_string(),
            fbref_squad_id: fbref_squad_id.to_string(),
            fbref_squad_slug: fbref_squad_slug.to_string(),
            espn_team_path: espn_team_path.to_string(),
            tz,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

#[async_trait]
impl TeamWatcher for MlsTeamWatcher {
    fn key(&self) -> &str {
        &self.key
    }

    fn team_name(&self) -> &str {
        &self.team_name
    }

    fn sport(&self) -> Sport {
        Sport::MLS
    }

    async fn home_game_today(&self) -> Result<Option<String>> {
        let today = self.today();
        let rows = self
            .client
            .fbref_matchlogs(&self.fbref_squad_id, &self.fbref_squad_slug, today.year())
            .await?;

        for row in rows {
            if row.date == today && row.is_home() {
                return Ok(Some(today.format("%Y-%m-%d").to_string()));
            }
            if row.date > today {
                break; // rows are chronological
            }
        }

        Ok(None)
    }

    async fn check_promo(&self, game_ref: &str) -> Result<GameOutcome> {
        let match_date = NaiveDate::parse_from_str(game_ref, "%Y-%m-%d").unwrap_or(self.today());
        let results = self
            .client
            .espn_results(&self.espn_team_path, match_date.year())
            .await?;

        // The results page lists finished matches newest-first; today's match
        // only shows up once it has gone final
        let Some(result) = results.iter().find(|r| r.date == Some(match_date)) else {
            return Ok(GameOutcome::NotFinished);
        };

        match result.home_outcome() {
            MatchOutcome::Win => Ok(GameOutcome::PromoHit),
            MatchOutcome::Loss | MatchOutcome::Draw => Ok(GameOutcome::PromoMiss),
        }
    }

    async fn next_home_game(&self) -> Result<Option<UpcomingGame>> {
        let today = self.today();
        let rows = self
            .client
            .fbref_matchlogs(&self.fbref_squad_id, &self.fbref_squad_slug, today.year())
            .await?;

        for row in rows {
            if row.date >= today && row.is_home() {
                return Ok(Some(UpcomingGame {
                    team: self.team_name.clone(),
                    opponent: row.opponent,
                    date: row.date,
                }));
            }
        }

        Ok(None)
    }
}
