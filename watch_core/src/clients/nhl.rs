//! NHL api-web client.
//!
//! Three endpoints: the daily scoreboard, the club season schedule, and the
//! gamecenter play-by-play feed. The play-by-play feed is where the shootout
//! score adjustment lives: the league awards the shootout winner one extra
//! goal on the scoreboard, which does not count toward the promo threshold.

use crate::circuit_breaker::{ApiCircuitBreaker, ApiCircuitBreakerConfig};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const BASE_URL: &str = "https://api-web.nhle.com/v1";

#[derive(Clone)]
pub struct NhlClient {
    client: Client,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl std::fmt::Debug for NhlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NhlClient")
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

/// One game from the daily scoreboard
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoreboardGame {
    pub id: i64,
    pub home_team_id: u32,
    pub away_team_id: u32,
}

/// One game from the club season schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduledGame {
    pub date: String,
    pub home_team_id: u32,
    pub away_place_name: String,
}

impl NhlClient {
    pub fn new() -> Self {
        Self::with_config(ApiCircuitBreakerConfig::default())
    }

    pub fn with_config(config: ApiCircuitBreakerConfig) -> Self {
        Self {
            client: super::build_http_client(),
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("nhl", config)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.circuit_breaker.is_available()
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        if !self.circuit_breaker.is_available() {
            return Err(anyhow!("NHL api-web circuit breaker is open ({})", url));
        }

        let result = async {
            let resp = self.client.get(url).send().await?;
            let data: Value = resp.json().await?;
            Ok(data)
        }
        .await;

        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(_) => self.circuit_breaker.record_failure(),
        }

        result
    }

    /// All games on the league scoreboard for a given date
    pub async fn scoreboard(&self, date: NaiveDate) -> Result<Vec<ScoreboardGame>> {
        let url = format!("{}/score/{}", BASE_URL, date.format("%Y-%m-%d"));
        let data = self.fetch_json(&url).await?;
        Ok(parse_scoreboard(&data))
    }

    /// Season schedule for a club, e.g. `ANA`
    pub async fn club_schedule(&self, team_abbr: &str) -> Result<Vec<ScheduledGame>> {
        let url = format!("{}/club-schedule-season/{}/now", BASE_URL, team_abbr);
        let data = self.fetch_json(&url).await?;
        Ok(parse_club_schedule(&data))
    }

    /// Raw gamecenter play-by-play document for a game
    pub async fn play_by_play(&self, game_id: i64) -> Result<Value> {
        let url = format!("{}/gamecenter/{}/play-by-play", BASE_URL, game_id);
        self.fetch_json(&url).await
    }
}

impl Default for NhlClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the daily scoreboard into game rows
pub fn parse_scoreboard(data: &Value) -> Vec<ScoreboardGame> {
    let mut games = Vec::new();

    if let Some(daily_games) = data["games"].as_array() {
        for game in daily_games {
            let id = game["id"].as_i64().unwrap_or_default();
            let home_team_id = game["homeTeam"]["id"].as_u64().unwrap_or_default() as u32;
            let away_team_id = game["awayTeam"]["id"].as_u64().unwrap_or_default() as u32;
            games.push(ScoreboardGame {
                id,
                home_team_id,
                away_team_id,
            });
        }
    }

    games
}

/// Parse the club season schedule into rows
pub fn parse_club_schedule(data: &Value) -> Vec<ScheduledGame> {
    let mut games = Vec::new();

    if let Some(rows) = data["games"].as_array() {
        for row in rows {
            let date = row["gameDate"].as_str().unwrap_or_default().to_string();
            let home_team_id = row["homeTeam"]["id"].as_u64().unwrap_or_default() as u32;
            let away_place_name = row["awayTeam"]["placeName"]["default"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            games.push(ScheduledGame {
                date,
                home_team_id,
                away_place_name,
            });
        }
    }

    games
}

/// Whether the play-by-play feed shows a finished game.
///
/// An empty `plays` array means the game has not started.
pub fn is_game_over(play_by_play: &Value) -> bool {
    play_by_play["plays"]
        .as_array()
        .and_then(|plays| plays.last())
        .map(|last| last["typeDescKey"].as_str() == Some("game-end"))
        .unwrap_or(false)
}

/// Home score with the shootout adjustment applied.
///
/// If the game ended in a shootout, the scoreboard includes the awarded
/// shootout winner goal; that goal is excluded and the team's actual shootout
/// goals are counted instead. Returns None if the game is not over.
pub fn final_home_score(play_by_play: &Value, home_team_id: u32) -> Option<u32> {
    if !is_game_over(play_by_play) {
        return None;
    }

    let plays = play_by_play["plays"].as_array()?;
    let last = plays.last()?;
    let home_score = play_by_play["homeTeam"]["score"].as_u64().unwrap_or(0) as u32;

    if last["periodDescriptor"]["periodType"].as_str() != Some("SO") {
        return Some(home_score);
    }

    // Walk the shootout plays from the end and count goals by the home team
    let mut so_goals: u32 = 0;
    for play in plays.iter().rev() {
        if play["periodDescriptor"]["periodType"].as_str() != Some("SO") {
            break;
        }
        if play["typeDescKey"].as_str() == Some("goal")
            && play["details"]["eventOwnerTeamId"].as_u64() == Some(home_team_id as u64)
        {
            so_goals += 1;
        }
    }

    Some(home_score.saturating_sub(1) + so_goals)
}
