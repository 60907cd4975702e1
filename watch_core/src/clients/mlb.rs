//! MLB statsapi client.
//!
//! A single schedule endpoint covers everything we need: game-today checks,
//! final scores, and upcoming-game discovery, depending on the date range.

use crate::circuit_breaker::{ApiCircuitBreaker, ApiCircuitBreakerConfig};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const BASE_URL: &str = "https://statsapi.mlb.com/api/v1";

#[derive(Clone)]
pub struct MlbClient {
    client: Client,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl std::fmt::Debug for MlbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MlbClient")
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

/// One game from the statsapi schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MlbGame {
    pub game_pk: i64,
    pub official_date: String,
    pub home_team_id: u32,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_score: Option<u32>,
    pub detailed_state: String,
    pub abstract_game_code: String,
}

impl MlbGame {
    /// Whether the game has gone final
    pub fn is_final(&self) -> bool {
        self.detailed_state == "Final" || self.abstract_game_code == "F"
    }

    /// Whether the game is still waiting to start
    pub fn is_scheduled(&self) -> bool {
        self.detailed_state == "Scheduled"
    }
}

impl MlbClient {
    pub fn new() -> Self {
        Self::with_config(ApiCircuitBreakerConfig::default())
    }

    pub fn with_config(config: ApiCircuitBreakerConfig) -> Self {
        Self {
            client: super::build_http_client(),
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("mlb", config)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.circuit_breaker.is_available()
    }

    /// Schedule for a team over a date range (inclusive)
    pub async fn schedule(
        &self,
        team_id: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MlbGame>> {
        if !self.circuit_breaker.is_available() {
            return Err(anyhow!("MLB statsapi circuit breaker is open"));
        }

        let url = format!(
            "{}/schedule?sportId=1&teamId={}&startDate={}&endDate={}",
            BASE_URL,
            team_id,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );

        let result = async {
            let resp = self.client.get(&url).send().await?;
            let data: Value = resp.json().await?;
            Ok(parse_schedule(&data))
        }
        .await;

        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(_) => self.circuit_breaker.record_failure(),
        }

        result
    }
}

impl Default for MlbClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten the statsapi schedule (dates -> games) into game rows
pub fn parse_schedule(data: &Value) -> Vec<MlbGame> {
    let mut games = Vec::new();

    let Some(dates) = data["dates"].as_array() else {
        return games;
    };

    for date_info in dates {
        let Some(day_games) = date_info["games"].as_array() else {
            continue;
        };

        for game in day_games {
            let home = &game["teams"]["home"];
            games.push(MlbGame {
                game_pk: game["gamePk"].as_i64().unwrap_or_default(),
                official_date: game["officialDate"].as_str().unwrap_or_default().to_string(),
                home_team_id: home["team"]["id"].as_u64().unwrap_or_default() as u32,
                home_team_name: home["team"]["name"].as_str().unwrap_or_default().to_string(),
                away_team_name: game["teams"]["away"]["team"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                home_score: home["score"].as_u64().map(|s| s as u32),
                detailed_state: game["status"]["detailedState"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                abstract_game_code: game["status"]["abstractGameCode"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    games
}
