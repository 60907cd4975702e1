//! NBA stats / cdn client.
//!
//! Game-id discovery goes through the stats.nba.com broadcaster schedule
//! (which needs a browser user agent), live plays come from the cdn
//! play-by-play feed, and upcoming games from the static season schedule.

use crate::circuit_breaker::{ApiCircuitBreaker, ApiCircuitBreakerConfig};
use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct NbaClient {
    client: Client,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl std::fmt::Debug for NbaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NbaClient")
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

/// One game from the broadcaster schedule result sets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastGame {
    pub game_id: String,
    pub home_nickname: String,
    /// MM/DD/YYYY, as the feed formats it
    pub date: String,
}

/// One action from the cdn play-by-play feed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayAction {
    pub period: u8,
    pub action_type: String,
    pub sub_type: String,
    pub description: String,
    pub team_tricode: String,
}

/// One game from the static season schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeagueScheduleGame {
    pub date: Option<NaiveDate>,
    pub home_team_name: String,
    pub away_team_city: String,
    pub away_team_name: String,
}

impl NbaClient {
    pub fn new() -> Self {
        Self::with_config(ApiCircuitBreakerConfig::default())
    }

    pub fn with_config(config: ApiCircuitBreakerConfig) -> Self {
        Self {
            client: super::build_http_client(),
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("nba", config)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.circuit_breaker.is_available()
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        if !self.circuit_breaker.is_available() {
            return Err(anyhow!("NBA feed circuit breaker is open ({})", url));
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

    /// Broadcaster schedule for a date: (upcoming games, live-or-finished games)
    pub async fn broadcaster_schedule(
        &self,
        season: &str,
        date_mdy: &str,
    ) -> Result<(Vec<BroadcastGame>, Vec<BroadcastGame>)> {
        let url = format!(
            "https://stats.nba.com/stats/internationalbroadcasterschedule?LeagueID=00&Season={}&RegionID=1&Date={}&EST=Y",
            season, date_mdy
        );
        let data = self.fetch_json(&url).await?;
        Ok(parse_broadcaster_schedule(&data))
    }

    /// Live play-by-play actions for a game
    pub async fn play_by_play(&self, game_id: &str) -> Result<Vec<PlayAction>> {
        let url = format!(
            "https://cdn.nba.com/static/json/liveData/playbyplay/playbyplay_{}.json",
            game_id
        );
        let data = self.fetch_json(&url).await?;
        Ok(parse_play_actions(&data))
    }

    /// Full static season schedule
    pub async fn league_schedule(&self) -> Result<Vec<LeagueScheduleGame>> {
        let url = "https://cdn.nba.com/static/json/staticData/scheduleLeagueV2.json";
        let data = self.fetch_json(url).await?;
        Ok(parse_league_schedule(&data))
    }
}

impl Default for NbaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Season string for the broadcaster schedule. The NBA season is labeled by
/// its starting year, so dates before June belong to the previous year.
pub fn season_for(date: NaiveDate) -> String {
    let year = if date.month() < 6 {
        date.year() - 1
    } else {
        date.year()
    };
    year.to_string()
}

/// Parse the two broadcaster schedule result sets
pub fn parse_broadcaster_schedule(data: &Value) -> (Vec<BroadcastGame>, Vec<BroadcastGame>) {
    let next = parse_broadcast_list(&data["resultSets"][0]["NextGameList"]);
    let complete = parse_broadcast_list(&data["resultSets"][1]["CompleteGameList"]);
    (next, complete)
}

fn parse_broadcast_list(list: &Value) -> Vec<BroadcastGame> {
    let mut games = Vec::new();

    if let Some(rows) = list.as_array() {
        for game in rows {
            games.push(BroadcastGame {
                game_id: game["gameID"].as_str().unwrap_or_default().to_string(),
                home_nickname: game["htNickName"].as_str().unwrap_or_default().to_string(),
                date: game["date"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    games
}

/// Parse cdn play-by-play actions
pub fn parse_play_actions(data: &Value) -> Vec<PlayAction> {
    let mut actions = Vec::new();

    if let Some(events) = data["game"]["actions"].as_array() {
        for event in events {
            actions.push(PlayAction {
                period: event["period"].as_u64().unwrap_or(0) as u8,
                action_type: event["actionType"].as_str().unwrap_or_default().to_string(),
                sub_type: event["subType"].as_str().unwrap_or_default().to_string(),
                description: event["description"].as_str().unwrap_or_default().to_string(),
                team_tricode: event["teamTricode"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    actions
}

/// Whether the play feed contains the game-end marker
pub fn game_ended(actions: &[PlayAction]) -> bool {
    actions
        .iter()
        .any(|a| a.action_type == "game" && (a.sub_type == "end" || a.description == "Game End"))
}

/// Missed trailing free throw by a non-tracked team in the 4th quarter.
///
/// Matches the promo rule: a missed `2 of 2`, `2 of 3`, or `3 of 3` free
/// throw, in period 4, by any team other than `tracked_tricode`.
pub fn opponent_missed_trailing_ft(actions: &[PlayAction], tracked_tricode: &str) -> bool {
    actions.iter().any(|event| {
        event.period == 4
            && event.description.contains("MISS")
            && event.description.contains("Free Throw")
            && (event.description.contains("2 of 2")
                || event.description.contains("2 of 3")
                || event.description.contains("3 of 3"))
            && event.team_tricode != tracked_tricode
    })
}

/// Parse the static season schedule (gameDates -> games)
pub fn parse_league_schedule(data: &Value) -> Vec<LeagueScheduleGame> {
    let mut games = Vec::new();

    let Some(game_dates) = data["leagueSchedule"]["gameDates"].as_array() else {
        return games;
    };

    for game_date in game_dates {
        // e.g. "10/05/2024 00:00:00"
        let date = game_date["gameDate"]
            .as_str()
            .and_then(|raw| NaiveDate::parse_from_str(&raw[..raw.len().min(10)], "%m/%d/%Y").ok());

        let Some(day_games) = game_date["games"].as_array() else {
            continue;
        };

        for game in day_games {
            games.push(LeagueScheduleGame {
                date,
                home_team_name: game["homeTeam"]["teamName"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                away_team_city: game["awayTeam"]["teamCity"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                away_team_name: game["awayTeam"]["teamName"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_season_for() {
        assert_eq!(
            season_for(NaiveDate::from_ymd_opt(2024, 11, 18).unwrap()),
            "2024"
        );
        // February belongs to the season that started the previous fall
        assert_eq!(
            season_for(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
            "2024"
        );
        assert_eq!(
            season_for(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            "2025"
        );
    }

    #[test]
    fn test_parse_broadcaster_schedule() {
        let data = json!({
            "resultSets": [
                {
                    "NextGameList": [
                        {"gameID": "0022400231", "htNickName": "Clippers", "date": "11/18/2024"}
                    ]
                },
                {
                    "CompleteGameList": [
                        {"gameID": "0022400219", "htNickName": "Lakers", "date": "11/17/2024"}
                    ]
                }
            ]
        });

        let (next, complete) = parse_broadcaster_schedule(&data);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].home_nickname, "Clippers");
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].game_id, "0022400219");
    }

    fn action(period: u8, description: &str, tricode: &str) -> PlayAction {
        PlayAction {
            period,
            action_type: "freethrow".to_string(),
            sub_type: String::new(),
            description: description.to_string(),
            team_tricode: tricode.to_string(),
        }
    }

    #[test]
    fn test_opponent_missed_trailing_ft_hit() {
        let actions = vec![
            action(2, "MISS Jones Free Throw 2 of 2", "DEN"),
            action(4, "MISS Murray Free Throw 2 of 2", "DEN"),
        ];
        assert!(opponent_missed_trailing_ft(&actions, "LAC"));
    }

    #[test]
    fn test_opponent_miss_outside_fourth_quarter_ignored() {
        let actions = vec![action(2, "MISS Murray Free Throw 2 of 2", "DEN")];
        assert!(!opponent_missed_trailing_ft(&actions, "LAC"));
    }

    #[test]
    fn test_tracked_team_miss_ignored() {
        let actions = vec![action(4, "MISS Leonard Free Throw 2 of 2", "LAC")];
        assert!(!opponent_missed_trailing_ft(&actions, "LAC"));
    }

    #[test]
    fn test_leading_ft_miss_ignored() {
        // "1 of 2" is not a trailing free throw
        let actions = vec![action(4, "MISS Murray Free Throw 1 of 2", "DEN")];
        assert!(!opponent_missed_trailing_ft(&actions, "LAC"));
    }

    #[test]
    fn test_game_ended() {
        let mut actions = vec![action(4, "Jump Ball", "DEN")];
        assert!(!game_ended(&actions));

        actions.push(PlayAction {
            period: 4,
            action_type: "game".to_string(),
            sub_type: "end".to_string(),
            description: "Game End".to_string(),
            team_tricode: String::new(),
        });
        assert!(game_ended(&actions));
    }

    #[test]
    fn test_parse_league_schedule() {
        let data = json!({
            "leagueSchedule": {
                "gameDates": [
                    {
                        "gameDate": "10/05/2024 00:00:00",
                        "games": [
                            {
                                "homeTeam": {"teamName": "Clippers"},
                                "awayTeam": {"teamCity": "Golden State", "teamName": "Warriors"}
                            }
                        ]
                    }
                ]
            }
        });

        let games = parse_league_schedule(&data);
        assert_eq!(games.len(), 1);
        assert_eq!(
            games[0].date,
            Some(NaiveDate::from_ymd_opt(2024, 10, 5).unwrap())
        );
        assert_eq!(games[0].away_team_city, "Golden State");
    }
}
