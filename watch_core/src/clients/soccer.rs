//! Soccer page client (fbref + ESPN).
//!
//! There is no public JSON feed for MLS fixtures that carries the venue, so
//! the schedule comes from the fbref matchlogs table and finished-match
//! results from the ESPN team results page. Both are HTML, parsed with
//! `scraper`.

use crate::circuit_breaker::{ApiCircuitBreaker, ApiCircuitBreakerConfig};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct SoccerClient {
    client: Client,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl std::fmt::Debug for SoccerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoccerClient")
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

/// One row of the fbref matchlogs table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchLogRow {
    pub date: NaiveDate,
    pub venue: String,
    pub opponent: String,
}

impl MatchLogRow {
    pub fn is_home(&self) -> bool {
        self.venue.eq_ignore_ascii_case("home")
    }
}

/// One row of the ESPN team results table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchResult {
    pub date: Option<NaiveDate>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
}

/// Full-time outcome from the home side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    pub fn home_outcome(&self) -> MatchOutcome {
        if self.home_score > self.away_score {
            MatchOutcome::Win
        } else if self.home_score < self.away_score {
            MatchOutcome::Loss
        } else {
            MatchOutcome::Draw
        }
    }
}

impl SoccerClient {
    pub fn new() -> Self {
        Self::with_config(ApiCircuitBreakerConfig::default())
    }

    pub fn with_config(config: ApiCircuitBreakerConfig) -> Self {
        Self {
            client: super::build_http_client(),
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("soccer", config)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.circuit_breaker.is_available()
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        if !self.circuit_breaker.is_available() {
            return Err(anyhow!("soccer page circuit breaker is open ({})", url));
        }

        let result = async {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("soccer page non-2xx: {status} for {url}");
            }
            let body = resp.text().await?;
            Ok(body)
        }
        .await;

        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(_) => self.circuit_breaker.record_failure(),
        }

        result
    }

    /// Season matchlogs for a squad from fbref, e.g. squad `81d817a3`
    /// (Los-Angeles-FC) in MLS (competition `c22`).
    pub async fn fbref_matchlogs(
        &self,
        squad_id: &str,
        squad_slug: &str,
        year: i32,
    ) -> Result<Vec<MatchLogRow>> {
        let url = format!(
            "https://fbref.com/en/squads/{}/{}/matchlogs/c22/schedule/{}-Scores-and-Fixtures-Major-League-Soccer",
            squad_id, year, squad_slug
        );
        let html = self.fetch_html(&url).await?;
        parse_matchlogs(&html)
    }

    /// Finished matches from the ESPN team results page,
    /// e.g. team path `18966/usa.lafc`.
    pub async fn espn_results(&self, team_path: &str, year: i32) -> Result<Vec<MatchResult>> {
        let url = format!("https://www.espn.com/soccer/team/results/_/id/{}", team_path);
        let html = self.fetch_html(&url).await?;
        parse_results_page(&html, year)
    }
}

impl Default for SoccerClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the fbref matchlogs table (`table#matchlogs_for`).
///
/// Blank date cells are section separators (playoff split) and are skipped.
pub fn parse_matchlogs(html: &str) -> Result<Vec<MatchLogRow>> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table#matchlogs_for").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let date_sel = Selector::parse("th[data-stat=\"date\"]").unwrap();
    let venue_sel = Selector::parse("td[data-stat=\"venue\"]").unwrap();
    let opponent_sel = Selector::parse("td[data-stat=\"opponent\"]").unwrap();

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| anyhow!("matchlogs table not found on page"))?;

    let mut rows = Vec::new();

    for row in table.select(&row_sel).skip(1) {
        let date_text = row
            .select(&date_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if date_text.is_empty() {
            continue;
        }

        let Ok(date) = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d") else {
            continue;
        };

        let venue = row
            .select(&venue_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let opponent = row
            .select(&opponent_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        rows.push(MatchLogRow {
            date,
            venue,
            opponent,
        });
    }

    Ok(rows)
}

/// Parse the ESPN results table. Dates on the page omit the year
/// ("Sat, Aug 23"), so the caller supplies one.
pub fn parse_results_page(html: &str, year: i32) -> Result<Vec<MatchResult>> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("div.ResponsiveTable").unwrap();
    let row_sel = Selector::parse("tr.Table__TR").unwrap();
    let date_sel = Selector::parse("div.matchTeams").unwrap();
    let team_sel = Selector::parse("a.AnchorLink.Table__Team").unwrap();
    let score_sel = Selector::parse("span.Table__Team.score").unwrap();

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| anyhow!("results table not found on page"))?;

    let mut results = Vec::new();

    for row in table.select(&row_sel).skip(1) {
        let date_text = row
            .select(&date_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let teams: Vec<String> = row
            .select(&team_sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        if teams.len() < 2 {
            continue;
        }

        let score_text = row
            .select(&score_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let Some((home_score, away_score)) = parse_score(&score_text) else {
            continue;
        };

        results.push(MatchResult {
            date: parse_result_date(&date_text, year),
            home_team: teams[0].clone(),
            away_team: teams[1].clone(),
            home_score,
            away_score,
        });
    }

    Ok(results)
}

/// "2 - 1" or "2-1" -> (2, 1)
fn parse_score(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.split('-');
    let home = parts.next()?.trim().parse::<u32>().ok()?;
    let away = parts.next()?.trim().parse::<u32>().ok()?;
    Some((home, away))
}

/// "Sat, Aug 23" -> 2025-08-23. The weekday prefix is dropped rather than
/// validated, since ESPN's weekday may disagree with the assumed year.
fn parse_result_date(raw: &str, year: i32) -> Option<NaiveDate> {
    let without_weekday = raw.split_once(", ").map(|(_, rest)| rest).unwrap_or(raw);
    NaiveDate::parse_from_str(&format!("{} {}", without_weekday, year), "%b %d %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCHLOGS_HTML: &str = r#"
        <html><body>
        <table id="matchlogs_for">
          <tr><th>Date</th><th>Venue</th><th>Opponent</th></tr>
          <tr>
            <th data-stat="date">2025-08-16</th>
            <td data-stat="venue">Away</td>
            <td data-stat="opponent">Seattle Sounders</td>
          </tr>
          <tr>
            <th data-stat="date"></th>
          </tr>
          <tr>
            <th data-stat="date">2025-08-23</th>
            <td data-stat="venue">Home</td>
            <td data-stat="opponent">Austin FC</td>
          </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_matchlogs() {
        let rows = parse_matchlogs(MATCHLOGS_HTML).unwrap();
        assert_eq!(rows.len(), 2); // separator row skipped
        assert!(!rows[0].is_home());
        assert!(rows[1].is_home());
        assert_eq!(rows[1].opponent, "Austin FC");
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2025, 8, 23).unwrap());
    }

    #[test]
    fn test_parse_matchlogs_missing_table() {
        assert!(parse_matchlogs("<html><body></body></html>").is_err());
    }

    const RESULTS_HTML: &str = r#"
        <html><body>
        <div class="ResponsiveTable Table__results">
          <table>
            <tr class="Table__TR"><th>header</th></tr>
            <tr class="Table__TR">
              <td><div class="matchTeams">Sat, Aug 23</div></td>
              <td><a class="AnchorLink Table__Team">LAFC</a></td>
              <td><span class="Table__Team score">2 - 1</span></td>
              <td><a class="AnchorLink Table__Team">Austin FC</a></td>
            </tr>
          </table>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let results = parse_results_page(RESULTS_HTML, 2025).unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.home_team, "LAFC");
        assert_eq!(result.away_team, "Austin FC");
        assert_eq!(result.home_score, 2);
        assert_eq!(result.away_score, 1);
        assert_eq!(result.date, Some(NaiveDate::from_ymd_opt(2025, 8, 23).unwrap()));
        assert_eq!(result.home_outcome(), MatchOutcome::Win);
    }

    #[test]
    fn test_home_outcome() {
        let mut result = MatchResult {
            date: None,
            home_team: "LAFC".to_string(),
            away_team: "LA Galaxy".to_string(),
            home_score: 1,
            away_score: 1,
        };
        assert_eq!(result.home_outcome(), MatchOutcome::Draw);
        result.away_score = 3;
        assert_eq!(result.home_outcome(), MatchOutcome::Loss);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("2 - 1"), Some((2, 1)));
        assert_eq!(parse_score("0-0"), Some((0, 0)));
        assert_eq!(parse_score("v"), None);
    }

    #[test]
    fn test_parse_result_date() {
        assert_eq!(
            parse_result_date("Sat, Aug 23", 2025),
            NaiveDate::from_ymd_opt(2025, 8, 23)
        );
        assert_eq!(parse_result_date("garbage", 2025), None);
    }
}
