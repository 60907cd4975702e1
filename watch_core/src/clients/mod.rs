//! Thin HTTP clients for the upstream sports data feeds.
//!
//! Each client wraps one upstream (NHL api-web, MLB statsapi, NBA stats/cdn,
//! fbref + ESPN soccer pages) behind a reqwest client with a request timeout
//! and a circuit breaker. Response parsing is factored into pure functions so
//! the tests run against canned documents without any network access.

pub mod mlb;
pub mod nba;
pub mod nhl;
pub mod soccer;

use reqwest::Client;
use std::time::Duration;

/// stats.nba.com and fbref reject requests without a browser user agent
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}
