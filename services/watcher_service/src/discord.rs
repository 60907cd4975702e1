//! Discord REST delivery.
//!
//! Plain REST calls against the channel-messages endpoint; no gateway
//! connection. Celebration messages can be scheduled for deletion at local
//! midnight so yesterday's promo does not linger in the channel.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use chrono_tz::Tz;
use log::{error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const API_BASE_URL: &str = "https://discord.com/api/v10";

/// Seam for the monitor loop: anything that can announce to the channel
#[async_trait]
pub trait Notify: Send + Sync {
    async fn announce(&self, message: &str) -> Result<()>;

    /// Announce and schedule deletion at the next local midnight
    async fn announce_until_midnight(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    token: String,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

impl DiscordClient {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
        }
    }

    /// Post a message, returning its id
    pub async fn send(&self, channel_id: u64, content: &str) -> Result<String> {
        let url = format!("{}/channels/{}/messages", API_BASE_URL, channel_id);
        let body = CreateMessage { content };

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Discord API request failed: {url}"))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Discord API non-2xx: {status} body={text}");
        }

        let message: Value = serde_json::from_str(&text)
            .with_context(|| "Discord API returned non-JSON message body")?;
        Ok(message["id"].as_str().unwrap_or_default().to_string())
    }

    pub async fn delete_message(&self, channel_id: u64, message_id: &str) -> Result<()> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            API_BASE_URL, channel_id, message_id
        );

        let resp = self
            .http
            .delete(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .with_context(|| format!("Discord API request failed: {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Discord API non-2xx: {status} body={text}");
        }
        Ok(())
    }
}

/// Notifier bound to one channel
pub struct DiscordNotifier {
    client: Arc<DiscordClient>,
    channel_id: u64,
    tz: Tz,
}

impl DiscordNotifier {
    pub fn new(client: DiscordClient, channel_id: u64, tz: Tz) -> Self {
        Self {
            client: Arc::new(client),
            channel_id,
            tz,
        }
    }

    fn seconds_until_midnight(&self) -> u64 {
        seconds_until_next_midnight(Utc::now(), self.tz)
    }
}

/// Seconds from `now` until the next midnight in `tz`.
///
/// Resolved through the timezone rather than by naive subtraction, so the
/// delay stays correct across a DST transition night.
fn seconds_until_next_midnight(now: DateTime<Utc>, tz: Tz) -> u64 {
    let local_now = now.with_timezone(&tz);
    let tomorrow = (local_now + ChronoDuration::days(1)).date_naive();

    tomorrow
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|midnight| (midnight.with_timezone(&Utc) - now).num_seconds().max(0) as u64)
        .unwrap_or(0)
}

#[async_trait]
impl Notify for DiscordNotifier {
    async fn announce(&self, message: &str) -> Result<()> {
        self.client.send(self.channel_id, message).await?;
        Ok(())
    }

    async fn announce_until_midnight(&self, message: &str) -> Result<()> {
        let message_id = self.client.send(self.channel_id, message).await?;
        let delay_secs = self.seconds_until_midnight();

        let client = self.client.clone();
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(delay_secs)).await;
            match client.delete_message(channel_id, &message_id).await {
                Ok(()) => info!("Deleted promo message {} at local midnight", message_id),
                Err(e) => error!("Failed to delete promo message {}: {}", message_id, e),
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_seconds_until_next_midnight_plain_day() {
        // Noon PDT -> next midnight is 12h away
        let now = utc("2025-06-10T19:00:00Z");
        assert_eq!(seconds_until_next_midnight(now, Los_Angeles), 12 * 3600);
    }

    #[test]
    fn test_seconds_until_next_midnight_spring_forward() {
        // 2025-03-09 01:00 PST; clocks jump 02:00 -> 03:00 later that night,
        // so midnight on 03-10 is only 22h of real time away
        let now = utc("2025-03-09T09:00:00Z");
        assert_eq!(seconds_until_next_midnight(now, Los_Angeles), 22 * 3600);
    }

    #[test]
    fn test_seconds_until_next_midnight_fall_back() {
        // 2025-11-02 01:00 PDT, before the repeated hour; midnight on 11-03
        // is 24h of real time away, not the naive 23
        let now = utc("2025-11-02T08:00:00Z");
        assert_eq!(seconds_until_next_midnight(now, Los_Angeles), 24 * 3600);
    }
}
