//! Message bodies for the promo channel.
//!
//! The catalog carries the configured score thresholds so the text always
//! states the rule that actually fired.

use chrono::NaiveDate;
use watch_core::models::UpcomingGame;

const CLAIM_LINK: &str =
    "Open [here](https://apps.apple.com/us/app/chick-fil-a/id488818252) to claim your sandwich!";

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    ducks_goal_threshold: u32,
    angels_run_threshold: u32,
}

impl MessageCatalog {
    pub fn new(ducks_goal_threshold: u32, angels_run_threshold: u32) -> Self {
        Self {
            ducks_goal_threshold,
            angels_run_threshold,
        }
    }

    /// Celebration message when a team's promo rule hits
    pub fn celebration(&self, key: &str) -> String {
        let body = match key {
            "lafc" => "LAFC has won their home game!".to_string(),
            "ducks" => format!(
                "The Anaheim Ducks have scored {} or more goals at a home game!",
                self.ducks_goal_threshold
            ),
            "angels" => format!(
                "The Los Angeles Angels have scored {} or more runs at a home game!",
                self.angels_run_threshold
            ),
            "clippers" => {
                "The opponents of the Los Angeles Clippers missed 2 free throws in the 4th \
                 quarter at a home game!"
                    .to_string()
            }
            other => format!("{} hit their home-game promo!", other),
        };

        format!("@everyone {} Free Chick-fil-A sandwich! {}", body, CLAIM_LINK)
    }

    /// Consolation message when the game finished without a promo hit
    pub fn consolation(&self, key: &str) -> String {
        match key {
            "lafc" => "LAFC did not win... no free sandwich today...".to_string(),
            "ducks" => format!(
                "The Anaheim Ducks did not score {} goals... no free sandwich today...",
                self.ducks_goal_threshold
            ),
            "angels" => format!(
                "The Angels did not score {} runs... no free sandwich today...",
                self.angels_run_threshold
            ),
            "clippers" => {
                "The Clippers opponents did not miss 2 free throws in the 4th quarter... \
                 no free sandwich today..."
                    .to_string()
            }
            other => format!("{} missed their promo... no free sandwich today...", other),
        }
    }
}

/// Summary line for the closest upcoming promo chance
pub fn next_chance(upcoming: &UpcomingGame, today: NaiveDate) -> String {
    let date = upcoming.date.format("%b %d, %Y");
    if upcoming.date == today {
        format!(
            "There's a chance TODAY for a free Chick-fil-A sandwich: {} vs {} on {}",
            upcoming.team, upcoming.opponent, date
        )
    } else {
        format!(
            "The next chance for a free Chick-fil-A sandwich: {} vs {} on {}",
            upcoming.team, upcoming.opponent, date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        MessageCatalog::new(5, 7)
    }

    #[test]
    fn test_celebration_known_teams() {
        let msg = catalog().celebration("ducks");
        assert!(msg.starts_with("@everyone"));
        assert!(msg.contains("5 or more goals"));
        assert!(msg.contains("chick-fil-a/id488818252"));

        assert!(catalog().celebration("lafc").contains("won their home game"));
        assert!(catalog().celebration("clippers").contains("4th quarter"));
    }

    #[test]
    fn test_consolation_no_mention() {
        let msg = catalog().consolation("angels");
        assert!(!msg.contains("@everyone"));
        assert!(msg.contains("7 runs"));
        assert!(msg.contains("no free sandwich"));
    }

    #[test]
    fn test_messages_follow_configured_thresholds() {
        let catalog = MessageCatalog::new(6, 10);
        assert!(catalog.celebration("ducks").contains("6 or more goals"));
        assert!(catalog.celebration("angels").contains("10 or more runs"));
        assert!(catalog.consolation("ducks").contains("6 goals"));
        assert!(catalog.consolation("angels").contains("10 runs"));
    }

    #[test]
    fn test_next_chance_today_vs_future() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
        let game = UpcomingGame {
            team: "LAFC".to_string(),
            opponent: "Austin FC".to_string(),
            date: today,
        };
        assert!(next_chance(&game, today).contains("TODAY"));

        let later = UpcomingGame {
            date: NaiveDate::from_ymd_opt(2025, 8, 30).unwrap(),
            ..game
        };
        let msg = next_chance(&later, today);
        assert!(msg.contains("next chance"));
        assert!(msg.contains("Aug 30, 2025"));
    }
}
