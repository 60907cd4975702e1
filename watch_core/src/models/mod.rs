//! Shared types for team watching.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Leagues we track teams in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    NHL,
    MLB,
    NBA,
    MLS,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::NHL => "NHL",
            Sport::MLB => "MLB",
            Sport::NBA => "NBA",
            Sport::MLS => "MLS",
        }
    }
}

/// Result of checking a team's promotion rule against a home game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The game has not started or has not finished yet
    NotFinished,
    /// The game is final and the promotion rule was satisfied
    PromoHit,
    /// The game is final and the promotion rule was not satisfied
    PromoMiss,
}

impl GameOutcome {
    /// Whether the game is over, regardless of the promo result
    pub fn is_final(&self) -> bool {
        !matches!(self, GameOutcome::NotFinished)
    }
}

/// A future home game for a tracked team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingGame {
    pub team: String,
    pub opponent: String,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_as_str() {
        assert_eq!(Sport::NHL.as_str(), "NHL");
        assert_eq!(Sport::MLS.as_str(), "MLS");
    }

    #[test]
    fn test_outcome_is_final() {
        assert!(!GameOutcome::NotFinished.is_final());
        assert!(GameOutcome::PromoHit.is_final());
        assert!(GameOutcome::PromoMiss.is_final());
    }

    #[test]
    fn test_upcoming_game_roundtrip() {
        let game = UpcomingGame {
            team: "Anaheim Ducks".to_string(),
            opponent: "Dallas Stars".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        };
        let json = serde_json::to_string(&game).unwrap();
        let back: UpcomingGame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.opponent, "Dallas Stars");
        assert_eq!(back.date, game.date);
    }
}
