//! Poll interval selection.
//!
//! One scheduler tick replaces the original's scattered sleeps: poll every
//! ten minutes while any tracked game is pending, every six hours otherwise.

use std::time::Duration;

/// What the state table says about today's slate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchContext {
    /// At least one team has a game scheduled or in progress
    GamesPending,
    /// Nothing to watch until the next schedule refresh
    Idle,
}

impl WatchContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GamesPending => "games_pending",
            Self::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    active_interval: Duration,
    idle_interval: Duration,
}

impl PollScheduler {
    pub fn new(active_interval: Duration, idle_interval: Duration) -> Self {
        Self {
            active_interval,
            idle_interval,
        }
    }

    pub fn context(&self, pending_games: usize) -> WatchContext {
        if pending_games > 0 {
            WatchContext::GamesPending
        } else {
            WatchContext::Idle
        }
    }

    pub fn interval(&self, context: WatchContext) -> Duration {
        match context {
            WatchContext::GamesPending => self.active_interval,
            WatchContext::Idle => self.idle_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> PollScheduler {
        PollScheduler::new(Duration::from_secs(600), Duration::from_secs(21_600))
    }

    #[test]
    fn test_pending_games_use_short_interval() {
        let s = scheduler();
        let ctx = s.context(2);
        assert_eq!(ctx, WatchContext::GamesPending);
        assert_eq!(s.interval(ctx), Duration::from_secs(600));
    }

    #[test]
    fn test_idle_uses_long_interval() {
        let s = scheduler();
        let ctx = s.context(0);
        assert_eq!(ctx, WatchContext::Idle);
        assert_eq!(s.interval(ctx), Duration::from_secs(21_600));
    }
}
