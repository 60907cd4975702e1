//! Sandwich Watch core - shared team-watching logic.
//!
//! This library provides:
//! - Thin HTTP clients for the NHL, MLB, NBA, and soccer data feeds
//! - The `TeamWatcher` trait and per-league implementations
//! - A registry of the configured watchers
//! - A circuit breaker for upstream API resilience

pub mod circuit_breaker;
pub mod clients;
pub mod models;
pub mod watchers;

pub use models::{GameOutcome, Sport, UpcomingGame};
pub use watchers::{TeamWatcher, WatcherRegistry};
