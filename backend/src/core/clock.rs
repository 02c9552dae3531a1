//! Game time management
//!
//! The run lasts a fixed number of game hours. Wall-clock time is mapped
//! onto game time through `secs_per_hour`, so a demo run can compress a
//! 24-hour game into minutes while every engine still reasons in game
//! hours and game seconds.
//!
//! Engines never read this clock directly - the scheduler samples it and
//! persists the current hour / elapsed seconds into the game state, which
//! is what gate checks and sweeps consume. That keeps engine behaviour
//! fully scriptable in tests.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Phase of the game derived from the current hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    PreGame,
    Accumulation,
    Volatility,
    Desperation,
    Endgame,
    PostGame,
}

impl GamePhase {
    /// Map a game hour to its phase for a standard-length run.
    ///
    /// # Example
    /// ```
    /// use gauntlet_sim_core_rs::GamePhase;
    ///
    /// assert_eq!(GamePhase::for_hour(3, 24), GamePhase::Accumulation);
    /// assert_eq!(GamePhase::for_hour(25, 24), GamePhase::PostGame);
    /// ```
    pub fn for_hour(hour: u32, duration_hours: u32) -> Self {
        if hour > duration_hours {
            return GamePhase::PostGame;
        }
        let quarter = duration_hours.max(4) / 4;
        match hour {
            0 => GamePhase::PreGame,
            h if h <= quarter => GamePhase::Accumulation,
            h if h <= quarter * 2 => GamePhase::Volatility,
            h if h <= quarter * 3 => GamePhase::Desperation,
            _ => GamePhase::Endgame,
        }
    }

    /// Lowercase label used in persisted state and notices.
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::PreGame => "pre_game",
            GamePhase::Accumulation => "accumulation",
            GamePhase::Volatility => "volatility",
            GamePhase::Desperation => "desperation",
            GamePhase::Endgame => "endgame",
            GamePhase::PostGame => "post_game",
        }
    }
}

/// Wall-clock-driven game clock.
///
/// # Example
/// ```
/// use gauntlet_sim_core_rs::GameClock;
///
/// let clock = GameClock::start(24, 3600);
/// assert_eq!(clock.current_hour(), 0);
/// assert!(!clock.is_expired());
/// ```
#[derive(Debug, Clone)]
pub struct GameClock {
    started_at: Instant,
    duration_hours: u32,
    secs_per_hour: u64,
}

impl GameClock {
    /// Start the clock now.
    ///
    /// # Panics
    /// Panics if `secs_per_hour` is zero.
    pub fn start(duration_hours: u32, secs_per_hour: u64) -> Self {
        assert!(secs_per_hour > 0, "secs_per_hour must be positive");
        Self {
            started_at: Instant::now(),
            duration_hours,
            secs_per_hour,
        }
    }

    /// Game seconds elapsed since the run started.
    pub fn game_secs(&self) -> u64 {
        let wall = self.started_at.elapsed().as_secs();
        wall.saturating_mul(3600) / self.secs_per_hour
    }

    /// Integer game hour, starting at 0.
    pub fn current_hour(&self) -> u32 {
        (self.game_secs() / 3600) as u32
    }

    /// Phase for the current hour.
    pub fn phase(&self) -> GamePhase {
        GamePhase::for_hour(self.current_hour(), self.duration_hours)
    }

    /// Whether the configured duration has fully elapsed.
    pub fn is_expired(&self) -> bool {
        self.current_hour() >= self.duration_hours
    }

    /// Configured run length in game hours.
    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }
}
