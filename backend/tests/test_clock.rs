//! Tests for the game clock and phase mapping

use gauntlet_sim_core_rs::{GameClock, GamePhase};

#[test]
fn phases_cover_a_standard_run() {
    assert_eq!(GamePhase::for_hour(0, 24), GamePhase::PreGame);
    assert_eq!(GamePhase::for_hour(1, 24), GamePhase::Accumulation);
    assert_eq!(GamePhase::for_hour(6, 24), GamePhase::Accumulation);
    assert_eq!(GamePhase::for_hour(7, 24), GamePhase::Volatility);
    assert_eq!(GamePhase::for_hour(12, 24), GamePhase::Volatility);
    assert_eq!(GamePhase::for_hour(13, 24), GamePhase::Desperation);
    assert_eq!(GamePhase::for_hour(18, 24), GamePhase::Desperation);
    assert_eq!(GamePhase::for_hour(19, 24), GamePhase::Endgame);
    assert_eq!(GamePhase::for_hour(24, 24), GamePhase::Endgame);
    assert_eq!(GamePhase::for_hour(25, 24), GamePhase::PostGame);
}

#[test]
fn phase_labels_are_snake_case() {
    assert_eq!(GamePhase::PreGame.label(), "pre_game");
    assert_eq!(GamePhase::Endgame.label(), "endgame");
}

#[test]
fn fresh_clock_starts_at_hour_zero() {
    let clock = GameClock::start(24, 3600);
    assert_eq!(clock.current_hour(), 0);
    assert_eq!(clock.game_secs(), 0);
    assert!(!clock.is_expired());
    assert_eq!(clock.duration_hours(), 24);
}

#[test]
fn compressed_clock_advances_in_game_time() {
    // 1 wall second = 1 game hour.
    let clock = GameClock::start(2, 1);
    std::thread::sleep(std::time::Duration::from_millis(1100));
    assert!(clock.current_hour() >= 1);
    assert!(clock.game_secs() >= 3600);
}

#[test]
#[should_panic(expected = "secs_per_hour must be positive")]
fn zero_compression_is_rejected() {
    GameClock::start(24, 0);
}
