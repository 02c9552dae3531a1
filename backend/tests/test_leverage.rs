//! Tests for leveraged directional bets
//!
//! CRITICAL: All money values are i64 (cents)

mod common;

use common::{advance_secs, assert_conserved, balance_of, setup, setup_default};
use gauntlet_sim_core_rs::{GameConfig, LeverageDirection, LeverageStatus};

#[tokio::test]
async fn leverage_is_gated_until_its_unlock_hour() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    let err = engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unlocks at hour 6"));

    common::set_hour(&engines, 6).await;
    assert!(engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 1)
        .await
        .is_ok());
}

#[tokio::test]
async fn winning_bet_pays_stake_times_multiplier() {
    // Stake 4.00 at fee 0.20, multiplier 1.75, betting above 1000.
    let config = GameConfig {
        leverage_fee: 20,
        ..GameConfig::default()
    };
    let engines = setup(config, &[("vega", 1_000)], 6).await;

    let position = engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 400, 2)
        .await
        .unwrap();
    // Stake and fee escrowed/burned at creation.
    assert_eq!(balance_of(&engines, "vega").await, 580);
    assert_eq!(position.potential_return, 700);
    assert_conserved(&engines).await;

    // Settlement price above the target wins 7.00.
    let result = engines
        .trading
        .settle_position(position.id(), 1_050.0)
        .await
        .unwrap();
    assert_eq!(result.payout, 700);
    assert_eq!(balance_of(&engines, "vega").await, 1_280);
    assert!(matches!(result.position.status, LeverageStatus::Won { .. }));
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn losing_bet_forfeits_the_stake() {
    let config = GameConfig {
        leverage_fee: 20,
        ..GameConfig::default()
    };
    let engines = setup(config, &[("vega", 1_000)], 6).await;
    let position = engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 400, 2)
        .await
        .unwrap();

    let result = engines
        .trading
        .settle_position(position.id(), 950.0)
        .await
        .unwrap();
    assert_eq!(result.payout, 0);
    assert_eq!(balance_of(&engines, "vega").await, 580);
    assert!(matches!(result.position.status, LeverageStatus::Lost { .. }));
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn below_direction_wins_under_the_target() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    common::set_hour(&engines, 6).await;
    let position = engines
        .trading
        .open_position("vega", LeverageDirection::Below, 900.0, 100, 1)
        .await
        .unwrap();
    let result = engines
        .trading
        .settle_position(position.id(), 899.99)
        .await
        .unwrap();
    assert!(matches!(result.position.status, LeverageStatus::Won { .. }));
}

#[tokio::test]
async fn exact_target_price_loses_either_direction() {
    let engines = setup_default(&[("vega", 2_000)]).await;
    common::set_hour(&engines, 6).await;
    for direction in [LeverageDirection::Above, LeverageDirection::Below] {
        let position = engines
            .trading
            .open_position("vega", direction, 1_000.0, 100, 1)
            .await
            .unwrap();
        let result = engines
            .trading
            .settle_position(position.id(), 1_000.0)
            .await
            .unwrap();
        assert_eq!(result.payout, 0);
    }
}

#[tokio::test]
async fn at_most_three_concurrent_positions() {
    let engines = setup_default(&[("vega", 10_000)]).await;
    common::set_hour(&engines, 6).await;
    for _ in 0..3 {
        engines
            .trading
            .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 1)
            .await
            .unwrap();
    }
    let err = engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("max 3"));

    // Settling one frees a slot.
    let positions = engines.trading.active_positions("vega").await;
    engines
        .trading
        .settle_position(positions[0].id(), 1_100.0)
        .await
        .unwrap();
    assert!(engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 1)
        .await
        .is_ok());
}

#[tokio::test]
async fn sweep_settles_only_matured_positions() {
    let engines = setup_default(&[("vega", 10_000)]).await;
    common::set_hour(&engines, 6).await;
    engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 1)
        .await
        .unwrap();
    engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1_000.0, 100, 5)
        .await
        .unwrap();

    // One game hour later only the first position is due.
    advance_secs(&engines, 3_600).await;
    let settled = engines.trading.settle_due_positions(1_100.0).await;
    assert_eq!(settled.len(), 1);
    assert_eq!(engines.trading.active_positions("vega").await.len(), 1);
}

#[tokio::test]
async fn margin_call_liquidates_every_active_position() {
    let engines = setup_default(&[("vega", 10_000), ("rigel", 10_000)]).await;
    common::set_hour(&engines, 6).await;
    engines
        .trading
        .open_position("vega", LeverageDirection::Above, 1.0, 100, 1)
        .await
        .unwrap();
    engines
        .trading
        .open_position("rigel", LeverageDirection::Below, 1_000_000.0, 100, 1)
        .await
        .unwrap();

    // Both positions would win at the current price; liquidation zeroes
    // them regardless of direction.
    let count = engines.trading.liquidate_all().await.unwrap();
    assert_eq!(count, 2);
    assert!(engines.trading.active_positions("vega").await.is_empty());
    assert!(engines.trading.active_positions("rigel").await.is_empty());
    assert_eq!(balance_of(&engines, "vega").await, 10_000 - 105);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn eliminated_actors_cannot_bet() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    common::set_hour(&engines, 6).await;
    engines.events.force_eliminate("rigel", 6).await.unwrap();
    assert!(engines
        .trading
        .open_position("rigel", LeverageDirection::Above, 1_000.0, 100, 1)
        .await
        .is_err());
}
