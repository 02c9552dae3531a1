//! Tests for P2P trades, tips, and bounties
//!
//! CRITICAL: All money values are i64 (cents)

mod common;

use common::{assert_conserved, balance_of, reputation_of, setup_default};
use gauntlet_sim_core_rs::TradeStatus;

#[tokio::test]
async fn accepted_trade_moves_amount_and_burns_fee() {
    // A holds 10.00 and offers 2.00 at the 0.03 fee; B accepts.
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;

    let trade = engines
        .trading
        .create_trade_offer("vega", "rigel", 200, 932.17)
        .await
        .unwrap();
    // No funds move at offer time.
    assert_eq!(balance_of(&engines, "vega").await, 1_000);
    assert_eq!(balance_of(&engines, "rigel").await, 1_000);

    engines.trading.accept_trade(trade.id(), "rigel").await.unwrap();
    assert_eq!(balance_of(&engines, "vega").await, 797);
    assert_eq!(balance_of(&engines, "rigel").await, 1_200);

    let world = engines.store.read().await;
    assert_eq!(world.actor("vega").unwrap().total_trades, 1);
    assert_eq!(world.actor("rigel").unwrap().total_trades, 1);
    // Sender delta + receiver delta reconciles to the burned fee.
    assert_eq!((1_000 - 797) - (1_200 - 1_000), 3);
    drop(world);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn offer_requires_cover_for_amount_plus_fee() {
    let engines = setup_default(&[("vega", 100), ("rigel", 1_000)]).await;
    // 100 cannot cover 100 + 3 fee.
    assert!(engines
        .trading
        .create_trade_offer("vega", "rigel", 100, 1.0)
        .await
        .is_err());
    // 97 + 3 exactly covers.
    assert!(engines
        .trading
        .create_trade_offer("vega", "rigel", 97, 1.0)
        .await
        .is_ok());
}

#[tokio::test]
async fn accept_fails_cleanly_when_sender_balance_moved() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 1_000)]).await;
    let trade = engines
        .trading
        .create_trade_offer("vega", "rigel", 900, 1.0)
        .await
        .unwrap();

    // The sender drains their balance before the receiver accepts.
    engines.trading.send_tip("vega", "altair", 50).await.unwrap();
    engines
        .trading
        .adjust_balance("vega", -800, "test drain")
        .await
        .unwrap();

    let err = engines.trading.accept_trade(trade.id(), "rigel").await;
    assert!(err.is_err());
    // No partial debit: balances exactly as before the attempt.
    assert_eq!(balance_of(&engines, "vega").await, 150);
    assert_eq!(balance_of(&engines, "rigel").await, 1_000);

    let world = engines.store.read().await;
    assert_eq!(world.trades.get(trade.id()).unwrap().status, TradeStatus::Pending);
}

#[tokio::test]
async fn self_trades_and_bad_amounts_are_rejected() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    assert!(engines
        .trading
        .create_trade_offer("vega", "vega", 100, 1.0)
        .await
        .is_err());
    assert!(engines
        .trading
        .create_trade_offer("vega", "rigel", 0, 1.0)
        .await
        .is_err());
    assert!(engines
        .trading
        .create_trade_offer("vega", "rigel", 100, 0.0)
        .await
        .is_err());
}

#[tokio::test]
async fn eliminated_actors_cannot_be_counterparties() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 0)]).await;
    engines.events.force_eliminate("altair", 1).await.unwrap();

    assert!(engines
        .trading
        .create_trade_offer("vega", "altair", 100, 1.0)
        .await
        .is_err());
    assert!(engines
        .trading
        .create_trade_offer("altair", "vega", 100, 1.0)
        .await
        .is_err());
    assert!(engines.trading.send_tip("vega", "altair", 20).await.is_err());
}

#[tokio::test]
async fn rejected_trade_touches_nothing() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let trade = engines
        .trading
        .create_trade_offer("vega", "rigel", 300, 1.0)
        .await
        .unwrap();
    engines.trading.reject_trade(trade.id(), "rigel").await.unwrap();

    assert_eq!(balance_of(&engines, "vega").await, 1_000);
    assert_eq!(balance_of(&engines, "rigel").await, 1_000);
    // A terminal trade cannot be accepted afterwards.
    assert!(engines.trading.accept_trade(trade.id(), "rigel").await.is_err());
}

#[tokio::test]
async fn only_the_receiver_can_answer_an_offer() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 1_000)]).await;
    let trade = engines
        .trading
        .create_trade_offer("vega", "rigel", 300, 1.0)
        .await
        .unwrap();
    assert!(engines.trading.accept_trade(trade.id(), "altair").await.is_err());
    assert!(engines.trading.reject_trade(trade.id(), "vega").await.is_err());
}

#[tokio::test]
async fn scam_moves_no_funds_and_penalises_the_sender() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let trade = engines
        .trading
        .create_trade_offer("vega", "rigel", 300, 1.0)
        .await
        .unwrap();
    let rep_before = reputation_of(&engines, "vega").await;

    engines.trading.mark_scam(trade.id()).await.unwrap();

    assert_eq!(balance_of(&engines, "vega").await, 1_000);
    assert_eq!(balance_of(&engines, "rigel").await, 1_000);
    assert_eq!(reputation_of(&engines, "vega").await, rep_before - 15);

    // The penalty is logged with its reason.
    let log = engines.reputation.history("vega", 5).await;
    assert_eq!(log[0].reason, "scam_confirmed");
}

#[tokio::test]
async fn tips_are_fee_free_and_range_checked() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;

    assert!(engines.trading.send_tip("vega", "rigel", 9).await.is_err());
    assert!(engines.trading.send_tip("vega", "rigel", 51).await.is_err());
    assert!(engines.trading.send_tip("vega", "vega", 20).await.is_err());

    engines.trading.send_tip("vega", "rigel", 50).await.unwrap();
    assert_eq!(balance_of(&engines, "vega").await, 950);
    assert_eq!(balance_of(&engines, "rigel").await, 1_050);
    // Symmetric reputation reward.
    assert_eq!(reputation_of(&engines, "vega").await, 51);
    assert_eq!(reputation_of(&engines, "rigel").await, 51);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn bounty_escrows_on_post_and_pays_on_claim() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let bounty = engines
        .trading
        .create_bounty("vega", "find the defector", 400)
        .await
        .unwrap();
    assert_eq!(balance_of(&engines, "vega").await, 600);
    assert_conserved(&engines).await;

    // Poster cannot claim their own bounty.
    assert!(engines.trading.claim_bounty(bounty.id(), "vega").await.is_err());

    engines.trading.claim_bounty(bounty.id(), "rigel").await.unwrap();
    assert_eq!(balance_of(&engines, "rigel").await, 1_400);
    assert_eq!(reputation_of(&engines, "rigel").await, 55);
    // A completed bounty cannot be claimed again.
    assert!(engines.trading.claim_bounty(bounty.id(), "rigel").await.is_err());
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn leaderboard_ranks_by_balance() {
    let engines = setup_default(&[("vega", 500), ("rigel", 900), ("altair", 700)]).await;
    let board = engines.trading.leaderboard().await;
    let order: Vec<&str> = board.iter().map(|e| e.actor_id.as_str()).collect();
    assert_eq!(order, vec!["rigel", "altair", "vega"]);
    assert_eq!(board[0].rank, 1);
}

#[tokio::test]
async fn frozen_trading_blocks_new_offers() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    engines.market.freeze().await;
    assert!(engines
        .trading
        .create_trade_offer("vega", "rigel", 100, 1.0)
        .await
        .is_err());
}
