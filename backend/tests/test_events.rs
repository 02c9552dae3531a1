//! Tests for scripted events, eliminations, tribunals, and snapshots
//!
//! CRITICAL: All money values are i64 (cents)

mod common;

use common::{assert_conserved, balance_of, reputation_of, setup_default};

#[tokio::test]
async fn seeded_events_trigger_exactly_once() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    engines.events.seed_events().await;
    // Seeding twice must not duplicate the catalogue.
    engines.events.seed_events().await;
    let catalogue_len = engines.events.event_history().await.len();

    let due = engines.events.pending_events(3).await;
    assert!(!due.is_empty());
    let first = &due[0];
    assert!(first.trigger_hour <= 3);

    let payload = engines.events.trigger_event(first.id()).await.unwrap();
    assert!(payload.triggered);
    // The same event can never fire twice.
    assert!(engines.events.trigger_event(first.id()).await.is_err());
    // The pending set shrinks, the history does not.
    assert!(engines.events.pending_events(3).await.len() < due.len() + 1);
    assert_eq!(engines.events.event_history().await.len(), catalogue_len);
}

#[tokio::test]
async fn custom_events_join_the_schedule() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    let event = engines
        .events
        .create_custom_event("surprise audit", 2, Some(-0.04), None)
        .await
        .unwrap();
    let due = engines.events.pending_events(2).await;
    assert!(due.iter().any(|e| e.id() == event.id()));
}

#[tokio::test]
async fn elimination_picks_the_poorest_and_feeds_the_top_three() {
    let engines = setup_default(&[
        ("vega", 900),
        ("rigel", 700),
        ("altair", 500),
        ("deneb", 300),
        ("sirius", 100),
    ])
    .await;

    // Hour 5 is not a checkpoint.
    assert!(engines.events.run_elimination(5).await.unwrap().is_none());

    let elimination = engines.events.run_elimination(6).await.unwrap().unwrap();
    assert_eq!(elimination.actor_id, "sirius");
    assert_eq!(elimination.final_balance, 100);

    // 100 split across the top three: 34 to the leader, 33 to the rest.
    let total: i64 = elimination.redistribution.iter().map(|(_, a)| a).sum();
    assert_eq!(total, 100);
    assert_eq!(balance_of(&engines, "vega").await, 934);
    assert_eq!(balance_of(&engines, "rigel").await, 733);
    assert_eq!(balance_of(&engines, "altair").await, 533);
    assert_eq!(balance_of(&engines, "deneb").await, 300);

    let world = engines.store.read().await;
    let victim = world.actor("sirius").unwrap();
    assert!(!victim.is_active());
    assert_eq!(victim.balance(), 0);
    assert_eq!(victim.eliminated_at_hour, Some(6));
    assert_eq!(world.game_state.actors_remaining, 4);
    drop(world);
    assert_conserved(&engines).await;

    // Re-running the same checkpoint is a no-op.
    assert!(engines.events.run_elimination(6).await.unwrap().is_none());
    assert_eq!(balance_of(&engines, "vega").await, 934);
}

#[tokio::test]
async fn elimination_ties_break_on_reputation_then_id() {
    let engines = setup_default(&[("vega", 100), ("rigel", 100), ("altair", 500)]).await;
    engines.reputation.modify("vega", 10, "liked").await.unwrap();

    // Equal balances: rigel has the lower reputation and goes first.
    let elimination = engines.events.run_elimination(6).await.unwrap().unwrap();
    assert_eq!(elimination.actor_id, "rigel");
}

#[tokio::test]
async fn eliminated_actor_is_skipped_by_later_checkpoints() {
    let engines = setup_default(&[("vega", 900), ("rigel", 100), ("altair", 400)]).await;
    engines.events.run_elimination(6).await.unwrap().unwrap();

    let second = engines.events.run_elimination(12).await.unwrap().unwrap();
    assert_eq!(second.actor_id, "altair");
    let world = engines.store.read().await;
    assert_eq!(world.game_state.actors_remaining, 1);
}

#[tokio::test]
async fn tribunal_votes_are_one_per_actor_per_window() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 1_000)]).await;

    assert!(engines
        .events
        .cast_tribunal_vote("vega", "vega", 12, None)
        .await
        .is_err());
    engines
        .events
        .cast_tribunal_vote("vega", "rigel", 12, Some("hoarding"))
        .await
        .unwrap();
    assert!(engines
        .events
        .cast_tribunal_vote("vega", "altair", 12, None)
        .await
        .is_err());
    // A different window is a fresh ballot.
    assert!(engines
        .events
        .cast_tribunal_vote("vega", "rigel", 18, None)
        .await
        .is_ok());
}

#[tokio::test]
async fn tribunal_resolution_halves_the_target_and_pays_voters() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 1_001)]).await;
    engines
        .events
        .cast_tribunal_vote("vega", "altair", 12, None)
        .await
        .unwrap();
    engines
        .events
        .cast_tribunal_vote("rigel", "altair", 12, None)
        .await
        .unwrap();

    let outcome = engines.events.resolve_tribunal(12).await.unwrap().unwrap();
    assert_eq!(outcome.target_id, "altair");
    assert_eq!(outcome.votes, 2);
    assert_eq!(outcome.penalty, 500);

    assert_eq!(balance_of(&engines, "altair").await, 501);
    assert_eq!(reputation_of(&engines, "altair").await, 0);
    let paid: i64 = outcome.redistribution.iter().map(|(_, a)| a).sum();
    assert_eq!(paid, 500);
    assert_eq!(balance_of(&engines, "vega").await, 1_250);
    assert_eq!(balance_of(&engines, "rigel").await, 1_250);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn tribunal_with_no_votes_resolves_to_nothing() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    assert!(engines.events.resolve_tribunal(12).await.unwrap().is_none());
}

#[tokio::test]
async fn fee_rate_changes_apply_to_new_trades() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    engines.events.set_fee_rate(8).await.unwrap();
    let trade = engines
        .trading
        .create_trade_offer("vega", "rigel", 100, 1.0)
        .await
        .unwrap();
    assert_eq!(trade.fee, 8);
    assert!(engines.events.set_fee_rate(-1).await.is_err());
}

#[tokio::test]
async fn snapshots_rank_actors_and_carry_a_digest() {
    let engines = setup_default(&[("vega", 500), ("rigel", 900)]).await;
    let snapshot = engines.events.take_snapshot(1).await;
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[0].actor_id, "rigel");
    assert_eq!(snapshot.entries[0].rank, 1);
    assert_eq!(snapshot.digest.len(), 64);

    let world = engines.store.read().await;
    assert_eq!(world.snapshots.len(), 1);
}
