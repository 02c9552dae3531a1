//! Tests for alliances: shares, treasury, staking, betrayal, ejection
//!
//! CRITICAL: All money values are i64 (cents)

mod common;

use common::{advance_secs, assert_conserved, balance_of, reputation_of, setup_default};
use gauntlet_sim_core_rs::AllianceStatus;

async fn shares_of(engines: &gauntlet_sim_core_rs::actions::EngineSet, alliance_id: &str) -> Vec<(String, f64)> {
    let world = engines.store.read().await;
    world
        .alliances
        .get(alliance_id)
        .unwrap()
        .active_members()
        .map(|m| (m.actor_id.clone(), m.share_percent))
        .collect()
}

fn share_sum(shares: &[(String, f64)]) -> f64 {
    shares.iter().map(|(_, s)| s).sum()
}

#[tokio::test]
async fn new_alliance_gives_the_founder_full_share() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let shares = shares_of(&engines, alliance.id()).await;
    assert_eq!(shares.len(), 1);
    assert!((share_sum(&shares) - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn shares_track_contributions_and_always_sum_to_100() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    engines.alliance.join(&id, "rigel").await.unwrap();
    engines.alliance.join(&id, "altair").await.unwrap();

    // No contributions yet: equal split.
    let shares = shares_of(&engines, &id).await;
    assert!((share_sum(&shares) - 100.0).abs() < 1e-6);
    assert!(shares.iter().all(|(_, s)| (*s - 100.0 / 3.0).abs() < 1e-6));

    // Contributions re-weight the shares (fee of 2 skimmed from each).
    engines.alliance.contribute(&id, "vega", 302).await.unwrap();
    engines.alliance.contribute(&id, "rigel", 102).await.unwrap();
    let shares = shares_of(&engines, &id).await;
    assert!((share_sum(&shares) - 100.0).abs() < 1e-6);
    let vega_share = shares.iter().find(|(a, _)| a == "vega").unwrap().1;
    assert!((vega_share - 75.0).abs() < 1e-6);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn contribution_must_exceed_the_fee_and_the_balance() {
    let engines = setup_default(&[("vega", 100)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    assert!(engines.alliance.contribute(&id, "vega", 2).await.is_err());
    assert!(engines.alliance.contribute(&id, "vega", 101).await.is_err());
    assert!(engines.alliance.contribute(&id, "vega", 100).await.is_ok());
}

#[tokio::test]
async fn leaving_pays_the_share_and_recomputes_the_rest() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    engines.alliance.join(&id, "rigel").await.unwrap();
    engines.alliance.contribute(&id, "vega", 302).await.unwrap();
    engines.alliance.contribute(&id, "rigel", 102).await.unwrap();

    // vega holds 75% of a 400 treasury.
    let payout = engines.alliance.leave(&id, "vega").await.unwrap();
    assert_eq!(payout, 300);
    assert_eq!(balance_of(&engines, "vega").await, 1_000 - 302 + 300);

    let shares = shares_of(&engines, &id).await;
    assert_eq!(shares.len(), 1);
    assert!((share_sum(&shares) - 100.0).abs() < 1e-6);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn staking_bonus_respects_cooldown_and_grows_the_treasury() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();

    // Empty treasury: nothing to stake.
    assert!(engines.alliance.apply_staking_bonus(&id).await.is_err());

    engines.alliance.contribute(&id, "vega", 402).await.unwrap();
    // Created just now: cooldown not elapsed.
    assert!(engines.alliance.apply_staking_bonus(&id).await.is_err());

    advance_secs(&engines, 6 * 3_600).await;
    let bonus = engines.alliance.apply_staking_bonus(&id).await.unwrap();
    assert_eq!(bonus, 20); // 5% of 400

    // Immediately again: on cooldown.
    assert!(engines.alliance.apply_staking_bonus(&id).await.is_err());
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn defection_countdown_blocks_early_execution() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    engines.alliance.join(&id, "rigel").await.unwrap();

    engines.alliance.initiate_defection(&id, "rigel").await.unwrap();
    // Double initiation is a duplicate.
    assert!(engines.alliance.initiate_defection(&id, "rigel").await.is_err());
    // Too early.
    assert!(engines.alliance.execute_defection(&id, "rigel").await.is_err());
    // Leaving while pending is blocked.
    assert!(engines.alliance.leave(&id, "rigel").await.is_err());

    engines.alliance.cancel_defection(&id, "rigel").await.unwrap();
    assert!(engines.alliance.cancel_defection(&id, "rigel").await.is_err());
}

#[tokio::test]
async fn executed_defection_splits_eighty_twenty() {
    // Treasury 100.00 with shares 60/40; the 60% holder defects ->
    // defector +80.00, the other member +20.00.
    let engines = setup_default(&[("vega", 10_000), ("rigel", 10_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    engines.alliance.join(&id, "rigel").await.unwrap();
    engines.alliance.contribute(&id, "vega", 6_002).await.unwrap();
    engines.alliance.contribute(&id, "rigel", 4_002).await.unwrap();

    engines.alliance.initiate_defection(&id, "vega").await.unwrap();
    advance_secs(&engines, 2 * 3_600).await;

    let vega_before = balance_of(&engines, "vega").await;
    let rigel_before = balance_of(&engines, "rigel").await;
    let result = engines.alliance.execute_defection(&id, "vega").await.unwrap();

    assert_eq!(result.stolen, 8_000);
    assert_eq!(result.remainder, 2_000);
    let distributed: i64 = result.distributions.iter().map(|(_, a)| a).sum();
    assert_eq!(distributed, result.remainder);
    assert_eq!(balance_of(&engines, "vega").await, vega_before + 8_000);
    assert_eq!(balance_of(&engines, "rigel").await, rigel_before + 2_000);

    // Betrayer pays in reputation; the alliance is terminal.
    assert_eq!(reputation_of(&engines, "vega").await, 25);
    let world = engines.store.read().await;
    let alliance = world.alliances.get(&id).unwrap();
    assert!(matches!(alliance.status, AllianceStatus::Betrayed { .. }));
    assert_eq!(alliance.treasury, 0);
    assert!(alliance.active_members().next().is_none());
    drop(world);
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn defection_sweep_fires_matured_countdowns_once() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    engines.alliance.join(&id, "rigel").await.unwrap();
    engines.alliance.contribute(&id, "vega", 502).await.unwrap();
    engines.alliance.initiate_defection(&id, "vega").await.unwrap();

    // Not matured yet: sweep does nothing.
    assert!(engines.alliance.check_pending_defections().await.is_empty());

    advance_secs(&engines, 2 * 3_600).await;
    let executed = engines.alliance.check_pending_defections().await;
    assert_eq!(executed.len(), 1);
    // Re-running the sweep never double-executes.
    assert!(engines.alliance.check_pending_defections().await.is_empty());
}

#[tokio::test]
async fn emergency_eject_needs_a_majority_and_refunds_only_contribution() {
    let engines = setup_default(&[
        ("vega", 1_000),
        ("rigel", 1_000),
        ("altair", 1_000),
        ("deneb", 1_000),
    ])
    .await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    for member in ["rigel", "altair", "deneb"] {
        engines.alliance.join(&id, member).await.unwrap();
    }
    engines.alliance.contribute(&id, "rigel", 202).await.unwrap();
    engines.alliance.initiate_defection(&id, "rigel").await.unwrap();

    // One of three eligible voters is not a majority.
    assert!(engines
        .alliance
        .emergency_eject(&id, "rigel", &["vega".to_string()])
        .await
        .is_err());
    // The target's own vote does not count.
    assert!(engines
        .alliance
        .emergency_eject(&id, "rigel", &["vega".to_string(), "rigel".to_string()])
        .await
        .is_err());

    let refund = engines
        .alliance
        .emergency_eject(
            &id,
            "rigel",
            &["vega".to_string(), "altair".to_string()],
        )
        .await
        .unwrap();
    // Raw contribution back, not a computed share.
    assert_eq!(refund, 200);
    assert_eq!(balance_of(&engines, "rigel").await, 1_000 - 202 + 200);

    // The ejected member's defection can no longer execute.
    advance_secs(&engines, 2 * 3_600).await;
    assert!(engines.alliance.execute_defection(&id, "rigel").await.is_err());
    assert_conserved(&engines).await;
}

#[tokio::test]
async fn dissolve_distributes_by_share_and_empties_the_treasury() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let alliance = engines.alliance.create_alliance("vega", "north-star").await.unwrap();
    let id = alliance.id().to_string();
    engines.alliance.join(&id, "rigel").await.unwrap();
    engines.alliance.contribute(&id, "vega", 302).await.unwrap();
    engines.alliance.contribute(&id, "rigel", 102).await.unwrap();

    // Only the founder may dissolve.
    assert!(engines.alliance.dissolve(&id, "rigel").await.is_err());

    let distributions = engines.alliance.dissolve(&id, "vega").await.unwrap();
    let total: i64 = distributions.iter().map(|(_, a)| a).sum();
    assert_eq!(total, 400);

    let world = engines.store.read().await;
    let alliance = world.alliances.get(&id).unwrap();
    assert!(matches!(alliance.status, AllianceStatus::Dissolved { .. }));
    assert_eq!(alliance.treasury, 0);
    drop(world);
    assert_conserved(&engines).await;
}
