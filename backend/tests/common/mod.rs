//! Shared test harness: a store plus one of every engine, with helpers
//! to script the game clock.
#![allow(dead_code)]

use std::sync::Arc;

use gauntlet_sim_core_rs::actions::EngineSet;
use gauntlet_sim_core_rs::{
    Actor, AllianceEngine, CovertMarketEngine, EventsEngine, GameConfig, GameStore, MarketEngine,
    ReputationEngine, RngManager, TradingEngine, World,
};
use gauntlet_sim_core_rs::social::SocialEngine;

/// Build an engine set over actors with the given opening balances
/// (cents), with the game clock parked at `hour`.
pub async fn setup(config: GameConfig, balances: &[(&str, i64)], hour: u32) -> EngineSet {
    let actors: Vec<Actor> = balances
        .iter()
        .map(|(id, balance)| Actor::new(id.to_string(), *balance, config.starting_reputation))
        .collect();
    let world = World::new(actors, config.starting_price, config.trade_fee);
    let store = GameStore::new(world);

    let engines = EngineSet {
        store: store.clone(),
        market: Arc::new(MarketEngine::new(
            store.clone(),
            config.clone(),
            RngManager::new(0xA1),
        )),
        trading: Arc::new(TradingEngine::new(store.clone(), config.clone())),
        alliance: Arc::new(AllianceEngine::new(store.clone(), config.clone())),
        covert: Arc::new(CovertMarketEngine::new(
            store.clone(),
            config.clone(),
            RngManager::new(0xA2),
        )),
        social: Arc::new(SocialEngine::new(store.clone(), config.clone())),
        events: Arc::new(EventsEngine::new(store.clone(), config)),
        reputation: Arc::new(ReputationEngine::new(store)),
    };
    set_hour(&engines, hour).await;
    engines
}

/// Default config, default hour zero, standard balances.
pub async fn setup_default(balances: &[(&str, i64)]) -> EngineSet {
    setup(GameConfig::default(), balances, 0).await
}

/// Park the persisted clock at `hour`.
pub async fn set_hour(engines: &EngineSet, hour: u32) {
    let mut world = engines.store.write().await;
    world.game_state.current_hour = hour;
    world.game_state.elapsed_secs = hour as u64 * 3600;
}

/// Advance the persisted clock by `secs` game seconds.
pub async fn advance_secs(engines: &EngineSet, secs: u64) {
    let mut world = engines.store.write().await;
    world.game_state.elapsed_secs += secs;
    world.game_state.current_hour = (world.game_state.elapsed_secs / 3600) as u32;
}

pub async fn balance_of(engines: &EngineSet, actor_id: &str) -> i64 {
    engines
        .store
        .read()
        .await
        .actor(actor_id)
        .expect("actor exists")
        .balance()
}

pub async fn reputation_of(engines: &EngineSet, actor_id: &str) -> i32 {
    engines
        .store
        .read()
        .await
        .actor(actor_id)
        .expect("actor exists")
        .reputation()
}

/// Assert the books balance: the live sum of balances, treasuries,
/// escrows, and stakes must equal the tracked circulation.
pub async fn assert_conserved(engines: &EngineSet) {
    let world = engines.store.read().await;
    assert_eq!(
        world.circulating_total(),
        world.game_state.total_circulation,
        "circulating total diverged from tracked circulation"
    );
}
