//! Gauntlet simulator runner
//!
//! Wires a default configuration to the scheduler and runs a full game
//! until the clock expires or ctrl-c. Environment overrides keep demo
//! runs short:
//!
//! - `GAME_HOURS`: game length in game hours (default 24)
//! - `SECS_PER_HOUR`: wall seconds per game hour (default 3600; set 60
//!   to compress a full day into 24 minutes)
//! - `RNG_SEED`: deterministic seed for the run

use std::sync::Arc;

use gauntlet_sim_core_rs::orchestrator::default_seeds;
use gauntlet_sim_core_rs::{GameConfig, HeuristicPolicy, Scheduler};

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = GameConfig {
        duration_hours: env_u64("GAME_HOURS", 24) as u32,
        secs_per_hour: env_u64("SECS_PER_HOUR", 3600),
        rng_seed: env_u64("RNG_SEED", 0x5EED),
        ..GameConfig::default()
    };

    let policy = Arc::new(HeuristicPolicy::new(config.rng_seed ^ 0x10));
    let mut scheduler = Scheduler::new(config, default_seeds(), policy);

    // Mirror notices to the log; a real deployment would fan these out
    // to connected observers instead.
    let mut notices = scheduler.store().subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            if let Ok(line) = serde_json::to_string(&notice) {
                tracing::info!(target: "notice", "{line}");
            }
        }
    });

    scheduler.start().await;

    let mut done = scheduler.shutdown_watch();
    tokio::select! {
        _ = done.changed() => {
            tracing::info!("run complete");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!(%err, "failed to listen for ctrl-c");
            } else {
                tracing::info!("interrupt received");
            }
        }
    }
    scheduler.stop().await;

    let engines = scheduler.engines();
    println!("final standings:");
    for entry in engines.trading.leaderboard().await {
        println!(
            "  #{:<2} {:<10} balance {:>8}  reputation {:>3} [{}]",
            entry.rank, entry.actor_id, entry.balance, entry.reputation, entry.badge
        );
    }
}
