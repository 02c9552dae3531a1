//! Game configuration
//!
//! Every tunable of the simulation lives in one `GameConfig` struct so the
//! scheduler and engines never reach for ambient globals. Defaults encode
//! the standard 24-hour, 10-actor game.
//!
//! CRITICAL: All money values are i64 (cents of a credit).

use serde::{Deserialize, Serialize};

/// Complete game configuration.
///
/// # Example
/// ```
/// use gauntlet_sim_core_rs::GameConfig;
///
/// let config = GameConfig::default();
/// assert_eq!(config.starting_balance, 1_000); // 10.00 credits
/// assert_eq!(config.elimination_hours, vec![6, 12, 18, 24]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Total game duration in game hours
    pub duration_hours: u32,

    /// Wall-clock seconds per game hour (3600 = real time; smaller values
    /// compress the run for demos and tests)
    pub secs_per_hour: u64,

    /// Number of seats at game start
    pub actor_count: usize,

    /// Opening balance per actor (cents)
    pub starting_balance: i64,

    /// Opening reputation per actor (0-100)
    pub starting_reputation: i32,

    /// Opening market price (display quote, not conserved money)
    pub starting_price: f64,

    // ── Fees (cents) ─────────────────────────────────────────────────
    /// Flat fee charged to the sender of an accepted trade
    pub trade_fee: i64,

    /// Flat fee charged when opening a leverage position
    pub leverage_fee: i64,

    /// Flat fee skimmed from every alliance treasury contribution
    pub alliance_fee: i64,

    /// Cost of sending one whisper (burned, not transferred)
    pub whisper_cost: i64,

    // ── Tipping ──────────────────────────────────────────────────────
    /// Minimum tip (cents)
    pub tip_min: i64,

    /// Maximum tip (cents)
    pub tip_max: i64,

    // ── Leverage ─────────────────────────────────────────────────────
    /// Payout multiple on a winning position
    pub leverage_multiplier: f64,

    /// Maximum concurrently active positions per actor
    pub max_leverage_positions: usize,

    /// Game hour at which leverage betting unlocks
    pub leverage_unlock_hour: u32,

    // ── Alliances ────────────────────────────────────────────────────
    /// Treasury growth rate applied every staking interval
    pub staking_bonus_rate: f64,

    /// Hours between staking bonuses (also the cooldown)
    pub staking_interval_hours: u32,

    /// Fraction of the treasury a defector steals
    pub betrayal_steal_percent: f64,

    /// Hours between initiating and executing a defection
    pub betrayal_countdown_hours: u32,

    // ── Covert market ────────────────────────────────────────────────
    /// Game hour at which the covert market unlocks
    pub covert_unlock_hour: u32,

    /// Game hour at which vote manipulation unlocks
    pub vote_manip_unlock_hour: u32,

    /// Fraction of an escrowed hit reward forfeited on cancellation
    pub hit_cancel_penalty: f64,

    /// Intel tier prices (cents), tiers 1-4
    pub intel_tier_costs: [i64; 4],

    /// Per-unit cost of fake upvotes (cents)
    pub fake_upvote_cost: i64,

    /// Per-unit cost of fake downvotes (cents)
    pub fake_downvote_cost: i64,

    /// Per-unit cost of bot comments (cents)
    pub bot_comment_cost: i64,

    /// Cost of a trending boost (cents)
    pub trending_boost_cost: i64,

    /// Fine charged when a manipulation purchase is detected (cents)
    pub vote_manip_fine: i64,

    /// Probability that a manipulation purchase is detected
    pub vote_manip_detection: f64,

    // ── Reputation deltas ────────────────────────────────────────────
    pub rep_trade_success: i32,
    pub rep_tip: i32,
    pub rep_upvote: i32,
    pub rep_downvote: i32,
    pub rep_bounty_complete: i32,
    pub rep_scam_confirmed: i32,
    pub rep_betrayal: i32,
    pub rep_blackmail_exposed: i32,
    pub rep_hit_target: i32,
    pub rep_vote_manip_caught: i32,

    // ── Social ───────────────────────────────────────────────────────
    /// Maximum organic posts per actor per game hour
    pub max_posts_per_hour: u32,

    // ── Events & elimination ─────────────────────────────────────────
    /// Elimination checkpoint hours
    pub elimination_hours: Vec<u32>,

    /// How many leaders split an eliminated actor's balance
    pub redistribution_top_n: usize,

    // ── Price engine ─────────────────────────────────────────────────
    /// Seconds between price ticks (also the snapshot cadence)
    pub price_tick_interval_secs: u64,

    /// Hard cap on any single price change (fraction, applied to ticks
    /// and shocks alike)
    pub max_price_change: f64,

    /// Bounds of the per-tick random volatility draw
    pub volatility_range: (f64, f64),

    // ── Scheduler cadences (wall-clock seconds) ──────────────────────
    /// Seconds between event-checker passes
    pub event_check_interval_secs: u64,

    /// Seconds between settlement / defection sweeps
    pub sweep_interval_secs: u64,

    /// Per-actor decision cadence bounds (seconds)
    pub decision_interval_secs: (u64, u64),

    /// RNG seed for the whole run
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            duration_hours: 24,
            secs_per_hour: 3600,
            actor_count: 10,
            starting_balance: 1_000,
            starting_reputation: 50,
            starting_price: 932.17,
            trade_fee: 3,
            leverage_fee: 5,
            alliance_fee: 2,
            whisper_cost: 20,
            tip_min: 10,
            tip_max: 50,
            leverage_multiplier: 1.75,
            max_leverage_positions: 3,
            leverage_unlock_hour: 6,
            staking_bonus_rate: 0.05,
            staking_interval_hours: 6,
            betrayal_steal_percent: 0.80,
            betrayal_countdown_hours: 2,
            covert_unlock_hour: 8,
            vote_manip_unlock_hour: 10,
            hit_cancel_penalty: 0.10,
            intel_tier_costs: [100, 150, 250, 400],
            fake_upvote_cost: 30,
            fake_downvote_cost: 40,
            bot_comment_cost: 50,
            trending_boost_cost: 100,
            vote_manip_fine: 150,
            vote_manip_detection: 0.30,
            rep_trade_success: 2,
            rep_tip: 1,
            rep_upvote: 1,
            rep_downvote: -2,
            rep_bounty_complete: 5,
            rep_scam_confirmed: -15,
            rep_betrayal: -25,
            rep_blackmail_exposed: -10,
            rep_hit_target: -20,
            rep_vote_manip_caught: -10,
            max_posts_per_hour: 10,
            elimination_hours: vec![6, 12, 18, 24],
            redistribution_top_n: 3,
            price_tick_interval_secs: 300,
            max_price_change: 0.05,
            volatility_range: (-0.03, 0.03),
            event_check_interval_secs: 60,
            sweep_interval_secs: 60,
            decision_interval_secs: (180, 300),
            rng_seed: 0x5EED,
        }
    }
}

impl GameConfig {
    /// Total credit supply at game start (cents).
    pub fn total_supply(&self) -> i64 {
        self.starting_balance * self.actor_count as i64
    }
}
