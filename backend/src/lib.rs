//! Gauntlet Simulator Core - Rust Engine
//!
//! Closed-economy multiplayer simulation: a fixed pool of actors holds a
//! conserved credit supply and competes through trades, leveraged bets,
//! alliances, and covert-market contracts while background loops perturb
//! the price, fire scripted disruptions, and eliminate the weakest actor
//! on a schedule.
//!
//! # Architecture
//!
//! - **core**: Game clock (wall-clock hours, phases, termination)
//! - **config**: All tunables in one `GameConfig`
//! - **models**: Domain types (Actor, Trade, Alliance, contracts, ...)
//! - **store**: Shared world state behind one transaction boundary
//! - **market / trading / alliance / covert / social / reputation / events**:
//!   The engines that own and mutate shared state
//! - **orchestrator**: The scheduler driving six concurrent loops
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All conserved money values are i64 (cents of a credit)
//! 2. One store transaction per logical engine operation - no torn state
//! 3. All randomness is deterministic (seeded RNG)
//! 4. Reputation changes go through `ReputationEngine::modify` only

// Module declarations
pub mod actions;
pub mod alliance;
pub mod config;
pub mod core;
pub mod covert;
pub mod errors;
pub mod events;
pub mod market;
pub mod models;
pub mod notice;
pub mod orchestrator;
pub mod reputation;
pub mod rng;
pub mod social;
pub mod store;
pub mod trading;

// Re-exports for convenience
pub use actions::{ActionOutcome, ActionRequest, DecisionPolicy, HeuristicPolicy};
pub use alliance::AllianceEngine;
pub use config::GameConfig;
pub use core::clock::{GameClock, GamePhase};
pub use covert::CovertMarketEngine;
pub use errors::EngineError;
pub use events::EventsEngine;
pub use market::{MarketEngine, OrderBook};
pub use models::{
    actor::{Actor, ActorError},
    alliance::{Alliance, AllianceMember, AllianceStatus},
    contract::{BlackmailContract, BlackmailStatus, Bounty, ContractStatus, HitContract},
    event::{Elimination, EventKind, RankSnapshot, SystemEvent, TribunalVote},
    leverage::{LeverageDirection, LeveragePosition, LeverageStatus},
    social::{Post, PostKind, Whisper},
    state::{GameState, World},
    trade::{Trade, TradeStatus},
};
pub use notice::Notice;
pub use orchestrator::Scheduler;
pub use reputation::ReputationEngine;
pub use rng::RngManager;
pub use social::SocialEngine;
pub use store::GameStore;
pub use trading::TradingEngine;
