//! Domain models for the game simulation

pub mod actor;
pub mod alliance;
pub mod contract;
pub mod event;
pub mod leverage;
pub mod social;
pub mod state;
pub mod trade;

// Re-exports
pub use actor::{reputation_badge, Actor, ActorError, ReputationChange};
pub use alliance::{Alliance, AllianceMember, AllianceStatus};
pub use contract::{
    BlackmailContract, BlackmailStatus, Bounty, ContractStatus, HitCondition, HitContract,
    IntelPurchase, ManipulationKind, ManipulationPurchase,
};
pub use event::{
    Elimination, EventKind, RankSnapshot, SnapshotEntry, SystemEvent, TribunalVote,
};
pub use leverage::{LeverageDirection, LeveragePosition, LeverageStatus};
pub use social::{Comment, Post, PostKind, Whisper};
pub use state::{GameState, MarketState, PriceRecord, World};
pub use trade::{Trade, TradeStatus};
