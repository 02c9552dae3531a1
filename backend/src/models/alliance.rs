//! Alliance model
//!
//! A group of actors pooling credits into a shared treasury. Membership
//! carries a contribution tally and a derived share-percent; shares are
//! recomputed on every membership or contribution change so the active
//! shares always sum to 100 (equal split when nobody has contributed).
//!
//! Lifecycle: `Active -> {Dissolved | Betrayed}`. Betrayal is the delayed
//! defection mechanic: an initiated countdown, then an execution that
//! steals most of the treasury.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// Alliance lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllianceStatus {
    Active,
    Dissolved { at_secs: u64 },
    Betrayed { by: String, at_secs: u64 },
}

/// One actor's membership in an alliance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllianceMember {
    pub actor_id: String,

    /// Net amount this member has contributed to the treasury (cents)
    pub contribution: i64,

    /// Derived share of the treasury, recomputed on every change so that
    /// active shares sum to 100.0
    pub share_percent: f64,

    pub active: bool,

    /// Set while a defection countdown is running; cleared on cancel,
    /// ejection, or execution
    pub defection_initiated_secs: Option<u64>,

    pub joined_secs: u64,
    pub left_secs: Option<u64>,
}

impl AllianceMember {
    pub fn new(actor_id: String, joined_secs: u64) -> Self {
        Self {
            actor_id,
            contribution: 0,
            share_percent: 0.0,
            active: true,
            defection_initiated_secs: None,
            joined_secs,
            left_secs: None,
        }
    }
}

/// A pooled-treasury alliance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alliance {
    id: String,
    pub name: String,
    pub founder_id: String,

    /// Pooled treasury (cents)
    pub treasury: i64,

    pub status: AllianceStatus,

    /// Game second the last staking bonus was applied at
    pub last_bonus_secs: Option<u64>,

    pub created_secs: u64,
    pub members: Vec<AllianceMember>,
}

impl Alliance {
    /// Create an alliance with the founder as its first member.
    pub fn new(name: String, founder_id: String, created_secs: u64) -> Self {
        let founder = AllianceMember::new(founder_id.clone(), created_secs);
        let mut alliance = Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            founder_id,
            treasury: 0,
            status: AllianceStatus::Active,
            last_bonus_secs: None,
            created_secs,
            members: vec![founder],
        };
        alliance.recalculate_shares();
        alliance
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AllianceStatus::Active)
    }

    pub fn active_members(&self) -> impl Iterator<Item = &AllianceMember> {
        self.members.iter().filter(|m| m.active)
    }

    /// The active membership row for `actor_id`, if any.
    pub fn member(&self, actor_id: &str) -> Option<&AllianceMember> {
        self.members
            .iter()
            .find(|m| m.active && m.actor_id == actor_id)
    }

    pub fn member_mut(&mut self, actor_id: &str) -> Option<&mut AllianceMember> {
        self.members
            .iter_mut()
            .find(|m| m.active && m.actor_id == actor_id)
    }

    /// Recompute `share_percent` for every active member.
    ///
    /// Each share is contribution / total contribution as a percentage;
    /// when total contributions are zero every active member gets an
    /// equal share. Invariant: active shares sum to 100.0 (+- float
    /// rounding) whenever at least one member is active.
    pub fn recalculate_shares(&mut self) {
        let active: Vec<usize> = self
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.active)
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() {
            return;
        }

        let total: i64 = active.iter().map(|&i| self.members[i].contribution).sum();
        if total > 0 {
            for &i in &active {
                self.members[i].share_percent =
                    self.members[i].contribution as f64 / total as f64 * 100.0;
            }
        } else {
            let equal = 100.0 / active.len() as f64;
            for &i in &active {
                self.members[i].share_percent = equal;
            }
        }
    }

    /// This member's slice of the current treasury (cents, rounded down).
    pub fn share_amount(&self, actor_id: &str) -> i64 {
        match self.member(actor_id) {
            Some(m) => (self.treasury as f64 * m.share_percent / 100.0).floor() as i64,
            None => 0,
        }
    }
}
