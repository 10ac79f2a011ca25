//! Coin standings
//!
//! Ranks tanks by coins collected. Used for the scramble outcome, the leader
//! change hook and the headless runner's report.

use serde::{Deserialize, Serialize};

use crate::sim::state::TankId;
use crate::sim::tank::Tank;

/// A single ranked entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub tank: TankId,
    pub team: String,
    pub coins: u32,
    pub alive: bool,
}

/// Tanks sorted by coins, descending; ties keep id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Standings {
    pub entries: Vec<StandingEntry>,
}

impl Standings {
    /// Rank every tank, dead ones included
    pub fn from_tanks(tanks: &[Tank]) -> Self {
        let mut entries: Vec<StandingEntry> = tanks
            .iter()
            .map(|t| StandingEntry {
                tank: t.id,
                team: t.team.clone(),
                coins: t.coins,
                alive: t.alive,
            })
            .collect();

        entries.sort_by_key(|e| e.tank);
        // Stable sort keeps ids ascending within equal coin counts
        entries.sort_by(|a, b| b.coins.cmp(&a.coins));

        Self { entries }
    }

    /// 1-indexed rank of a tank
    pub fn rank_of(&self, tank: TankId) -> Option<usize> {
        self.entries.iter().position(|e| e.tank == tank).map(|i| i + 1)
    }

    /// Ids of the first `n` entries
    pub fn leaders(&self, n: usize) -> Vec<TankId> {
        self.entries.iter().take(n).map(|e| e.tank).collect()
    }

    pub fn top(&self) -> Option<&StandingEntry> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
