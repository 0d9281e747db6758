//! Bounded log of finished battles

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::combat::encounter::EncounterKey;
use crate::combat::result::BattleResult;
use crate::core::types::BattleId;

/// Which resolver settled a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionMode {
    Strategic,
    Tactical,
}

/// A finished battle as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub id: BattleId,
    /// Game turn the battle was resolved in
    pub turn: u64,
    pub key: EncounterKey,
    pub mode: ResolutionMode,
    pub result: BattleResult,
}

/// Most recent battle reports, oldest evicted first
#[derive(Debug, Clone)]
pub struct BattleHistory {
    reports: VecDeque<BattleReport>,
    capacity: usize,
}

impl BattleHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            reports: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, report: BattleReport) {
        while self.reports.len() >= self.capacity {
            if let Some(evicted) = self.reports.pop_front() {
                tracing::debug!("Evicting battle {:?} from history", evicted.id);
            }
        }
        self.reports.push_back(report);
    }

    /// Up to `count` newest reports, oldest first
    pub fn recent(&self, count: usize) -> Vec<&BattleReport> {
        let skip = self.reports.len().saturating_sub(count);
        self.reports.iter().skip(skip).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleReport> {
        self.reports.iter()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, Vec2};

    fn report(id: u64) -> BattleReport {
        BattleReport {
            id: BattleId(id),
            turn: 1,
            key: EncounterKey {
                cell: (0, 0),
                initiator: FactionId(0),
                responder: FactionId(1),
            },
            mode: ResolutionMode::Strategic,
            result: BattleResult::no_battle((FactionId(0), FactionId(1)), &[], &[], Vec2::default()),
        }
    }

    #[test]
    fn test_oldest_evicted_first() {
        let mut history = BattleHistory::new(3);
        for id in 0..5 {
            history.push(report(id));
        }
        assert_eq!(history.len(), 3);
        let ids: Vec<u64> = history.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_recent() {
        let mut history = BattleHistory::new(10);
        for id in 0..4 {
            history.push(report(id));
        }
        let ids: Vec<u64> = history.recent(2).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(history.recent(50).len(), 4);
    }

    #[test]
    fn test_clear() {
        let mut history = BattleHistory::new(2);
        history.push(report(0));
        history.clear();
        assert!(history.is_empty());
    }
}
