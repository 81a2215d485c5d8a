//! Value snapshots of a session
//!
//! [`UndoSnapshot`] is the single-slot undo record; [`GameSnapshot`] is the
//! read-only view handed to render collaborators. Both are plain copies: the
//! board is a fixed array and queued pieces are stored as descriptors.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::game_state::SessionStats;
use crate::goal::GoalTracker;
use crate::pieces::PieceDescriptor;
use crate::scoring::{Frenzy, League};
use crate::types::{
    GameMode, GameOverReason, Inventory, MarketEvent, Policy, Slot, COLS, QUEUE_CAPACITY, ROWS,
};

pub type QueueDescriptors = ArrayVec<Option<PieceDescriptor>, QUEUE_CAPACITY>;

/// Everything a placement or reroll can change, captured just before it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSnapshot {
    pub board: Board,
    pub score: u32,
    pub queue: QueueDescriptors,
    pub lines: u32,
    pub streak: u32,
    pub level: u32,
    pub bomb_counter: u32,
    pub bailouts_left: u32,
    pub stats: SessionStats,
    pub goal: Option<GoalTracker>,
    pub frenzy: Option<Frenzy>,
}

/// Holds at most one snapshot; saving overwrites, undoing consumes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoManager {
    slot: Option<UndoSnapshot>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, snapshot: UndoSnapshot) {
        self.slot = Some(snapshot);
    }

    pub fn take(&mut self) -> Option<UndoSnapshot> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&UndoSnapshot> {
        self.slot.as_ref()
    }

    pub fn has_snapshot(&self) -> bool {
        self.slot.is_some()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

/// HUD and board view for render collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: [[Slot; COLS as usize]; ROWS as usize],
    pub queue: QueueDescriptors,
    pub mode: GameMode,
    pub policy: Policy,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub lines: u32,
    pub streak: u32,
    pub league: League,
    pub coins: u32,
    pub inventory: Inventory,
    pub goal: Option<GoalTracker>,
    pub frenzy: Option<Frenzy>,
    pub market: Option<MarketEvent>,
    pub bailouts_left: u32,
    pub resolving: bool,
    /// Full rows then full columns being cleared, for the flash effect
    pub clearing_rows: ArrayVec<u8, 8>,
    pub clearing_cols: ArrayVec<u8, 8>,
    pub paused: bool,
    pub game_over: Option<GameOverReason>,
    pub finished: bool,
    pub can_undo: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.finished && !self.paused && !self.resolving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(score: u32) -> UndoSnapshot {
        UndoSnapshot {
            board: Board::new(),
            score,
            queue: QueueDescriptors::new(),
            lines: 0,
            streak: 0,
            level: 1,
            bomb_counter: 8,
            bailouts_left: 0,
            stats: SessionStats::default(),
            goal: None,
            frenzy: None,
        }
    }

    #[test]
    fn test_save_overwrites_previous() {
        let mut undo = UndoManager::new();
        undo.save(snapshot(10));
        undo.save(snapshot(20));
        assert_eq!(undo.peek().map(|s| s.score), Some(20));
    }

    #[test]
    fn test_take_consumes() {
        let mut undo = UndoManager::new();
        assert!(undo.take().is_none());
        undo.save(snapshot(5));
        assert!(undo.has_snapshot());
        assert_eq!(undo.take().map(|s| s.score), Some(5));
        assert!(!undo.has_snapshot());
    }
}
