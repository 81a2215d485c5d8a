//! Queue module - the pending pieces offered to the player
//!
//! Slots are emptied the moment their piece is placed and stay empty until
//! every slot is used; then the whole queue is refilled at once.

use arrayvec::ArrayVec;
use rand::Rng;

use crate::board::Board;
use crate::factory::build_piece;
use crate::pieces::{Piece, PieceDescriptor};
use crate::types::{Upgrades, QUEUE_CAPACITY};

pub type Slots = ArrayVec<Option<Piece>, QUEUE_CAPACITY>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceQueue {
    slots: Slots,
    capacity: usize,
}

impl PieceQueue {
    /// An empty queue with `capacity` slots (clamped to 1..=3)
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: ArrayVec::new(),
            capacity: capacity.clamp(1, QUEUE_CAPACITY),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slots(&self) -> &[Option<Piece>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Piece> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Remove empty slots and append fresh pieces up to capacity
    pub fn fill<R: Rng + ?Sized>(&mut self, rng: &mut R, level: u32, upgrades: &Upgrades) {
        self.slots.retain(|slot| slot.is_some());
        while self.slots.len() < self.capacity {
            self.slots.push(Some(build_piece(rng, level, upgrades)));
        }
    }

    /// Throw every piece away and deal a new hand
    pub fn reroll<R: Rng + ?Sized>(&mut self, rng: &mut R, level: u32, upgrades: &Upgrades) {
        self.slots.clear();
        self.fill(rng, level, upgrades);
    }

    /// Consume the piece in `index`, leaving the slot empty
    pub fn take(&mut self, index: usize) -> Option<Piece> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// True when no slot holds a piece (including a never-filled queue)
    pub fn is_exhausted(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// True when some queued piece fits somewhere on `board`
    pub fn any_fits(&self, board: &Board) -> bool {
        self.slots.iter().flatten().any(|piece| board.fits_anywhere(piece))
    }

    pub fn descriptors(&self) -> ArrayVec<Option<PieceDescriptor>, QUEUE_CAPACITY> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().map(Piece::descriptor))
            .collect()
    }

    /// Rebuild slots from descriptors (extra entries beyond capacity are dropped)
    pub fn restore(&mut self, descriptors: &[Option<PieceDescriptor>]) {
        self.slots = descriptors
            .iter()
            .take(self.capacity)
            .map(|d| d.map(|d| d.rebuild()))
            .collect();
    }

    /// Replace the slots outright (scripted setups)
    pub fn set_slots(&mut self, pieces: &[Option<Piece>]) {
        self.slots = pieces.iter().take(self.capacity).copied().collect();
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(QUEUE_CAPACITY)
    }
}
