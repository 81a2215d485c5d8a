use arrayvec::ArrayVec;
use rand::Rng;

use crate::core::board::{offset_cell, Board, Lines};
use crate::core::{ActionError, GameSession, Piece, PieceQueue, PlaceOutcome};
use crate::types::{COLS, ROWS};

/// Phantom placement shown while a piece is dragged over the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub valid: bool,
    /// Board cells the piece would cover (in-bounds cells only)
    pub cells: ArrayVec<(u8, u8), 16>,
    /// Lines the placement would complete
    pub rows: Lines,
    pub cols: Lines,
}

/// Where `piece` would land with its origin at (x, y)
pub fn preview(board: &Board, piece: &Piece, x: i8, y: i8) -> Preview {
    let cells: ArrayVec<(u8, u8), 16> = piece
        .cells()
        .filter_map(|c| offset_cell(x, y, c))
        .filter(|&(px, py)| !board.is_out_of_bounds(px, py))
        .map(|(px, py)| (px as u8, py as u8))
        .collect();

    if !board.can_place(piece, x, y) {
        return Preview {
            valid: false,
            cells,
            rows: Lines::new(),
            cols: Lines::new(),
        };
    }

    let mut after = *board;
    after.place(piece, x, y);
    Preview {
        valid: true,
        cells,
        rows: after.full_rows(),
        cols: after.full_cols(),
    }
}

/// A suggested placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub slot: usize,
    pub x: i8,
    pub y: i8,
    pub score: i32,
}

const LINE_WEIGHT: i32 = 1000;
const CONTACT_WEIGHT: i32 = 4;
const HOLE_PENALTY: i32 = 40;
const FOLLOW_UP_WEIGHT: i32 = 25;

/// Empty cells whose four neighbours are all blocked
fn holes(board: &Board) -> i32 {
    board
        .empty_slots()
        .iter()
        .filter(|&&(x, y)| {
            let (x, y) = (x as i8, y as i8);
            [(-1, 0), (1, 0), (0, -1), (0, 1)]
                .iter()
                .all(|(dx, dy)| !board.is_valid(x + dx, y + dy))
        })
        .count() as i32
}

/// Heuristic value of placing `piece` at (x, y); `None` when it does not fit
///
/// Rewards completed lines and snug contact with walls and blocks, then
/// penalises isolated holes and counts how many other queued pieces still
/// fit afterwards.
pub fn evaluate(board: &Board, piece: &Piece, x: i8, y: i8, others: &[&Piece]) -> Option<i32> {
    if !board.can_place(piece, x, y) {
        return None;
    }

    let mut contact = 0;
    for (dx, dy) in piece.cells() {
        let (px, py) = (x + dx as i8, y + dy as i8);
        for (nx, ny) in [(px - 1, py), (px + 1, py), (px, py - 1), (px, py + 1)] {
            if board.is_out_of_bounds(nx, ny) || board.is_occupied(nx, ny) {
                contact += 1;
            }
        }
    }

    let mut after = *board;
    after.place(piece, x, y);
    let rows = after.full_rows();
    let cols = after.full_cols();
    let lines = (rows.len() + cols.len()) as i32;
    for &r in rows.iter() {
        for cx in 0..COLS {
            after.set(cx as i8, r as i8, None);
        }
    }
    for &c in cols.iter() {
        for cy in 0..ROWS {
            after.set(c as i8, cy as i8, None);
        }
    }

    let follow_ups = others.iter().filter(|p| after.fits_anywhere(p)).count() as i32;

    Some(
        lines * LINE_WEIGHT + contact * CONTACT_WEIGHT - holes(&after) * HOLE_PENALTY
            + follow_ups * FOLLOW_UP_WEIGHT,
    )
}

/// Best placement over every queued piece and origin
///
/// Ties keep the first candidate in slot, row, column order.
pub fn best_move(board: &Board, queue: &PieceQueue) -> Option<Hint> {
    let mut best: Option<Hint> = None;
    for (slot, piece) in queue
        .slots()
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    {
        let others: ArrayVec<&Piece, 3> = queue
            .slots()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .filter_map(|(_, p)| p.as_ref())
            .collect();

        for y in 0..ROWS as i8 {
            for x in 0..COLS as i8 {
                let Some(score) = evaluate(board, piece, x, y, &others) else {
                    continue;
                };
                if best.map_or(true, |b| score > b.score) {
                    best = Some(Hint { slot, x, y, score });
                }
            }
        }
    }
    best
}

/// Search the session's queue and play the best move
pub fn apply_hint<R: Rng>(session: &mut GameSession<R>) -> Result<Option<PlaceOutcome>, ActionError> {
    if !session.playable() {
        return Err(if session.is_resolving() {
            ActionError::Busy
        } else {
            ActionError::NotPlayable
        });
    }
    match best_move(session.board(), session.queue()) {
        Some(hint) => session.place_piece(hint.slot, hint.x, hint.y).map(Some),
        None => Ok(None),
    }
}
