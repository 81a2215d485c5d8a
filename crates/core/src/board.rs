//! Board module - manages the game grid
//!
//! The board is an 8x8 grid where each slot is empty or holds a [`Cell`].
//! Uses a flat array so the whole board is a plain value (undo snapshots copy it).
//! Coordinates: (x, y) where x ranges 0..7 (left to right), y ranges 0..7 (top to bottom)

use arrayvec::ArrayVec;

use crate::pieces::{CellOffset, Piece};
use crate::types::{Cell, Slot, COLS, ROWS};

/// Total number of slots on the board
pub const BOARD_SIZE: usize = (COLS as usize) * (ROWS as usize);

/// Indices of full rows or columns
pub type Lines = ArrayVec<u8, 8>;

/// Board coordinate of a piece cell placed with its origin at (x, y).
/// `None` when the sum leaves the `i8` range, which is off the board anyway.
#[inline]
pub fn offset_cell(x: i8, y: i8, (dx, dy): CellOffset) -> Option<(i8, i8)> {
    let dx = i8::try_from(dx).ok()?;
    let dy = i8::try_from(dy).ok()?;
    Some((x.checked_add(dx)?, y.checked_add(dy)?))
}

/// The game board - 8 columns x 8 rows using flat array storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of slots, row-major order (y * COLS + x)
    cells: [Slot; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= COLS as i8 || y < 0 || y >= ROWS as i8 {
            return None;
        }
        Some((y as usize) * (COLS as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        COLS
    }

    pub fn height(&self) -> u8 {
        ROWS
    }

    /// Get slot at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Slot> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Mutable access to a filled cell
    pub fn cell_mut(&mut self, x: i8, y: i8) -> Option<&mut Cell> {
        Self::index(x, y).and_then(|idx| self.cells[idx].as_mut())
    }

    /// Set slot at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, slot: Slot) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = slot;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        Self::index(x, y).is_none()
    }

    /// True iff every filled cell of `piece` lands in bounds on an empty slot
    pub fn can_place(&self, piece: &Piece, x: i8, y: i8) -> bool {
        piece
            .cells()
            .all(|c| offset_cell(x, y, c).is_some_and(|(px, py)| self.is_valid(px, py)))
    }

    /// True iff `piece` fits at some origin
    pub fn fits_anywhere(&self, piece: &Piece) -> bool {
        (0..ROWS as i8).any(|y| (0..COLS as i8).any(|x| self.can_place(piece, x, y)))
    }

    /// Write one cell per filled piece cell, carrying the piece kind over.
    ///
    /// The caller validates with [`Board::can_place`] first. A violated
    /// precondition asserts in debug builds; release builds skip the
    /// offending cells instead of overwriting. Returns the cells written.
    pub fn place(&mut self, piece: &Piece, x: i8, y: i8) -> u8 {
        debug_assert!(
            self.can_place(piece, x, y),
            "place() without a valid can_place() at ({}, {})",
            x,
            y
        );

        let cell = Cell::new(piece.color, piece.kind.cell_kind());
        let mut written = 0;
        for c in piece.cells() {
            let Some((px, py)) = offset_cell(x, y, c).filter(|&(px, py)| self.is_valid(px, py)) else {
                log::warn!("skipping invalid placement cell {:?} at origin ({}, {})", c, x, y);
                continue;
            };
            self.set(px, py, Some(cell));
            written += 1;
        }
        written
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: u8) -> bool {
        if y >= ROWS {
            return false;
        }
        let start = y as usize * COLS as usize;
        self.cells[start..start + COLS as usize]
            .iter()
            .all(|slot| slot.is_some())
    }

    /// Check if a column is completely filled
    pub fn is_col_full(&self, x: u8) -> bool {
        if x >= COLS {
            return false;
        }
        (0..ROWS as i8).all(|y| self.is_occupied(x as i8, y))
    }

    /// Indices of every full row, top to bottom
    pub fn full_rows(&self) -> Lines {
        (0..ROWS).filter(|&y| self.is_row_full(y)).collect()
    }

    /// Indices of every full column, left to right
    pub fn full_cols(&self) -> Lines {
        (0..COLS).filter(|&x| self.is_col_full(x)).collect()
    }

    /// Empty the slots in the square of `radius` around (x, y); returns slots emptied
    pub fn clear_area(&mut self, x: i8, y: i8, radius: i8) -> u8 {
        let mut cleared = 0;
        for cy in y - radius..=y + radius {
            for cx in x - radius..=x + radius {
                if self.is_occupied(cx, cy) {
                    self.set(cx, cy, None);
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Coordinates of every empty slot in row-major order
    pub fn empty_slots(&self) -> ArrayVec<(u8, u8), BOARD_SIZE> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(idx, _)| ((idx % COLS as usize) as u8, (idx / COLS as usize) as u8))
            .collect()
    }

    /// Filled cells with their coordinates
    pub fn filled(&self) -> impl Iterator<Item = (u8, u8, &Cell)> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|cell| ((idx % COLS as usize) as u8, (idx / COLS as usize) as u8, cell))
        })
    }

    /// Mutable filled cells, for board-wide passes (chain unlink, bomb ticks)
    pub fn filled_mut(&mut self) -> impl Iterator<Item = (u8, u8, &mut Cell)> + '_ {
        self.cells.iter_mut().enumerate().filter_map(|(idx, slot)| {
            slot.as_mut()
                .map(|cell| ((idx % COLS as usize) as u8, (idx / COLS as usize) as u8, cell))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// Get a reference to the internal slots array
    pub fn cells(&self) -> &[Slot] {
        &self.cells
    }

    /// Row-major copy as nested rows (persistence and rendering)
    pub fn rows(&self) -> [[Slot; COLS as usize]; ROWS as usize] {
        let mut out = [[None; COLS as usize]; ROWS as usize];
        for (idx, slot) in self.cells.iter().enumerate() {
            out[idx / COLS as usize][idx % COLS as usize] = *slot;
        }
        out
    }

    /// Build from nested rows
    pub fn from_rows(rows: &[[Slot; COLS as usize]; ROWS as usize]) -> Self {
        let mut board = Self::new();
        for (y, row) in rows.iter().enumerate() {
            let start = y * COLS as usize;
            board.cells[start..start + COLS as usize].copy_from_slice(row);
        }
        board
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [None; BOARD_SIZE];
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellKind, Color, PieceKind};

    fn normal() -> Slot {
        Some(Cell::new(Color(0x111111), CellKind::Normal))
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(7, 0), Some(7));
        assert_eq!(Board::index(0, 1), Some(8));
        assert_eq!(Board::index(7, 7), Some(63));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(8, 0), None);
        assert_eq!(Board::index(0, 8), None);
    }

    #[test]
    fn test_can_place_bounds_and_occupancy() {
        let mut board = Board::new();
        let bar = Piece::named("3x1", Color(0x222222));

        assert!(board.can_place(&bar, 0, 0));
        assert!(board.can_place(&bar, 5, 7));
        assert!(!board.can_place(&bar, 6, 0));
        assert!(!board.can_place(&bar, -1, 0));
        assert!(!board.can_place(&bar, 0, 8));

        board.set(2, 0, normal());
        assert!(!board.can_place(&bar, 0, 0));
        assert!(board.can_place(&bar, 3, 0));
    }

    #[test]
    fn test_hollow_shapes_ignore_gaps() {
        let mut board = Board::new();
        board.set(1, 1, normal());
        let donut = Piece::named("Donut", Color(0x333333));
        assert!(board.can_place(&donut, 0, 0));
    }

    #[test]
    fn test_place_translates_kind() {
        let mut board = Board::new();
        let mut piece = Piece::named("2x1", Color(0x444444));
        piece.kind = PieceKind::Metal;

        assert_eq!(board.place(&piece, 3, 4), 2);
        let cell = board.get(3, 4).unwrap().unwrap();
        assert_eq!(cell.kind, CellKind::Metal { durability: 2 });
        assert_eq!(cell.color, Color(0x444444));
        assert!(board.is_occupied(4, 4));
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn test_full_rows_and_cols() {
        let mut board = Board::new();
        for x in 0..8 {
            board.set(x, 2, normal());
        }
        for y in 0..8 {
            board.set(5, y, normal());
        }
        assert_eq!(board.full_rows().as_slice(), &[2]);
        assert_eq!(board.full_cols().as_slice(), &[5]);
        assert!(!board.is_row_full(3));
        assert!(!board.is_col_full(4));
    }

    #[test]
    fn test_clear_area_respects_bounds() {
        let mut board = Board::new();
        for y in 0..8 {
            for x in 0..8 {
                board.set(x, y, normal());
            }
        }
        assert_eq!(board.clear_area(0, 0, 1), 4);
        assert_eq!(board.clear_area(4, 4, 1), 9);
        assert_eq!(board.occupied_count(), 64 - 13);
    }

    #[test]
    fn test_rows_round_trip() {
        let mut board = Board::new();
        board.set(6, 1, normal());
        board.set(0, 7, normal());
        assert_eq!(Board::from_rows(&board.rows()), board);
    }

    #[test]
    fn test_empty_slots() {
        let mut board = Board::new();
        assert_eq!(board.empty_slots().len(), 64);
        board.set(1, 0, normal());
        let empty = board.empty_slots();
        assert_eq!(empty.len(), 63);
        assert_eq!(empty[0], (0, 0));
        assert_eq!(empty[1], (2, 0));
    }
}
