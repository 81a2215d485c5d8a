//! Line-clear engine - detection and per-kind resolution of full lines
//!
//! Detection and commit are separate steps: the session detects full lines
//! right after a placement, locks the board for the resolve window, then
//! calls [`resolve`] to mutate cells. Resolution decisions are taken against
//! the board as it was when the pass started, so the order in which affected
//! coordinates are visited never changes the outcome.

use rand::Rng;

use crate::board::{Board, Lines};
use crate::types::{CellKind, MultiplierKind, COLS, CRYPTO_MAX_COINS, ROWS};

/// Full rows and columns found after a placement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClearLines {
    pub rows: Lines,
    pub cols: Lines,
}

impl ClearLines {
    /// Line count for scoring: an intersection cell counts for both its lines
    pub fn count(&self) -> u32 {
        (self.rows.len() + self.cols.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }

    /// True when (x, y) lies in one of the lines
    pub fn covers(&self, x: u8, y: u8) -> bool {
        self.rows.contains(&y) || self.cols.contains(&x)
    }

    /// De-duplicated coordinates of every affected slot, row-major
    pub fn affected(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..ROWS).flat_map(move |y| {
            (0..COLS)
                .filter(move |&x| self.covers(x, y))
                .map(move |x| (x, y))
        })
    }
}

/// Find full rows and columns; `None` when nothing is complete
pub fn detect(board: &Board) -> Option<ClearLines> {
    let lines = ClearLines {
        rows: board.full_rows(),
        cols: board.full_cols(),
    };
    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

/// What a clear pass did, besides emptying slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Slots emptied
    pub cleared: u32,
    /// Metal/ice cells that lost one durability and survived
    pub damaged: u32,
    pub gold: u32,
    pub gems: u32,
    pub bombs_defused: u32,
    /// Coins from inflation timers and crypto payouts
    pub bonus_coins: u32,
    /// Chain cells unlinked anywhere on the board
    pub chains_unlinked: u32,
    /// Strongest multiplier cleared, if any
    pub frenzy: Option<MultiplierKind>,
}

enum Outcome {
    Clear,
    Damage,
    Unlink,
}

/// Resolve every affected slot according to its kind
///
/// | kind | effect |
/// |------|--------|
/// | metal / ice, durability > 1 | durability - 1, survives |
/// | chain, linked | survives; every chain on the board is unlinked |
/// | gold | cleared, counted for the coin bonus |
/// | gem | cleared, counted for gem goals |
/// | multiplier | cleared, arms a frenzy |
/// | inflation | cleared, pays its timer |
/// | crypto | cleared, pays 0..=`CRYPTO_MAX_COINS` |
/// | bomb | cleared, defused |
/// | anything else | cleared |
pub fn resolve<R: Rng + ?Sized>(board: &mut Board, lines: &ClearLines, rng: &mut R) -> Resolution {
    let mut res = Resolution::default();
    let mut chain_hit = false;

    for (x, y) in lines.affected() {
        let (x, y) = (x as i8, y as i8);
        let Some(cell) = board.cell_mut(x, y) else {
            continue;
        };

        let outcome = match &mut cell.kind {
            CellKind::Metal { durability } | CellKind::Ice { durability } if *durability > 1 => {
                *durability -= 1;
                Outcome::Damage
            }
            CellKind::Chain { linked: true } => Outcome::Unlink,
            CellKind::Gold => {
                res.gold += 1;
                Outcome::Clear
            }
            CellKind::Gem => {
                res.gems += 1;
                Outcome::Clear
            }
            CellKind::Multiplier(kind) => {
                res.frenzy = Some(match res.frenzy {
                    Some(current) if current.factor() >= kind.factor() => current,
                    _ => *kind,
                });
                Outcome::Clear
            }
            CellKind::Inflation { timer } => {
                res.bonus_coins += *timer as u32;
                Outcome::Clear
            }
            CellKind::Crypto => {
                res.bonus_coins += rng.gen_range(0..=CRYPTO_MAX_COINS);
                Outcome::Clear
            }
            CellKind::Bomb { .. } => {
                res.bombs_defused += 1;
                Outcome::Clear
            }
            CellKind::Normal
            | CellKind::Metal { .. }
            | CellKind::Ice { .. }
            | CellKind::Chain { linked: false }
            | CellKind::Liquid
            | CellKind::Vine
            | CellKind::Cracked => Outcome::Clear,
        };

        match outcome {
            Outcome::Clear => {
                board.set(x, y, None);
                res.cleared += 1;
            }
            Outcome::Damage => res.damaged += 1,
            Outcome::Unlink => chain_hit = true,
        }
    }

    if chain_hit {
        for (_, _, cell) in board.filled_mut() {
            if let CellKind::Chain { linked } = &mut cell.kind {
                if *linked {
                    *linked = false;
                    res.chains_unlinked += 1;
                }
            }
        }
    }

    res
}
