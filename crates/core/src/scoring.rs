//! Scoring module - clear points, coin income, levels and ranks
//!
//! Notes:
//! - A cell at a row/column intersection is resolved once but both of its
//!   lines count towards `lines`.
//! - Clear points use the level in effect *before* the clear's own level-up.
//! - Global multipliers (speed, policy, market, frenzy) are applied later by
//!   the session when the points are added.

use crate::types::{
    Inventory, MultiplierKind, FRENZY_PLACEMENTS, LINES_PER_LEVEL, LINE_BASE_POINTS,
    PLACEMENT_POINTS_PER_CELL,
};

/// Combo multiplier: `lines^1.3` for multi-line clears, boosted 10% per combo upgrade
pub fn combo_multiplier(lines: u32, combo_upgrade: u8) -> f64 {
    let base = if lines > 1 {
        (lines as f64).powf(1.3)
    } else {
        1.0
    };
    base * (1.0 + combo_upgrade as f64 * 0.1)
}

/// Streak multiplier: `1 + streak * 0.3` once the streak exceeds one
pub fn streak_multiplier(streak: u32) -> f64 {
    if streak > 1 {
        1.0 + streak as f64 * 0.3
    } else {
        1.0
    }
}

/// Points for clearing `lines` lines at once
///
/// `floor(lines * 100 * combo * streak * level)`
pub fn line_clear_points(lines: u32, level: u32, streak: u32, combo_upgrade: u8) -> u32 {
    if lines == 0 {
        return 0;
    }
    let raw = lines as f64
        * LINE_BASE_POINTS as f64
        * combo_multiplier(lines, combo_upgrade)
        * streak_multiplier(streak)
        * level as f64;
    raw.floor() as u32
}

/// Coins earned by a clear, before per-cell bonuses and policy factors
pub fn coin_reward(lines: u32, streak: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    let mut coins = lines * 5;
    if lines > 1 {
        coins += lines * 10;
    }
    if lines >= 3 {
        coins += lines * 15;
    }
    if streak > 1 {
        coins += streak * 3;
    }
    if streak >= 5 {
        coins += 50;
    }
    coins
}

/// Points for writing `cells` cells at `level`
pub fn placement_points(cells: u32, level: u32) -> u32 {
    cells * PLACEMENT_POINTS_PER_CELL * level
}

/// Level management
/// Level increases every 10 lines cleared, starting at 1
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Rewards granted on reaching a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelReward {
    pub hammer: u32,
    pub reroll: u32,
    pub bomb: u32,
    pub undo: u32,
    pub coins: u32,
}

impl LevelReward {
    pub fn apply(&self, inventory: &mut Inventory) -> u32 {
        inventory.hammer += self.hammer;
        inventory.reroll += self.reroll;
        inventory.bomb += self.bomb;
        inventory.undo += self.undo;
        self.coins
    }
}

/// Coins granted alongside every fifth level
pub const MILESTONE_COINS: u32 = 100;

/// Item cadence: every level a hammer, every 2nd a reroll, every 3rd a bomb,
/// every 5th an undo plus coins
pub fn level_reward(level: u32) -> LevelReward {
    let mut reward = LevelReward {
        hammer: 1,
        ..LevelReward::default()
    };
    if level % 2 == 0 {
        reward.reroll = 1;
    }
    if level % 3 == 0 {
        reward.bomb = 1;
    }
    if level % 5 == 0 {
        reward.undo = 1;
        reward.coins = MILESTONE_COINS;
    }
    reward
}

/// Score boost armed by clearing a multiplier cell
///
/// Covers the next `FRENZY_PLACEMENTS` placements, including any clear they
/// commit. A stronger multiplier replaces a running frenzy; a weaker one
/// only refreshes its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frenzy {
    pub kind: MultiplierKind,
    pub placements_left: u32,
}

impl Frenzy {
    pub fn new(kind: MultiplierKind) -> Self {
        Self {
            kind,
            placements_left: FRENZY_PLACEMENTS,
        }
    }

    pub fn factor(&self) -> f64 {
        self.kind.factor()
    }

    /// Merge a newly armed multiplier into the running frenzy
    pub fn rearm(current: Option<Frenzy>, kind: MultiplierKind) -> Frenzy {
        match current {
            Some(f) if f.factor() > kind.factor() => Frenzy::new(f.kind),
            _ => Frenzy::new(kind),
        }
    }

    /// Account for a new placement; `None` once the boost is spent
    pub fn step(self) -> Option<Frenzy> {
        if self.placements_left == 0 {
            None
        } else {
            Some(Frenzy {
                placements_left: self.placements_left - 1,
                ..self
            })
        }
    }
}

/// League rank by score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum League {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl League {
    /// Minimum score of each league, lowest first
    pub const THRESHOLDS: [(League, u32); 5] = [
        (League::Bronze, 0),
        (League::Silver, 1_000),
        (League::Gold, 5_000),
        (League::Platinum, 15_000),
        (League::Diamond, 40_000),
    ];

    pub fn for_score(score: u32) -> League {
        Self::THRESHOLDS
            .iter()
            .rev()
            .find(|(_, min)| score >= *min)
            .map(|(league, _)| *league)
            .unwrap_or(League::Bronze)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            League::Bronze => "bronze",
            League::Silver => "silver",
            League::Gold => "gold",
            League::Platinum => "platinum",
            League::Diamond => "diamond",
        }
    }
}
