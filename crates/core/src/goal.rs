//! Goal tracker - adventure levels, move budgets and level results
//!
//! A placement spends one move; every line it clears buys one back. Progress
//! is recomputed from the session counters after each settled action and the
//! tracker moves to a terminal status at most once.

use crate::types::{
    CellKind, Color, GoalType, BOSS_HIT_PER_LINE, BOSS_HIT_PER_PLACEMENT, ICE_DURABILITY,
};

/// A cell written onto the board when a level starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub x: u8,
    pub y: u8,
    pub kind: CellKind,
}

impl Obstacle {
    pub const fn new(x: u8, y: u8, kind: CellKind) -> Self {
        Self { x, y, kind }
    }

    pub fn color(&self) -> Color {
        match self.kind {
            CellKind::Gem => Color(0x00E5FF),
            CellKind::Ice { .. } => Color(0xA5F2F3),
            CellKind::Vine => Color(0x2E8B57),
            _ => Color::OBSTACLE,
        }
    }
}

/// One entry of the adventure catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdventureLevel {
    pub id: u32,
    pub title: &'static str,
    pub goal: GoalType,
    /// Goal target; boss levels use the boss health instead
    pub target: u32,
    pub moves: u32,
    pub boss_health: u32,
    pub obstacles: &'static [Obstacle],
}

impl AdventureLevel {
    /// Starting difficulty level: one step every three catalog entries
    pub fn starting_level(&self) -> u32 {
        self.id / 3 + 1
    }

    pub fn description(&self) -> String {
        match self.goal {
            GoalType::Lines => format!("Clear {} Lines", self.target),
            GoalType::Score => format!("Score {} Pts", self.target),
            GoalType::Blocks => format!("Place {} Blocks", self.target),
            GoalType::Gems => format!("Collect {} Gems", self.target),
            GoalType::Boss => format!("Defeat the Boss ({} HP)", self.boss_health),
        }
    }
}

const ICE: CellKind = CellKind::Ice {
    durability: ICE_DURABILITY,
};
const CHAIN: CellKind = CellKind::Chain { linked: true };

static GEM_FIELD: [Obstacle; 6] = [
    Obstacle::new(1, 1, CellKind::Gem),
    Obstacle::new(6, 1, CellKind::Gem),
    Obstacle::new(3, 3, ICE),
    Obstacle::new(4, 4, ICE),
    Obstacle::new(1, 6, CellKind::Gem),
    Obstacle::new(6, 6, CellKind::Gem),
];

static CHAIN_VAULT: [Obstacle; 8] = [
    Obstacle::new(0, 0, CHAIN),
    Obstacle::new(7, 0, CHAIN),
    Obstacle::new(0, 7, CHAIN),
    Obstacle::new(7, 7, CHAIN),
    Obstacle::new(2, 3, CellKind::Gem),
    Obstacle::new(5, 4, CellKind::Gem),
    Obstacle::new(3, 5, CellKind::Vine),
    Obstacle::new(4, 2, CellKind::Cracked),
];

static BOSS_LAIR: [Obstacle; 4] = [
    Obstacle::new(3, 3, ICE),
    Obstacle::new(4, 3, ICE),
    Obstacle::new(3, 4, ICE),
    Obstacle::new(4, 4, ICE),
];

const fn level(id: u32, title: &'static str, goal: GoalType, target: u32, moves: u32) -> AdventureLevel {
    AdventureLevel {
        id,
        title,
        goal,
        target,
        moves,
        boss_health: 0,
        obstacles: &[],
    }
}

/// The adventure catalog, in play order
pub static ADVENTURE_LEVELS: [AdventureLevel; 11] = [
    level(0, "Baby Steps", GoalType::Lines, 3, 20),
    level(1, "Point Chaser", GoalType::Score, 500, 20),
    level(2, "Brick Layer", GoalType::Blocks, 20, 25),
    level(3, "Line Dancer", GoalType::Lines, 10, 30),
    level(4, "High Flyer", GoalType::Score, 2000, 30),
    level(5, "Marathon", GoalType::Blocks, 50, 55),
    level(6, "Double Trouble", GoalType::Lines, 20, 40),
    level(7, "Grand Master", GoalType::Score, 5000, 45),
    AdventureLevel {
        obstacles: &GEM_FIELD,
        ..level(8, "Gem Hunter", GoalType::Gems, 4, 30)
    },
    AdventureLevel {
        obstacles: &CHAIN_VAULT,
        ..level(9, "Chain Vault", GoalType::Gems, 2, 30)
    },
    AdventureLevel {
        boss_health: 300,
        obstacles: &BOSS_LAIR,
        ..level(10, "Boss Rush", GoalType::Boss, 1, 25)
    },
];

/// Catalog lookup; out-of-range ids fall back to the first level
pub fn adventure_level(id: u32) -> &'static AdventureLevel {
    ADVENTURE_LEVELS.get(id as usize).unwrap_or_else(|| {
        log::warn!("unknown adventure level {}, using level 0", id);
        &ADVENTURE_LEVELS[0]
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GoalStatus {
    #[default]
    InProgress,
    Cleared,
    Failed,
}

impl GoalStatus {
    pub fn is_terminal(self) -> bool {
        self != GoalStatus::InProgress
    }
}

/// Session counters a goal can be measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalCounters {
    pub lines: u32,
    pub score: u32,
    pub blocks: u32,
    pub gems: u32,
}

/// Live state of the adventure level being played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalTracker {
    pub level_id: u32,
    pub goal: GoalType,
    pub target: u32,
    pub progress: u32,
    pub moves_left: i32,
    /// Remaining boss health; `None` outside boss levels
    pub boss_health: Option<u32>,
    pub status: GoalStatus,
}

impl GoalTracker {
    pub fn new(level: &AdventureLevel) -> Self {
        let boss = level.goal == GoalType::Boss;
        Self {
            level_id: level.id,
            goal: level.goal,
            target: if boss { 1 } else { level.target },
            progress: 0,
            moves_left: level.moves as i32,
            boss_health: boss.then_some(level.boss_health),
            status: GoalStatus::InProgress,
        }
    }

    /// Build a tracker with an explicit goal (scripted scenarios)
    ///
    /// For a boss goal `target` is the boss health.
    pub fn custom(goal: GoalType, target: u32, moves: u32) -> Self {
        let boss = goal == GoalType::Boss;
        Self {
            level_id: 0,
            goal,
            target: if boss { 1 } else { target },
            progress: 0,
            moves_left: moves as i32,
            boss_health: boss.then_some(target),
            status: GoalStatus::InProgress,
        }
    }

    /// A placement spends one move; bosses take a hit
    pub fn on_placement(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.moves_left -= 1;
        if let Some(health) = self.boss_health.as_mut() {
            *health = health.saturating_sub(BOSS_HIT_PER_PLACEMENT);
        }
    }

    /// Lines cleared by the last placement extend the budget; against a
    /// boss they deal damage instead
    pub fn on_lines(&mut self, lines: u32) {
        if self.status.is_terminal() {
            return;
        }
        match self.boss_health.as_mut() {
            Some(health) => *health = health.saturating_sub(lines * BOSS_HIT_PER_LINE),
            None => self.moves_left += lines as i32,
        }
    }

    /// Recompute progress and return the new status when it just turned terminal
    pub fn evaluate(&mut self, counters: &GoalCounters) -> Option<GoalStatus> {
        if self.status.is_terminal() {
            return None;
        }
        self.progress = match self.goal {
            GoalType::Lines => counters.lines,
            GoalType::Score => counters.score,
            GoalType::Blocks => counters.blocks,
            GoalType::Gems => counters.gems,
            GoalType::Boss => u32::from(self.boss_health == Some(0)),
        };
        if self.progress >= self.target {
            self.status = GoalStatus::Cleared;
        } else if self.moves_left <= 0 {
            self.status = GoalStatus::Failed;
        } else {
            return None;
        }
        Some(self.status)
    }
}
