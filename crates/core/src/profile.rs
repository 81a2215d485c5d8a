//! Player profile - lifetime stats, wallet, shop, achievements and records
//!
//! The profile outlives sessions. A session borrows it mutably while a run is
//! in progress and the save crate persists it separately from the run.

use crate::error::ActionError;
use crate::types::{
    GameMode, Inventory, Item, Upgrade, Upgrades, LEADERBOARD_SIZE, MAX_UPGRADE_LEVEL,
};

/// Lifetime counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlobalStats {
    pub games_played: u32,
    pub lines_cleared: u32,
    pub blocks_placed: u32,
    pub hammers_used: u32,
    pub bombs_used: u32,
}

impl GlobalStats {
    pub fn tools_used(&self) -> u32 {
        self.hammers_used + self.bombs_used
    }
}

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub check: fn(&GlobalStats) -> bool,
}

pub static ACHIEVEMENTS: [Achievement; 5] = [
    Achievement {
        id: "novice",
        name: "Novice Builder",
        desc: "Place 50 Blocks",
        check: |s| s.blocks_placed >= 50,
    },
    Achievement {
        id: "expert",
        name: "Master Architect",
        desc: "Place 1000 Blocks",
        check: |s| s.blocks_placed >= 1000,
    },
    Achievement {
        id: "cleaner",
        name: "Housekeeper",
        desc: "Clear 100 Lines",
        check: |s| s.lines_cleared >= 100,
    },
    Achievement {
        id: "bomber",
        name: "Demolition Expert",
        desc: "Use 20 Power-ups",
        check: |s| s.tools_used() >= 20,
    },
    Achievement {
        id: "veteran",
        name: "Veteran",
        desc: "Play 50 Games",
        check: |s| s.games_played >= 50,
    },
];

/// Look up a catalog achievement by id
pub fn achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub mode: GameMode,
}

/// Top scores, best first, at most `LEADERBOARD_SIZE` entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, re-sorting and truncating
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_SIZE);
        Self { entries }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn lowest(&self) -> Option<u32> {
        self.entries.last().map(|e| e.score)
    }

    /// A positive score qualifies while the board has room or when it beats the lowest entry
    pub fn is_eligible(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        match self.lowest() {
            Some(lowest) if self.entries.len() >= LEADERBOARD_SIZE => score > lowest,
            _ => true,
        }
    }

    /// Insert below any equal scores; returns the 0-based rank if it stayed on the board
    pub fn submit(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.is_eligible(entry.score) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(rank, entry);
        self.entries.truncate(LEADERBOARD_SIZE);
        Some(rank)
    }
}

/// Everything that persists between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub stats: GlobalStats,
    pub coins: u32,
    pub inventory: Inventory,
    pub upgrades: Upgrades,
    /// Highest adventure level unlocked (index into the catalog)
    pub adventure_max_level: u32,
    pub unlocked: Vec<&'static str>,
    /// Best score per mode, indexed by `GameMode::index`
    pub high_scores: [u32; 4],
    pub leaderboard: Leaderboard,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            stats: GlobalStats::default(),
            coins: 0,
            inventory: Inventory::default(),
            upgrades: Upgrades::default(),
            adventure_max_level: 0,
            unlocked: Vec::new(),
            high_scores: [0; 4],
            leaderboard: Leaderboard::new(),
        }
    }
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn high_score(&self, mode: GameMode) -> u32 {
        self.high_scores[mode.index()]
    }

    /// Raise the mode's high score; true when `score` is a new record
    pub fn record_score(&mut self, mode: GameMode, score: u32) -> bool {
        let best = &mut self.high_scores[mode.index()];
        if score > *best {
            *best = score;
            true
        } else {
            false
        }
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| *u == id)
    }

    /// Unlock every achievement whose condition now holds; returns the new ids
    pub fn check_achievements(&mut self) -> Vec<&'static str> {
        let mut fresh = Vec::new();
        for a in ACHIEVEMENTS.iter() {
            if !self.is_unlocked(a.id) && (a.check)(&self.stats) {
                log::info!("achievement unlocked: {}", a.name);
                self.unlocked.push(a.id);
                fresh.push(a.id);
            }
        }
        fresh
    }

    /// Spend coins on one consumable
    pub fn buy_item(&mut self, item: Item, price: u32) -> Result<u32, ActionError> {
        if self.coins < price {
            return Err(ActionError::InsufficientCoins);
        }
        self.coins -= price;
        let count = self.inventory.get_mut(item);
        *count += 1;
        Ok(*count)
    }

    /// Buy the next level of an upgrade; returns the new level
    pub fn buy_upgrade(&mut self, upgrade: Upgrade) -> Result<u8, ActionError> {
        let level = self.upgrades.level(upgrade);
        if level >= MAX_UPGRADE_LEVEL {
            return Err(ActionError::MaxUpgrade);
        }
        let cost = upgrade.cost(level);
        if self.coins < cost {
            return Err(ActionError::InsufficientCoins);
        }
        self.coins -= cost;
        *self.upgrades.level_mut(upgrade) = level + 1;
        Ok(level + 1)
    }
}
