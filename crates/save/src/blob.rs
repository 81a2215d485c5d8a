//! Serializable mirrors of the session and profile
//!
//! Field names follow the persisted browser format (camelCase, colours as
//! `#RRGGBB`, kinds and modes as lowercase names) so older saves keep loading.
//! Every decode validates dimensions and names and reports a [`SaveError`]
//! instead of guessing.

use serde::{Deserialize, Serialize};

use crate::core::goal::{GoalStatus, GoalTracker};
use crate::core::pieces::{PieceDescriptor, ShapeId, SHAPES};
use crate::core::profile::{achievement, GlobalStats, Leaderboard, LeaderboardEntry};
use crate::core::{
    Board, Profile, QueueDescriptors, SessionConfig, SessionState, SessionStats, SimpleRng,
};
use crate::error::{Result, SaveError};
use crate::types::{
    Cell, CellKind, Color, GameMode, GameSpeed, GoalType, Inventory, MultiplierKind, PieceKind,
    Policy, Slot, Upgrades, BOMB_COUNTDOWN, COLS, ICE_DURABILITY, METAL_DURABILITY,
    QUEUE_CAPACITY, ROWS,
};

// ============== Session ==============

/// One filled grid slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBlob {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked: Option<bool>,
    /// Multiplier area (`square` or `cross`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

impl CellBlob {
    fn plain(cell: &Cell) -> Self {
        Self {
            color: cell.color.to_string(),
            kind: cell.kind.as_str().to_string(),
            durability: None,
            timer: None,
            countdown: None,
            linked: None,
            area: None,
        }
    }

    pub fn from_cell(cell: &Cell) -> Self {
        let mut blob = Self::plain(cell);
        match cell.kind {
            CellKind::Metal { durability } | CellKind::Ice { durability } => {
                blob.durability = Some(durability)
            }
            CellKind::Inflation { timer } => blob.timer = Some(timer),
            CellKind::Bomb { countdown } => blob.countdown = Some(countdown),
            CellKind::Chain { linked } => blob.linked = Some(linked),
            CellKind::Multiplier(area) => blob.area = Some(area.as_str().to_string()),
            CellKind::Normal
            | CellKind::Gold
            | CellKind::Liquid
            | CellKind::Crypto
            | CellKind::Gem
            | CellKind::Vine
            | CellKind::Cracked => {}
        }
        blob
    }

    pub fn to_cell(&self) -> Result<Cell> {
        let color = parse_color(&self.color)?;
        let kind = match self.kind.as_str() {
            "normal" => CellKind::Normal,
            "gold" => CellKind::Gold,
            "liquid" => CellKind::Liquid,
            "crypto" => CellKind::Crypto,
            "gem" => CellKind::Gem,
            "vine" => CellKind::Vine,
            "cracked" => CellKind::Cracked,
            "metal" => CellKind::Metal {
                durability: self.durability.unwrap_or(METAL_DURABILITY),
            },
            "ice" => CellKind::Ice {
                durability: self.durability.unwrap_or(ICE_DURABILITY),
            },
            "inflation" => CellKind::Inflation {
                timer: self.timer.unwrap_or(0),
            },
            "bomb" => CellKind::Bomb {
                countdown: self.countdown.unwrap_or(BOMB_COUNTDOWN),
            },
            "chain" => CellKind::Chain {
                linked: self.linked.unwrap_or(true),
            },
            "multiplier" => {
                let area = self.area.as_deref().unwrap_or("square");
                CellKind::Multiplier(
                    MultiplierKind::from_str(area).ok_or_else(|| unknown("multiplier", area))?,
                )
            }
            other => return Err(unknown("cell type", other)),
        };
        Ok(Cell::new(color, kind))
    }
}

/// A queued piece, rebuilt from its shape id on load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceBlob {
    pub shape_id: String,
    pub color: String,
    #[serde(default = "normal_kind")]
    pub kind: String,
    #[serde(default)]
    pub rotated: bool,
}

fn normal_kind() -> String {
    PieceKind::Normal.as_str().to_string()
}

impl PieceBlob {
    pub fn from_descriptor(d: &PieceDescriptor) -> Self {
        Self {
            shape_id: d.shape.name().to_string(),
            color: d.color.to_string(),
            kind: d.kind.as_str().to_string(),
            rotated: d.rotated,
        }
    }

    pub fn to_descriptor(&self) -> Result<PieceDescriptor> {
        // ShapeId::from_name falls back silently; a save must name a real shape
        if !SHAPES.iter().any(|s| s.id == self.shape_id) {
            return Err(SaveError::UnknownShape(self.shape_id.clone()));
        }
        Ok(PieceDescriptor {
            shape: ShapeId::from_name(&self.shape_id),
            kind: PieceKind::from_str(&self.kind).ok_or_else(|| unknown("piece kind", &self.kind))?,
            color: parse_color(&self.color)?,
            rotated: self.rotated,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdventureBlob {
    pub level_id: u32,
    pub goal_type: String,
    pub target: u32,
    pub progress: u32,
    pub moves_left: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_health: Option<u32>,
}

impl AdventureBlob {
    pub fn from_tracker(t: &GoalTracker) -> Self {
        Self {
            level_id: t.level_id,
            goal_type: t.goal.as_str().to_string(),
            target: t.target,
            progress: t.progress,
            moves_left: t.moves_left,
            boss_health: t.boss_health,
        }
    }

    pub fn to_tracker(&self) -> Result<GoalTracker> {
        let goal =
            GoalType::from_str(&self.goal_type).ok_or_else(|| unknown("goal type", &self.goal_type))?;
        Ok(GoalTracker {
            level_id: self.level_id,
            goal,
            target: self.target,
            progress: self.progress,
            moves_left: self.moves_left,
            boss_health: match goal {
                GoalType::Boss => Some(self.boss_health.unwrap_or(self.target)),
                _ => None,
            },
            // Finished runs are never saved
            status: GoalStatus::InProgress,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsBlob {
    pub blocks: u32,
    pub cells: u32,
    pub gems: u32,
    pub tools: u32,
}

/// The resumable run, stored under `blockriser-state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBlob {
    pub grid: Vec<Vec<Option<CellBlob>>>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub streak: u32,
    pub queue: Vec<Option<PieceBlob>>,
    /// Cosmetic; carried for the render side and never read by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub mode: String,
    #[serde(default)]
    pub bomb_counter: u32,
    #[serde(default)]
    pub adventure: Option<AdventureBlob>,
    #[serde(default = "no_policy")]
    pub active_policy: String,
    #[serde(default)]
    pub bailouts_left: u32,
    #[serde(default)]
    pub speed: u8,
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Where the random sequence stood when saved; absent means the start of `seed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_state: Option<u32>,
    #[serde(default)]
    pub rewarded_level: u32,
    #[serde(default)]
    pub stats: StatsBlob,
}

fn no_policy() -> String {
    Policy::None.as_str().to_string()
}

fn default_seed() -> u32 {
    SessionConfig::default().seed
}

impl SessionBlob {
    pub fn capture(config: &SessionConfig, state: &SessionState) -> Self {
        let grid = state
            .board
            .rows()
            .iter()
            .map(|row| row.iter().map(|slot| slot.as_ref().map(CellBlob::from_cell)).collect())
            .collect();
        let queue = state
            .queue
            .iter()
            .map(|d| d.as_ref().map(PieceBlob::from_descriptor))
            .collect();

        Self {
            grid,
            score: state.score,
            level: state.level,
            lines: state.lines,
            streak: state.streak,
            queue,
            theme: None,
            mode: config.mode.as_str().to_string(),
            bomb_counter: state.bomb_counter,
            adventure: state.goal.as_ref().map(AdventureBlob::from_tracker),
            active_policy: config.policy.as_str().to_string(),
            bailouts_left: state.bailouts_left,
            speed: config.speed.index(),
            seed: config.seed,
            rng_state: Some(state.rng_state),
            rewarded_level: state.rewarded_level,
            stats: StatsBlob {
                blocks: state.stats.blocks,
                cells: state.stats.cells,
                gems: state.stats.gems,
                tools: state.stats.tools_used,
            },
        }
    }

    /// Validate and rebuild the config and state a session resumes from
    pub fn restore(&self) -> Result<(SessionConfig, SessionState)> {
        let mode = GameMode::from_str(&self.mode).ok_or_else(|| unknown("mode", &self.mode))?;
        let policy = Policy::from_str(&self.active_policy)
            .ok_or_else(|| unknown("policy", &self.active_policy))?;
        let board = self.board()?;

        if self.queue.len() > QUEUE_CAPACITY {
            return Err(SaveError::QueueLength(self.queue.len()));
        }
        let mut queue = QueueDescriptors::new();
        for slot in &self.queue {
            queue.push(slot.as_ref().map(PieceBlob::to_descriptor).transpose()?);
        }

        let goal = self.adventure.as_ref().map(AdventureBlob::to_tracker).transpose()?;
        let config = SessionConfig {
            mode,
            policy,
            speed: GameSpeed::from_index(self.speed),
            seed: self.seed,
            adventure_level: goal.map_or(0, |g| g.level_id),
        };
        let state = SessionState {
            board,
            queue,
            score: self.score,
            level: self.level.max(1),
            lines: self.lines,
            streak: self.streak,
            bomb_counter: self.bomb_counter,
            bailouts_left: self.bailouts_left,
            goal,
            stats: SessionStats {
                blocks: self.stats.blocks,
                cells: self.stats.cells,
                gems: self.stats.gems,
                tools_used: self.stats.tools,
            },
            rewarded_level: self.rewarded_level,
            rng_state: self
                .rng_state
                .unwrap_or_else(|| SimpleRng::new(self.seed).seed()),
        };
        Ok((config, state))
    }

    fn board(&self) -> Result<Board> {
        if self.grid.len() != ROWS as usize {
            return Err(SaveError::GridShape {
                expected: ROWS,
                rows: self.grid.len(),
            });
        }
        let mut rows = [[Slot::None; COLS as usize]; ROWS as usize];
        for (y, row) in self.grid.iter().enumerate() {
            if row.len() != COLS as usize {
                return Err(SaveError::GridRow { row: y, len: row.len() });
            }
            for (x, slot) in row.iter().enumerate() {
                rows[y][x] = slot.as_ref().map(CellBlob::to_cell).transpose()?;
            }
        }
        Ok(Board::from_rows(&rows))
    }
}

// ============== Profile ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryBlob {
    pub hammer: u32,
    pub bomb: u32,
    pub reroll: u32,
    pub undo: u32,
}

impl Default for InventoryBlob {
    fn default() -> Self {
        Inventory::default().into()
    }
}

impl From<Inventory> for InventoryBlob {
    fn from(i: Inventory) -> Self {
        Self {
            hammer: i.hammer,
            bomb: i.bomb,
            reroll: i.reroll,
            undo: i.undo,
        }
    }
}

impl From<InventoryBlob> for Inventory {
    fn from(i: InventoryBlob) -> Self {
        Self {
            hammer: i.hammer,
            bomb: i.bomb,
            reroll: i.reroll,
            undo: i.undo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradesBlob {
    pub magnet: u8,
    pub combo: u8,
    pub insurance: u8,
}

/// Lifetime stats and wallet, stored under `blockriser-global-stats`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalStatsBlob {
    pub games_played: u32,
    pub lines_cleared: u32,
    pub blocks_placed: u32,
    pub hammers_used: u32,
    pub bombs_used: u32,
    pub coins: u32,
    pub inventory: InventoryBlob,
    pub upgrades: UpgradesBlob,
    pub adventure_max_level: u32,
    pub unlocked: Vec<String>,
}

impl GlobalStatsBlob {
    pub fn capture(profile: &Profile) -> Self {
        let s = &profile.stats;
        Self {
            games_played: s.games_played,
            lines_cleared: s.lines_cleared,
            blocks_placed: s.blocks_placed,
            hammers_used: s.hammers_used,
            bombs_used: s.bombs_used,
            coins: profile.coins,
            inventory: profile.inventory.into(),
            upgrades: UpgradesBlob {
                magnet: profile.upgrades.magnet,
                combo: profile.upgrades.combo,
                insurance: profile.upgrades.insurance,
            },
            adventure_max_level: profile.adventure_max_level,
            unlocked: profile.unlocked.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Copy into `profile`; achievement ids no longer in the catalog are dropped
    pub fn apply(&self, profile: &mut Profile) {
        profile.stats = GlobalStats {
            games_played: self.games_played,
            lines_cleared: self.lines_cleared,
            blocks_placed: self.blocks_placed,
            hammers_used: self.hammers_used,
            bombs_used: self.bombs_used,
        };
        profile.coins = self.coins;
        profile.inventory = self.inventory.into();
        profile.upgrades = Upgrades {
            magnet: self.upgrades.magnet,
            combo: self.upgrades.combo,
            insurance: self.upgrades.insurance,
        };
        profile.adventure_max_level = self.adventure_max_level;
        profile.unlocked = self
            .unlocked
            .iter()
            .filter_map(|id| match achievement(id) {
                Some(a) => Some(a.id),
                None => {
                    log::warn!("dropping unknown achievement {:?}", id);
                    None
                }
            })
            .collect();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntryBlob {
    pub name: String,
    pub score: u32,
    pub mode: String,
}

pub fn leaderboard_blob(board: &Leaderboard) -> Vec<LeaderboardEntryBlob> {
    board
        .entries()
        .iter()
        .map(|e| LeaderboardEntryBlob {
            name: e.name.clone(),
            score: e.score,
            mode: e.mode.as_str().to_string(),
        })
        .collect()
}

/// Rebuild a leaderboard; entries with an unknown mode are skipped
pub fn leaderboard_from_blob(entries: &[LeaderboardEntryBlob]) -> Leaderboard {
    let entries = entries
        .iter()
        .filter_map(|e| {
            let mode = GameMode::from_str(&e.mode);
            if mode.is_none() {
                log::warn!("skipping leaderboard entry with mode {:?}", e.mode);
            }
            mode.map(|mode| LeaderboardEntry {
                name: e.name.clone(),
                score: e.score,
                mode,
            })
        })
        .collect();
    Leaderboard::from_entries(entries)
}

fn parse_color(s: &str) -> Result<Color> {
    Color::from_hex(s).ok_or_else(|| SaveError::BadColor(s.to_string()))
}

fn unknown(field: &'static str, value: &str) -> SaveError {
    SaveError::UnknownName {
        field,
        value: value.to_string(),
    }
}
