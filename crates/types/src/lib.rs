//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, placement search, persistence, rendering).
//!
//! # Board Dimensions
//!
//! The playfield is a fixed square grid:
//!
//! - **Width**: 8 columns (indexed 0-7)
//! - **Height**: 8 rows (indexed 0-7)
//! - Coordinates are `(x, y)` with `x` the column and `y` the row, origin top-left
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `CLEAR_RESOLVE_MS` | 250 | Board lock between clear detection and commit |
//! | `ZEN_REFRESH_MS` | 1000 | Delay before a zen board wipe |
//! | `BULL_MARKET_MS` | 30000 | Duration of the score-doubling market event |
//! | `TAX_HAVEN_MS` | 20000 | Duration of the streak shield market event |
//!
//! # Cell Kinds
//!
//! | Kind | Payload | Line clear behaviour |
//! |------|---------|----------------------|
//! | `normal`, `liquid`, `vine`, `cracked` | - | cleared |
//! | `gold` | - | cleared, pays `GOLD_CELL_COINS` |
//! | `metal`, `ice` | durability | decrement while > 1, else cleared |
//! | `chain` | linked | linked: unlinks every chain on the board, survives |
//! | `gem` | - | cleared, counts towards gem goals |
//! | `multiplier` | square / cross | cleared, arms a frenzy |
//! | `inflation` | timer | cleared, pays `timer` coins |
//! | `crypto` | - | cleared, pays a volatile bonus |
//! | `bomb` | countdown | cleared (defused) |
//!
//! # Examples
//!
//! ```
//! use block_riser_types::{CellKind, GameMode, PieceKind, COLS, ROWS};
//!
//! // Parse a mode (case-insensitive)
//! assert_eq!(GameMode::from_str("Bomb"), Some(GameMode::Bomb));
//!
//! // Piece kinds translate into cell kinds on placement
//! assert_eq!(PieceKind::Metal.cell_kind(), CellKind::Metal { durability: 2 });
//!
//! // Board dimensions
//! assert_eq!(COLS, 8);
//! assert_eq!(ROWS, 8);
//! ```

use std::fmt;

/// Board width in cells (8 columns)
pub const COLS: u8 = 8;

/// Board height in cells (8 rows)
pub const ROWS: u8 = 8;

/// Queue slots in every policy except lean startup
pub const QUEUE_CAPACITY: usize = 3;

/// Queue slots under the lean startup policy
pub const LEAN_QUEUE_CAPACITY: usize = 1;

/// Board lock between clear detection and commit (250ms)
pub const CLEAR_RESOLVE_MS: u32 = 250;

/// Delay before a zen-mode board wipe once no moves remain (1000ms)
pub const ZEN_REFRESH_MS: u32 = 1000;

/// Bull market duration (30s)
pub const BULL_MARKET_MS: u32 = 30_000;

/// Tax haven shield duration (20s)
pub const TAX_HAVEN_MS: u32 = 20_000;

/// Chance (percent) that a placement starts a market event
pub const MARKET_EVENT_CHANCE_PERCENT: u32 = 2;

/// Market events never roll below this level
pub const MARKET_EVENT_MIN_LEVEL: u32 = 3;

/// Points per cell written by a placement (multiplied by level)
pub const PLACEMENT_POINTS_PER_CELL: u32 = 10;

/// Base points per cleared line
pub const LINE_BASE_POINTS: u32 = 100;

/// Cleared lines needed for each level
pub const LINES_PER_LEVEL: u32 = 10;

/// Hit count of a freshly placed metal cell
pub const METAL_DURABILITY: u8 = 2;

/// Hit count of a spawned ice obstacle
pub const ICE_DURABILITY: u8 = 2;

/// Countdown of a freshly spawned bomb cell
pub const BOMB_COUNTDOWN: i8 = 9;

/// Placements between bomb spawns in bomb mode
pub const BOMB_SPAWN_INTERVAL: u32 = 8;

/// Placements before the first bomb in bomb mode
pub const BOMB_MODE_FIRST_SPAWN: u32 = 5;

/// Placements boosted by a frenzy
pub const FRENZY_PLACEMENTS: u32 = 3;

/// Coins paid by each cleared gold cell
pub const GOLD_CELL_COINS: u32 = 10;

/// Maximum timer an inflation cell can accumulate
pub const INFLATION_TIMER_CAP: u8 = 20;

/// Maximum payout of a cleared crypto cell
pub const CRYPTO_MAX_COINS: u32 = 25;

/// Bailouts granted by the tax haven policy
pub const TAX_HAVEN_BAILOUTS: u32 = 2;

/// Boss health removed by each placement
pub const BOSS_HIT_PER_PLACEMENT: u32 = 10;

/// Boss health removed by each cleared line
pub const BOSS_HIT_PER_LINE: u32 = 25;

/// Entries kept on the leaderboard
pub const LEADERBOARD_SIZE: usize = 5;

/// Highest purchasable upgrade level
pub const MAX_UPGRADE_LEVEL: u8 = 5;

/// Display colour stored as `0xRRGGBB`
///
/// Purely cosmetic; the engine never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Bomb cells are always drawn in this colour
    pub const BOMB: Color = Color(0xFF0044);

    /// Neutral grey used for obstacles
    pub const OBSTACLE: Color = Color(0x555555);

    /// Parse `#RRGGBB` (the leading `#` is optional)
    ///
    /// # Examples
    ///
    /// ```
    /// use block_riser_types::Color;
    ///
    /// assert_eq!(Color::from_hex("#FF3366"), Some(Color(0xFF3366)));
    /// assert_eq!(Color::from_hex("33ff57"), Some(Color(0x33FF57)));
    /// assert_eq!(Color::from_hex("#12"), None);
    /// ```
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
    }
}

/// Shape of the area boosted by a multiplier cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiplierKind {
    Square,
    Cross,
}

impl MultiplierKind {
    /// Score factor applied while the frenzy it arms is running
    pub fn factor(self) -> f64 {
        match self {
            MultiplierKind::Square => 2.0,
            MultiplierKind::Cross => 1.5,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "square" => Some(MultiplierKind::Square),
            "cross" => Some(MultiplierKind::Cross),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MultiplierKind::Square => "square",
            MultiplierKind::Cross => "cross",
        }
    }
}

/// What occupies a board slot, with the fields each kind needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Normal,
    Gold,
    Metal { durability: u8 },
    Multiplier(MultiplierKind),
    Inflation { timer: u8 },
    Liquid,
    Crypto,
    Gem,
    Ice { durability: u8 },
    Chain { linked: bool },
    Vine,
    Cracked,
    Bomb { countdown: i8 },
}

impl CellKind {
    /// Lowercase name used by the persisted grid format
    ///
    /// # Examples
    ///
    /// ```
    /// use block_riser_types::CellKind;
    ///
    /// assert_eq!(CellKind::Ice { durability: 3 }.as_str(), "ice");
    /// assert_eq!(CellKind::Chain { linked: true }.as_str(), "chain");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Normal => "normal",
            CellKind::Gold => "gold",
            CellKind::Metal { .. } => "metal",
            CellKind::Multiplier(_) => "multiplier",
            CellKind::Inflation { .. } => "inflation",
            CellKind::Liquid => "liquid",
            CellKind::Crypto => "crypto",
            CellKind::Gem => "gem",
            CellKind::Ice { .. } => "ice",
            CellKind::Chain { .. } => "chain",
            CellKind::Vine => "vine",
            CellKind::Cracked => "cracked",
            CellKind::Bomb { .. } => "bomb",
        }
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self, CellKind::Bomb { .. })
    }
}

/// A filled board slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub color: Color,
    pub kind: CellKind,
}

impl Cell {
    pub fn new(color: Color, kind: CellKind) -> Self {
        Self { color, kind }
    }
}

/// A board slot
///
/// - `None`: Empty slot
/// - `Some(Cell)`: Slot filled by a placement or an obstacle spawn
pub type Slot = Option<Cell>;

/// Special kind rolled for a piece at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PieceKind {
    #[default]
    Normal,
    Gold,
    Metal,
    Multiplier(MultiplierKind),
    Inflation,
    Liquid,
    Crypto,
}

impl PieceKind {
    /// Cell kind written for every filled cell of a placed piece
    pub fn cell_kind(self) -> CellKind {
        match self {
            PieceKind::Normal => CellKind::Normal,
            PieceKind::Gold => CellKind::Gold,
            PieceKind::Metal => CellKind::Metal {
                durability: METAL_DURABILITY,
            },
            PieceKind::Multiplier(kind) => CellKind::Multiplier(kind),
            PieceKind::Inflation => CellKind::Inflation { timer: 0 },
            PieceKind::Liquid => CellKind::Liquid,
            PieceKind::Crypto => CellKind::Crypto,
        }
    }

    /// Parse a persisted kind name; multiplier kinds carry their shape as `multiplier:cross`
    ///
    /// # Examples
    ///
    /// ```
    /// use block_riser_types::{MultiplierKind, PieceKind};
    ///
    /// assert_eq!(PieceKind::from_str("gold"), Some(PieceKind::Gold));
    /// assert_eq!(
    ///     PieceKind::from_str("multiplier:cross"),
    ///     Some(PieceKind::Multiplier(MultiplierKind::Cross))
    /// );
    /// assert_eq!(PieceKind::from_str("ice"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if let Some(rest) = lower.strip_prefix("multiplier:") {
            return MultiplierKind::from_str(rest).map(PieceKind::Multiplier);
        }
        match lower.as_str() {
            "normal" => Some(PieceKind::Normal),
            "gold" => Some(PieceKind::Gold),
            "metal" => Some(PieceKind::Metal),
            "multiplier" => Some(PieceKind::Multiplier(MultiplierKind::Square)),
            "inflation" => Some(PieceKind::Inflation),
            "liquid" => Some(PieceKind::Liquid),
            "crypto" => Some(PieceKind::Crypto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Normal => "normal",
            PieceKind::Gold => "gold",
            PieceKind::Metal => "metal",
            PieceKind::Multiplier(MultiplierKind::Square) => "multiplier:square",
            PieceKind::Multiplier(MultiplierKind::Cross) => "multiplier:cross",
            PieceKind::Inflation => "inflation",
            PieceKind::Liquid => "liquid",
            PieceKind::Crypto => "crypto",
        }
    }
}

/// Game modes selectable from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Classic,
    Zen,
    Adventure,
    Bomb,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Classic,
        GameMode::Zen,
        GameMode::Adventure,
        GameMode::Bomb,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "zen" => Some(GameMode::Zen),
            "adventure" => Some(GameMode::Adventure),
            "bomb" => Some(GameMode::Bomb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Zen => "zen",
            GameMode::Adventure => "adventure",
            GameMode::Bomb => "bomb",
        }
    }

    pub fn index(self) -> usize {
        match self {
            GameMode::Classic => 0,
            GameMode::Zen => 1,
            GameMode::Adventure => 2,
            GameMode::Bomb => 3,
        }
    }
}

/// Session-wide modifier chosen before a run
///
/// - **Aggressive**: every score gain is doubled
/// - **TaxHaven**: starts with `TAX_HAVEN_BAILOUTS` board rescues
/// - **LeanStartup**: one queue slot, doubled coin income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    #[default]
    None,
    Aggressive,
    TaxHaven,
    LeanStartup,
}

impl Policy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "" => Some(Policy::None),
            "aggressive" => Some(Policy::Aggressive),
            "taxhaven" | "tax-haven" => Some(Policy::TaxHaven),
            "leanstartup" | "lean-startup" | "lean" => Some(Policy::LeanStartup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::None => "none",
            Policy::Aggressive => "aggressive",
            Policy::TaxHaven => "tax-haven",
            Policy::LeanStartup => "lean-startup",
        }
    }

    pub fn queue_capacity(self) -> usize {
        match self {
            Policy::LeanStartup => LEAN_QUEUE_CAPACITY,
            _ => QUEUE_CAPACITY,
        }
    }

    pub fn starting_bailouts(self) -> u32 {
        match self {
            Policy::TaxHaven => TAX_HAVEN_BAILOUTS,
            _ => 0,
        }
    }
}

/// Speed setting; faster games pay more per point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameSpeed {
    #[default]
    Normal,
    Fast,
    Turbo,
}

impl GameSpeed {
    pub fn score_multiplier(self) -> f64 {
        match self {
            GameSpeed::Normal => 1.0,
            GameSpeed::Fast => 1.2,
            GameSpeed::Turbo => 1.5,
        }
    }

    pub fn from_index(i: u8) -> Self {
        match i {
            1 => GameSpeed::Fast,
            2 => GameSpeed::Turbo,
            _ => GameSpeed::Normal,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            GameSpeed::Normal => 0,
            GameSpeed::Fast => 1,
            GameSpeed::Turbo => 2,
        }
    }
}

/// What an adventure level asks the player to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalType {
    Lines,
    Score,
    Blocks,
    Gems,
    Boss,
}

impl GoalType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lines" => Some(GoalType::Lines),
            "score" => Some(GoalType::Score),
            "blocks" => Some(GoalType::Blocks),
            "gems" => Some(GoalType::Gems),
            "boss" => Some(GoalType::Boss),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Lines => "lines",
            GoalType::Score => "score",
            GoalType::Blocks => "blocks",
            GoalType::Gems => "gems",
            GoalType::Boss => "boss",
        }
    }
}

/// Timed session-wide events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketEvent {
    /// Score gains doubled
    BullMarket,
    /// Streak is not reset by placements that clear nothing
    TaxHaven,
}

impl MarketEvent {
    pub fn duration_ms(self) -> u32 {
        match self {
            MarketEvent::BullMarket => BULL_MARKET_MS,
            MarketEvent::TaxHaven => TAX_HAVEN_MS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketEvent::BullMarket => "bull-market",
            MarketEvent::TaxHaven => "tax-haven",
        }
    }
}

/// Consumable items held in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    Hammer,
    Bomb,
    Reroll,
    Undo,
}

impl Item {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hammer" => Some(Item::Hammer),
            "bomb" => Some(Item::Bomb),
            "reroll" => Some(Item::Reroll),
            "undo" => Some(Item::Undo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Item::Hammer => "hammer",
            Item::Bomb => "bomb",
            Item::Reroll => "reroll",
            Item::Undo => "undo",
        }
    }
}

/// Item counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inventory {
    pub hammer: u32,
    pub bomb: u32,
    pub reroll: u32,
    pub undo: u32,
}

impl Inventory {
    pub fn get(&self, item: Item) -> u32 {
        match item {
            Item::Hammer => self.hammer,
            Item::Bomb => self.bomb,
            Item::Reroll => self.reroll,
            Item::Undo => self.undo,
        }
    }

    pub fn get_mut(&mut self, item: Item) -> &mut u32 {
        match item {
            Item::Hammer => &mut self.hammer,
            Item::Bomb => &mut self.bomb,
            Item::Reroll => &mut self.reroll,
            Item::Undo => &mut self.undo,
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            hammer: 3,
            bomb: 1,
            reroll: 1,
            undo: 1,
        }
    }
}

/// Permanent upgrades bought with coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upgrade {
    /// Raises the gold piece chance
    Magnet,
    /// Raises the combo multiplier
    Combo,
    /// Chance to refund an undo charge
    Insurance,
}

impl Upgrade {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "magnet" => Some(Upgrade::Magnet),
            "combo" => Some(Upgrade::Combo),
            "insurance" => Some(Upgrade::Insurance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Upgrade::Magnet => "magnet",
            Upgrade::Combo => "combo",
            Upgrade::Insurance => "insurance",
        }
    }

    /// Coin price of the next level when currently at `level`
    pub fn cost(self, level: u8) -> u32 {
        200 * (level as u32 + 1)
    }
}

/// Upgrade levels (0..=`MAX_UPGRADE_LEVEL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Upgrades {
    pub magnet: u8,
    pub combo: u8,
    pub insurance: u8,
}

impl Upgrades {
    pub fn level(&self, upgrade: Upgrade) -> u8 {
        match upgrade {
            Upgrade::Magnet => self.magnet,
            Upgrade::Combo => self.combo,
            Upgrade::Insurance => self.insurance,
        }
    }

    pub fn level_mut(&mut self, upgrade: Upgrade) -> &mut u8 {
        match upgrade {
            Upgrade::Magnet => &mut self.magnet,
            Upgrade::Combo => &mut self.combo,
            Upgrade::Insurance => &mut self.insurance,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    NoMoves,
    BombExploded,
}

impl GameOverReason {
    /// Title shown on the game-over overlay
    pub fn message(self) -> &'static str {
        match self {
            GameOverReason::NoMoves => "No More Moves!",
            GameOverReason::BombExploded => "Bomb Exploded!",
        }
    }
}

/// Core-side event emitted while handling player actions.
///
/// Render and audio collaborators drain these after each call; the
/// persistence collaborator reacts to `Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PiecePlaced { x: u8, y: u8, cells: u8 },
    InvalidPlacement,
    /// Full lines detected; the board is locked until the clear commits
    ClearStarted { lines: u8 },
    ClearCommitted { lines: u8, points: u32, coins: u32 },
    ChainsUnlinked { count: u8 },
    FrenzyArmed(MultiplierKind),
    LevelUp { level: u32 },
    AchievementUnlocked { id: &'static str },
    BombSpawned { x: u8, y: u8 },
    Bailout { left: u32 },
    ZenRefresh,
    MarketEventStarted(MarketEvent),
    MarketEventEnded(MarketEvent),
    Rerolled,
    UndoPerformed { refunded: bool },
    ToolUsed(Item),
    LevelCleared { level_id: u32 },
    LevelFailed { level_id: u32 },
    GameOver {
        reason: GameOverReason,
        score: u32,
        leaderboard_eligible: bool,
    },
    /// The action is fully resolved and the session may be persisted
    Settled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_kinds_translate_to_cell_kinds() {
        assert_eq!(PieceKind::Normal.cell_kind(), CellKind::Normal);
        assert_eq!(
            PieceKind::Metal.cell_kind(),
            CellKind::Metal {
                durability: METAL_DURABILITY
            }
        );
        assert_eq!(
            PieceKind::Multiplier(MultiplierKind::Cross).cell_kind(),
            CellKind::Multiplier(MultiplierKind::Cross)
        );
        assert_eq!(
            PieceKind::Inflation.cell_kind(),
            CellKind::Inflation { timer: 0 }
        );
    }

    #[test]
    fn piece_kind_names_round_trip() {
        for kind in [
            PieceKind::Normal,
            PieceKind::Gold,
            PieceKind::Metal,
            PieceKind::Multiplier(MultiplierKind::Square),
            PieceKind::Multiplier(MultiplierKind::Cross),
            PieceKind::Inflation,
            PieceKind::Liquid,
            PieceKind::Crypto,
        ] {
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn color_hex_formatting() {
        assert_eq!(Color(0xFF3366).to_string(), "#FF3366");
        assert_eq!(Color(0x00000A).to_string(), "#00000A");
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn lean_startup_shrinks_queue() {
        assert_eq!(Policy::None.queue_capacity(), 3);
        assert_eq!(Policy::LeanStartup.queue_capacity(), 1);
        assert_eq!(Policy::TaxHaven.starting_bailouts(), TAX_HAVEN_BAILOUTS);
        assert_eq!(Policy::Aggressive.starting_bailouts(), 0);
    }

    #[test]
    fn speed_multipliers() {
        assert_eq!(GameSpeed::Normal.score_multiplier(), 1.0);
        assert_eq!(GameSpeed::from_index(2), GameSpeed::Turbo);
        assert_eq!(GameSpeed::from_index(9), GameSpeed::Normal);
    }

    #[test]
    fn default_inventory_matches_new_profile() {
        let inv = Inventory::default();
        assert_eq!(inv.get(Item::Hammer), 3);
        assert_eq!(inv.get(Item::Bomb), 1);
        assert_eq!(inv.get(Item::Reroll), 1);
        assert_eq!(inv.get(Item::Undo), 1);
    }
}
