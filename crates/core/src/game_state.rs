//! Game session - the controller that sequences every player action
//!
//! This module ties together all core components: board, queue, line-clear
//! engine, scoring, goal tracker, undo and the scheduler. A placement runs
//! validation, mutation and clear detection synchronously; if lines are full
//! the board enters the resolving phase and the clear commits when the host
//! advances the clock past `CLEAR_RESOLVE_MS` with [`GameSession::tick`].

use std::env;

use rand::Rng;

use crate::board::Board;
use crate::clear::{self, ClearLines};
use crate::error::ActionError;
use crate::goal::{adventure_level, GoalCounters, GoalStatus, GoalTracker};
use crate::pieces::Piece;
use crate::profile::{LeaderboardEntry, Profile};
use crate::queue::PieceQueue;
use crate::rng::{RngPosition, SimpleRng};
use crate::scheduler::{Phase, Scheduler, Step};
use crate::scoring::{
    calculate_level, coin_reward, level_reward, line_clear_points, placement_points, Frenzy,
    League,
};
use crate::snapshot::{GameSnapshot, QueueDescriptors, UndoManager, UndoSnapshot};
use crate::types::*;

/// How a run is set up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub policy: Policy,
    pub speed: GameSpeed,
    pub seed: u32,
    /// Catalog index of the adventure level (adventure mode only)
    pub adventure_level: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            policy: Policy::None,
            speed: GameSpeed::Normal,
            seed: 1,
            adventure_level: 0,
        }
    }
}

impl SessionConfig {
    /// Read overrides from `BLOCKRISER_*` variables; unset or invalid values keep the default
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mode = env::var("BLOCKRISER_MODE")
            .ok()
            .and_then(|s| GameMode::from_str(s.trim()))
            .unwrap_or(defaults.mode);
        let policy = env::var("BLOCKRISER_POLICY")
            .ok()
            .and_then(|s| Policy::from_str(s.trim()))
            .unwrap_or(defaults.policy);
        let speed = env::var("BLOCKRISER_SPEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(GameSpeed::from_index)
            .unwrap_or(defaults.speed);
        let seed = env::var("BLOCKRISER_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);
        let adventure_level = env::var("BLOCKRISER_LEVEL")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.adventure_level);

        Self {
            mode,
            policy,
            speed,
            seed,
            adventure_level,
        }
    }
}

/// Per-run counters (lifetime totals live in the profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionStats {
    /// Pieces placed
    pub blocks: u32,
    /// Cells written by placements
    pub cells: u32,
    pub gems: u32,
    pub tools_used: u32,
}

/// Resumable part of a session, produced for and consumed from saves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub board: Board,
    pub queue: QueueDescriptors,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub streak: u32,
    pub bomb_counter: u32,
    pub bailouts_left: u32,
    pub goal: Option<GoalTracker>,
    pub stats: SessionStats,
    /// Highest level whose item rewards were paid out this run
    pub rewarded_level: u32,
    /// Position of the random source, so a resumed run does not replay its pieces
    pub rng_state: u32,
}

/// Result of an accepted placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOutcome {
    pub cells: u8,
    pub points: u32,
    /// Full lines were found; the clear commits after `CLEAR_RESOLVE_MS`
    pub clearing: bool,
}

/// One run of the game plus the profile it plays against
#[derive(Debug, Clone)]
pub struct GameSession<R: Rng = SimpleRng> {
    config: SessionConfig,
    rng: R,
    profile: Profile,
    board: Board,
    queue: PieceQueue,
    score: u32,
    level: u32,
    rewarded_level: u32,
    lines: u32,
    streak: u32,
    stats: SessionStats,
    bomb_counter: u32,
    bailouts_left: u32,
    frenzy: Option<Frenzy>,
    market: Option<MarketEvent>,
    goal: Option<GoalTracker>,
    undo: UndoManager,
    scheduler: Scheduler,
    phase: Phase,
    paused: bool,
    game_over: Option<GameOverReason>,
    /// Set by game over and by adventure results; no further input is accepted
    finished: bool,
    events: Vec<GameEvent>,
}

impl GameSession<SimpleRng> {
    /// Start a new run seeded from `config.seed`
    pub fn new(config: SessionConfig, profile: Profile) -> Self {
        Self::with_rng(config, profile, SimpleRng::new(config.seed))
    }

    /// Continue a saved run from the random position it was saved at
    pub fn resume(config: SessionConfig, profile: Profile, state: SessionState) -> Self {
        let rng = SimpleRng::from_state(state.rng_state);
        Self::resume_with_rng(config, profile, state, rng)
    }
}

impl<R: Rng> GameSession<R> {
    fn blank(config: SessionConfig, profile: Profile, rng: R) -> Self {
        Self {
            config,
            rng,
            profile,
            board: Board::new(),
            queue: PieceQueue::new(config.policy.queue_capacity()),
            score: 0,
            level: 1,
            rewarded_level: 1,
            lines: 0,
            streak: 0,
            stats: SessionStats::default(),
            bomb_counter: BOMB_SPAWN_INTERVAL,
            bailouts_left: config.policy.starting_bailouts(),
            frenzy: None,
            market: None,
            goal: None,
            undo: UndoManager::new(),
            scheduler: Scheduler::new(),
            phase: Phase::Idle,
            paused: false,
            game_over: None,
            finished: false,
            events: Vec::new(),
        }
    }

    /// Start a new run with an explicit random source
    pub fn with_rng(config: SessionConfig, profile: Profile, rng: R) -> Self {
        let mut session = Self::blank(config, profile, rng);
        session.setup();
        session
    }

    pub fn resume_with_rng(
        config: SessionConfig,
        profile: Profile,
        state: SessionState,
        rng: R,
    ) -> Self {
        let mut session = Self::blank(config, profile, rng);
        session.board = state.board;
        session.queue.restore(&state.queue);
        session.score = state.score;
        session.level = state.level.max(1);
        session.rewarded_level = state.rewarded_level.max(session.level);
        session.lines = state.lines;
        session.streak = state.streak;
        session.bomb_counter = state.bomb_counter;
        session.bailouts_left = state.bailouts_left;
        session.stats = state.stats;
        session.goal = match (config.mode, state.goal) {
            (GameMode::Adventure, Some(goal)) => Some(goal),
            (GameMode::Adventure, None) => {
                Some(GoalTracker::new(adventure_level(config.adventure_level)))
            }
            _ => None,
        };
        if session.queue.is_exhausted() {
            session.refill_queue();
        }
        log::debug!(
            "resumed {} run at score {}",
            config.mode.as_str(),
            session.score
        );
        session
    }

    fn setup(&mut self) {
        self.profile.stats.games_played += 1;
        match self.config.mode {
            GameMode::Adventure => {
                let level = adventure_level(self.config.adventure_level);
                self.level = level.starting_level();
                self.rewarded_level = self.level;
                for o in level.obstacles {
                    self.board
                        .set(o.x as i8, o.y as i8, Some(Cell::new(o.color(), o.kind)));
                }
                self.goal = Some(GoalTracker::new(level));
                log::info!("adventure level {}: {}", level.id, level.description());
            }
            GameMode::Bomb => self.bomb_counter = BOMB_MODE_FIRST_SPAWN,
            GameMode::Classic | GameMode::Zen => {}
        }
        self.refill_queue();
    }

    /// Throw the run away and start over with the same config
    pub fn restart(&mut self) {
        let config = self.config;
        self.board.clear();
        self.queue = PieceQueue::new(config.policy.queue_capacity());
        self.score = 0;
        self.level = 1;
        self.rewarded_level = 1;
        self.lines = 0;
        self.streak = 0;
        self.stats = SessionStats::default();
        self.bomb_counter = BOMB_SPAWN_INTERVAL;
        self.bailouts_left = config.policy.starting_bailouts();
        self.frenzy = None;
        self.market = None;
        self.goal = None;
        self.undo.clear();
        self.scheduler.clear();
        self.phase = Phase::Idle;
        self.paused = false;
        self.game_over = None;
        self.finished = false;
        self.setup();
    }

    // === Accessors ===

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn policy(&self) -> Policy {
        self.config.policy
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for scripted setups
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    /// Direct queue access for scripted setups
    pub fn queue_mut(&mut self) -> &mut PieceQueue {
        &mut self.queue
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn bomb_counter(&self) -> u32 {
        self.bomb_counter
    }

    pub fn bailouts_left(&self) -> u32 {
        self.bailouts_left
    }

    pub fn frenzy(&self) -> Option<Frenzy> {
        self.frenzy
    }

    pub fn market_event(&self) -> Option<MarketEvent> {
        self.market
    }

    pub fn goal(&self) -> Option<&GoalTracker> {
        self.goal.as_ref()
    }

    /// Replace the adventure goal (scripted scenarios)
    pub fn set_goal(&mut self, tracker: GoalTracker) {
        self.goal = Some(tracker);
    }

    pub fn league(&self) -> League {
        League::for_score(self.score)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_resolving(&self) -> bool {
        self.phase.is_resolving()
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> Option<GameOverReason> {
        self.game_over
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Accepting placements right now
    pub fn playable(&self) -> bool {
        !self.finished && !self.paused && !self.phase.is_resolving()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.has_snapshot()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Finished runs and zen runs are not resumed
    pub fn is_saveable(&self) -> bool {
        !self.finished && self.config.mode != GameMode::Zen
    }

    /// Events emitted since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn can_place(&self, piece: &Piece, x: i8, y: i8) -> bool {
        self.board.can_place(piece, x, y)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.board = self.board.rows();
        out.queue = self.queue.descriptors();
        out.mode = self.config.mode;
        out.policy = self.config.policy;
        out.score = self.score;
        out.high_score = self.profile.high_score(self.config.mode);
        out.level = self.level;
        out.lines = self.lines;
        out.streak = self.streak;
        out.league = self.league();
        out.coins = self.profile.coins;
        out.inventory = self.profile.inventory;
        out.goal = self.goal;
        out.frenzy = self.frenzy;
        out.market = self.market;
        out.bailouts_left = self.bailouts_left;
        out.resolving = self.phase.is_resolving();
        out.clearing_rows.clear();
        out.clearing_cols.clear();
        if let Phase::Resolving(lines) = &self.phase {
            out.clearing_rows = lines.rows.clone();
            out.clearing_cols = lines.cols.clone();
        }
        out.paused = self.paused;
        out.game_over = self.game_over;
        out.finished = self.finished;
        out.can_undo = self.undo.has_snapshot();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot {
            board: self.board.rows(),
            queue: QueueDescriptors::new(),
            mode: self.config.mode,
            policy: self.config.policy,
            score: 0,
            high_score: 0,
            level: 1,
            lines: 0,
            streak: 0,
            league: League::Bronze,
            coins: 0,
            inventory: Inventory::default(),
            goal: None,
            frenzy: None,
            market: None,
            bailouts_left: 0,
            resolving: false,
            clearing_rows: Default::default(),
            clearing_cols: Default::default(),
            paused: false,
            game_over: None,
            finished: false,
            can_undo: false,
        };
        self.snapshot_into(&mut s);
        s
    }

    // === Actions ===

    fn ensure_ready(&self) -> Result<(), ActionError> {
        if self.finished || self.paused {
            return Err(ActionError::NotPlayable);
        }
        if self.phase.is_resolving() {
            return Err(ActionError::Busy);
        }
        Ok(())
    }

    /// Place the piece in queue slot `index` with its origin at (x, y)
    pub fn place_piece(&mut self, index: usize, x: i8, y: i8) -> Result<PlaceOutcome, ActionError> {
        self.ensure_ready()?;
        let piece = self.queue.get(index).copied().ok_or(ActionError::EmptySlot)?;
        if !self.board.can_place(&piece, x, y) {
            self.events.push(GameEvent::InvalidPlacement);
            return Err(ActionError::InvalidPlacement);
        }

        self.save_undo_state();
        self.queue.take(index);
        self.frenzy = self.frenzy.and_then(Frenzy::step);
        self.grow_inflation();

        let cells = self.board.place(&piece, x, y);
        let points = self.add_score(placement_points(cells as u32, self.level));
        self.stats.blocks += 1;
        self.stats.cells += cells as u32;
        self.profile.stats.blocks_placed += 1;
        if let Some(goal) = self.goal.as_mut() {
            goal.on_placement();
        }
        self.events.push(GameEvent::PiecePlaced {
            x: x as u8,
            y: y as u8,
            cells,
        });
        self.roll_market_event();

        if let Some(lines) = clear::detect(&self.board) {
            self.streak += 1;
            self.events.push(GameEvent::ClearStarted {
                lines: lines.count() as u8,
            });
            log::debug!(
                "resolving rows {:?} cols {:?}",
                lines.rows.as_slice(),
                lines.cols.as_slice()
            );
            self.phase = Phase::Resolving(lines);
            self.scheduler.schedule(CLEAR_RESOLVE_MS, Step::CommitClear);
            return Ok(PlaceOutcome {
                cells,
                points,
                clearing: true,
            });
        }

        if self.market != Some(MarketEvent::TaxHaven) {
            self.streak = 0;
        }
        if self.config.mode == GameMode::Bomb {
            let exploded = self.tick_bombs();
            self.advance_bomb_counter();
            if exploded {
                self.end_game(GameOverReason::BombExploded);
                return Ok(PlaceOutcome {
                    cells,
                    points,
                    clearing: false,
                });
            }
        }
        self.settle();
        Ok(PlaceOutcome {
            cells,
            points,
            clearing: false,
        })
    }

    /// Advance the clock and run every step that came due; paused sessions stand still
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.paused {
            return;
        }
        self.scheduler.advance(elapsed_ms);
        while let Some(step) = self.scheduler.pop_due() {
            if self.finished {
                log::debug!("dropping {:?} after the run ended", step);
                continue;
            }
            match step {
                Step::CommitClear => self.commit_clear(),
                Step::ZenRefresh => self.zen_refresh(),
                Step::MarketEnd(event) => self.end_market_event(event),
            }
        }
    }

    /// Run the clock until nothing is pending (headless play and tests)
    pub fn settle_pending(&mut self) {
        while let Some(ms) = [Step::CommitClear, Step::ZenRefresh]
            .iter()
            .filter_map(|s| self.scheduler.remaining_ms(*s))
            .min()
        {
            if self.paused || self.finished {
                break;
            }
            self.tick(ms.max(1) as u32);
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Restore the state saved before the last placement or reroll
    pub fn perform_undo(&mut self) -> Result<bool, ActionError> {
        self.ensure_ready()?;
        if !self.undo.has_snapshot() {
            return Err(ActionError::NothingToUndo);
        }
        if self.profile.inventory.undo == 0 {
            return Err(ActionError::NoUndoCharges);
        }
        let Some(snap) = self.undo.take() else {
            return Err(ActionError::NothingToUndo);
        };

        self.board = snap.board;
        self.score = snap.score;
        self.queue.restore(&snap.queue);
        self.lines = snap.lines;
        self.streak = snap.streak;
        self.level = snap.level;
        self.bomb_counter = snap.bomb_counter;
        self.bailouts_left = snap.bailouts_left;
        self.stats = snap.stats;
        self.goal = snap.goal;
        self.frenzy = snap.frenzy;

        let insurance = self.profile.upgrades.insurance as u32;
        let refunded = insurance > 0 && self.rng.gen_range(0..100) < insurance * 10;
        if !refunded {
            self.profile.inventory.undo -= 1;
        }
        self.events.push(GameEvent::UndoPerformed { refunded });
        self.events.push(GameEvent::Settled);
        Ok(refunded)
    }

    /// Replace the whole queue with fresh pieces
    pub fn perform_reroll(&mut self) -> Result<(), ActionError> {
        self.ensure_ready()?;
        if self.profile.inventory.reroll == 0 {
            return Err(ActionError::NoRerollCharges);
        }
        self.save_undo_state();
        self.profile.inventory.reroll -= 1;
        self.queue
            .reroll(&mut self.rng, self.level, &self.profile.upgrades);
        self.events.push(GameEvent::Rerolled);
        self.settle();
        Ok(())
    }

    /// Smash one occupied cell; no line detection follows
    pub fn use_hammer(&mut self, x: i8, y: i8) -> Result<(), ActionError> {
        self.ensure_ready()?;
        if self.profile.inventory.hammer == 0 {
            return Err(ActionError::NoHammers);
        }
        if !self.board.is_occupied(x, y) {
            return Err(ActionError::EmptyTarget);
        }
        self.board.set(x, y, None);
        self.profile.inventory.hammer -= 1;
        self.profile.stats.hammers_used += 1;
        self.stats.tools_used += 1;
        self.events.push(GameEvent::ToolUsed(Item::Hammer));
        self.settle();
        Ok(())
    }

    /// Blow up the 3x3 area around (x, y); returns the cells removed
    pub fn use_bomb(&mut self, x: i8, y: i8) -> Result<u8, ActionError> {
        self.ensure_ready()?;
        if self.profile.inventory.bomb == 0 {
            return Err(ActionError::NoBombs);
        }
        if self.board.is_out_of_bounds(x, y) {
            return Err(ActionError::EmptyTarget);
        }
        let removed = self.board.clear_area(x, y, 1);
        self.profile.inventory.bomb -= 1;
        self.profile.stats.bombs_used += 1;
        self.stats.tools_used += 1;
        self.events.push(GameEvent::ToolUsed(Item::Bomb));
        self.settle();
        Ok(removed)
    }

    pub fn buy_item(&mut self, item: Item, price: u32) -> Result<u32, ActionError> {
        self.profile.buy_item(item, price)
    }

    pub fn buy_upgrade(&mut self, upgrade: Upgrade) -> Result<u8, ActionError> {
        self.profile.buy_upgrade(upgrade)
    }

    /// Start (or restart) a timed market event
    pub fn start_market_event(&mut self, event: MarketEvent) {
        if let Some(active) = self.market {
            self.scheduler.cancel(Step::MarketEnd(active));
        }
        self.market = Some(event);
        self.scheduler
            .schedule(event.duration_ms(), Step::MarketEnd(event));
        log::debug!("market event {} started", event.as_str());
        self.events.push(GameEvent::MarketEventStarted(event));
    }

    /// Put the final score on the leaderboard; returns the rank if it made it
    pub fn submit_score(&mut self, name: &str) -> Option<usize> {
        if self.game_over.is_none() {
            return None;
        }
        let name = match name.trim() {
            "" => "AAA".to_string(),
            n => n.to_uppercase(),
        };
        self.profile.leaderboard.submit(LeaderboardEntry {
            name,
            score: self.score,
            mode: self.config.mode,
        })
    }

    // === Internals ===

    fn save_undo_state(&mut self) {
        self.undo.save(UndoSnapshot {
            board: self.board,
            score: self.score,
            queue: self.queue.descriptors(),
            lines: self.lines,
            streak: self.streak,
            level: self.level,
            bomb_counter: self.bomb_counter,
            bailouts_left: self.bailouts_left,
            stats: self.stats,
            goal: self.goal,
            frenzy: self.frenzy,
        });
    }

    fn refill_queue(&mut self) {
        self.queue
            .fill(&mut self.rng, self.level, &self.profile.upgrades);
    }

    /// Apply global multipliers, add to the score and track the high score
    fn add_score(&mut self, points: u32) -> u32 {
        let mut factor = self.config.speed.score_multiplier();
        if self.config.policy == Policy::Aggressive {
            factor *= 2.0;
        }
        if self.market == Some(MarketEvent::BullMarket) {
            factor *= 2.0;
        }
        if let Some(frenzy) = self.frenzy {
            factor *= frenzy.factor();
        }
        let gained = (points as f64 * factor).floor() as u32;
        self.score += gained;
        self.profile.record_score(self.config.mode, self.score);
        gained
    }

    fn grow_inflation(&mut self) {
        for (_, _, cell) in self.board.filled_mut() {
            if let CellKind::Inflation { timer } = &mut cell.kind {
                *timer = (*timer + 1).min(INFLATION_TIMER_CAP);
            }
        }
    }

    fn roll_market_event(&mut self) {
        if self.market.is_some() || self.level < MARKET_EVENT_MIN_LEVEL {
            return;
        }
        if self.rng.gen_range(0..100) < MARKET_EVENT_CHANCE_PERCENT {
            let event = if self.rng.gen_bool(0.5) {
                MarketEvent::BullMarket
            } else {
                MarketEvent::TaxHaven
            };
            self.start_market_event(event);
        }
    }

    fn end_market_event(&mut self, event: MarketEvent) {
        if self.market == Some(event) {
            self.market = None;
            log::debug!("market event {} ended", event.as_str());
            self.events.push(GameEvent::MarketEventEnded(event));
        }
    }

    fn commit_clear(&mut self) {
        let lines = match std::mem::take(&mut self.phase) {
            Phase::Resolving(lines) => lines,
            Phase::Idle => return,
        };
        self.resolve_lines(&lines);
    }

    fn resolve_lines(&mut self, lines: &ClearLines) {
        let count = lines.count();
        let res = clear::resolve(&mut self.board, lines, &mut self.rng);

        let points = line_clear_points(count, self.level, self.streak, self.profile.upgrades.combo);
        let awarded = self.add_score(points);

        let mut coins = coin_reward(count, self.streak) + res.gold * GOLD_CELL_COINS + res.bonus_coins;
        if self.config.policy == Policy::LeanStartup {
            coins *= 2;
        }
        self.profile.coins += coins;

        self.lines += count;
        self.stats.gems += res.gems;
        self.profile.stats.lines_cleared += count;

        if res.chains_unlinked > 0 {
            self.events.push(GameEvent::ChainsUnlinked {
                count: res.chains_unlinked as u8,
            });
        }
        if let Some(kind) = res.frenzy {
            self.frenzy = Some(Frenzy::rearm(self.frenzy, kind));
            self.events.push(GameEvent::FrenzyArmed(kind));
        }

        self.check_level_up();
        if let Some(goal) = self.goal.as_mut() {
            goal.on_lines(count);
        }
        self.events.push(GameEvent::ClearCommitted {
            lines: count as u8,
            points: awarded,
            coins,
        });

        if self.config.mode == GameMode::Bomb && self.tick_bombs() {
            self.end_game(GameOverReason::BombExploded);
            return;
        }
        self.settle();
    }

    fn check_level_up(&mut self) {
        let target = calculate_level(self.lines);
        while self.level < target {
            self.level += 1;
            // Undo rolls the level back; rewards are paid once per level
            if self.level > self.rewarded_level {
                self.rewarded_level = self.level;
                let coins = level_reward(self.level).apply(&mut self.profile.inventory);
                self.profile.coins += coins;
            }
            log::info!("level up: {}", self.level);
            self.events.push(GameEvent::LevelUp { level: self.level });
        }
    }

    /// Count every bomb down by one; true if one went off
    fn tick_bombs(&mut self) -> bool {
        let mut exploded = false;
        for (_, _, cell) in self.board.filled_mut() {
            if let CellKind::Bomb { countdown } = &mut cell.kind {
                *countdown = countdown.saturating_sub(1);
                if *countdown < 0 {
                    exploded = true;
                }
            }
        }
        exploded
    }

    fn advance_bomb_counter(&mut self) {
        self.bomb_counter = self.bomb_counter.saturating_sub(1);
        if self.bomb_counter > 0 {
            return;
        }
        let empty = self.board.empty_slots();
        if !empty.is_empty() {
            let (x, y) = empty[self.rng.gen_range(0..empty.len())];
            let bomb = Cell::new(
                Color::BOMB,
                CellKind::Bomb {
                    countdown: BOMB_COUNTDOWN,
                },
            );
            self.board.set(x as i8, y as i8, Some(bomb));
            log::debug!("bomb spawned at ({}, {})", x, y);
            self.events.push(GameEvent::BombSpawned { x, y });
        }
        self.bomb_counter = BOMB_SPAWN_INTERVAL;
    }

    /// Post-action checks: goal, no-moves, achievements
    fn settle(&mut self) {
        if self.finished {
            return;
        }

        let counters = GoalCounters {
            lines: self.lines,
            score: self.score,
            blocks: self.stats.blocks,
            gems: self.stats.gems,
        };
        if let Some(status) = self.goal.as_mut().and_then(|g| g.evaluate(&counters)) {
            self.finish_level(status);
        } else {
            self.check_no_moves();
        }

        for id in self.profile.check_achievements() {
            self.events.push(GameEvent::AchievementUnlocked { id });
        }
        self.events.push(GameEvent::Settled);
    }

    fn finish_level(&mut self, status: GoalStatus) {
        let level_id = self.goal.map_or(0, |g| g.level_id);
        self.finished = true;
        self.scheduler.clear();
        match status {
            GoalStatus::Cleared => {
                if self.profile.adventure_max_level == level_id {
                    self.profile.adventure_max_level += 1;
                }
                log::info!("adventure level {} cleared", level_id);
                self.events.push(GameEvent::LevelCleared { level_id });
            }
            GoalStatus::Failed => {
                log::info!("adventure level {} failed", level_id);
                self.events.push(GameEvent::LevelFailed { level_id });
            }
            GoalStatus::InProgress => {}
        }
    }

    fn check_no_moves(&mut self) {
        if self.queue.is_exhausted() {
            self.refill_queue();
        }
        if self.queue.any_fits(&self.board) {
            return;
        }

        if self.config.mode == GameMode::Zen {
            if !self.scheduler.is_pending(Step::ZenRefresh) {
                self.scheduler.schedule(ZEN_REFRESH_MS, Step::ZenRefresh);
            }
            return;
        }
        if self.bailouts_left > 0 {
            self.bailouts_left -= 1;
            self.board.clear();
            self.queue
                .reroll(&mut self.rng, self.level, &self.profile.upgrades);
            log::info!("bailout used, {} left", self.bailouts_left);
            self.events.push(GameEvent::Bailout {
                left: self.bailouts_left,
            });
            return;
        }
        self.end_game(GameOverReason::NoMoves);
    }

    fn zen_refresh(&mut self) {
        self.board.clear();
        self.queue
            .reroll(&mut self.rng, self.level, &self.profile.upgrades);
        self.events.push(GameEvent::ZenRefresh);
        self.events.push(GameEvent::Settled);
    }

    fn end_game(&mut self, reason: GameOverReason) {
        self.finished = true;
        self.game_over = Some(reason);
        self.scheduler.clear();
        self.profile.record_score(self.config.mode, self.score);
        let leaderboard_eligible = self.profile.leaderboard.is_eligible(self.score);
        log::info!("game over ({}): score {}", reason.message(), self.score);
        self.events.push(GameEvent::GameOver {
            reason,
            score: self.score,
            leaderboard_eligible,
        });
    }
}

impl<R: Rng + RngPosition> GameSession<R> {
    /// Everything a save needs to resume this run
    pub fn state(&self) -> SessionState {
        SessionState {
            board: self.board,
            queue: self.queue.descriptors(),
            score: self.score,
            level: self.level,
            lines: self.lines,
            streak: self.streak,
            bomb_counter: self.bomb_counter,
            bailouts_left: self.bailouts_left,
            goal: self.goal,
            stats: self.stats,
            rewarded_level: self.rewarded_level,
            rng_state: self.rng.position(),
        }
    }
}

impl Default for GameSession<SimpleRng> {
    fn default() -> Self {
        Self::new(SessionConfig::default(), Profile::default())
    }
}
