//! Session tests - modes, progression, timers and end-of-run handling

use block_riser::core::{ActionError, GameSession, Piece, Profile, SessionConfig};
use block_riser::types::{
    Cell, CellKind, Color, GameEvent, GameMode, GameOverReason, MarketEvent, Policy,
    BULL_MARKET_MS, CLEAR_RESOLVE_MS, ZEN_REFRESH_MS,
};

fn filled() -> Option<Cell> {
    Some(Cell::new(Color(0x777777), CellKind::Normal))
}

fn session_with(mode: GameMode, policy: Policy, profile: Profile) -> GameSession {
    let config = SessionConfig {
        mode,
        policy,
        ..SessionConfig::default()
    };
    let mut game = GameSession::new(config, profile);
    game.drain_events();
    game
}

fn session(mode: GameMode) -> GameSession {
    session_with(mode, Policy::None, Profile::default())
}

fn script(game: &mut GameSession, names: &[&str]) {
    let pieces: Vec<Option<Piece>> = names
        .iter()
        .map(|n| Some(Piece::named(n, Color(0x123456))))
        .collect();
    game.queue_mut().set_slots(&pieces);
}

/// Checkerboard with one hole at (7, 7): a single fills it, nothing 2x2 fits afterwards
fn dead_end(game: &mut GameSession) {
    for y in 0..8 {
        for x in 0..8 {
            if (x + y) % 2 == 0 {
                game.board_mut().set(x, y, filled());
            }
        }
    }
    game.board_mut().set(7, 7, None);
    game.board_mut().set(6, 7, filled());
    script(game, &["1x1", "2x2", "2x2"]);
}

#[test]
fn test_same_seed_same_queue() {
    let a = session(GameMode::Classic);
    let b = session(GameMode::Classic);
    assert_eq!(a.queue().descriptors(), b.queue().descriptors());

    let other = GameSession::new(
        SessionConfig {
            seed: 99,
            ..SessionConfig::default()
        },
        Profile::default(),
    );
    assert_eq!(other.config().seed, 99);
}

#[test]
fn test_level_up_grants_items() {
    let game = session(GameMode::Classic);
    let mut state = game.state();
    state.lines = 9;
    let mut game = GameSession::resume(*game.config(), Profile::default(), state);
    for x in 1..8 {
        game.board_mut().set(x, 0, filled());
    }
    script(&mut game, &["1x1", "1x1", "1x1"]);

    game.place_piece(0, 0, 0).unwrap();
    game.tick(CLEAR_RESOLVE_MS);

    assert_eq!(game.lines(), 10);
    assert_eq!(game.level(), 2);
    // Clear points use the level before the clear
    assert_eq!(game.score(), 110);
    assert_eq!(game.profile().inventory.hammer, 4);
    assert_eq!(game.profile().inventory.reroll, 2);
    assert!(game.drain_events().contains(&GameEvent::LevelUp { level: 2 }));
}

#[test]
fn test_streak_grows_across_consecutive_clears() {
    let mut game = session(GameMode::Classic);
    for x in 1..8 {
        game.board_mut().set(x, 0, filled());
        game.board_mut().set(x, 1, filled());
    }
    script(&mut game, &["1x1", "1x1", "1x1"]);

    game.place_piece(0, 0, 0).unwrap();
    game.tick(CLEAR_RESOLVE_MS);
    game.place_piece(1, 0, 1).unwrap();
    game.tick(CLEAR_RESOLVE_MS);

    assert_eq!(game.streak(), 2);
    // 10 + 100, then 10 + floor(100 * 1.6)
    assert_eq!(game.score(), 110 + 170);
}

#[test]
fn test_zen_refreshes_instead_of_ending() {
    let mut game = session(GameMode::Zen);
    dead_end(&mut game);
    game.place_piece(0, 7, 7).unwrap();

    assert!(!game.is_finished());
    assert!(!game.board().is_empty());
    game.tick(ZEN_REFRESH_MS - 1);
    assert!(!game.board().is_empty());
    game.tick(1);

    assert!(game.board().is_empty());
    assert!(!game.queue().is_exhausted());
    assert!(game.drain_events().contains(&GameEvent::ZenRefresh));
    assert!(!game.is_saveable());
}

#[test]
fn test_tax_haven_bailout_wipes_board() {
    let mut game = session_with(GameMode::Classic, Policy::TaxHaven, Profile::default());
    assert_eq!(game.bailouts_left(), 2);
    dead_end(&mut game);
    game.place_piece(0, 7, 7).unwrap();

    assert!(!game.is_finished());
    assert_eq!(game.bailouts_left(), 1);
    assert!(game.board().is_empty());
    assert!(game.drain_events().contains(&GameEvent::Bailout { left: 1 }));
}

#[test]
fn test_game_over_then_leaderboard() {
    let mut game = session(GameMode::Classic);
    dead_end(&mut game);
    game.place_piece(0, 7, 7).unwrap();

    assert_eq!(game.game_over(), Some(GameOverReason::NoMoves));
    assert!(!game.is_saveable());
    assert_eq!(game.perform_undo(), Err(ActionError::NotPlayable));

    assert_eq!(game.submit_score("  "), Some(0));
    let entry = &game.profile().leaderboard.entries()[0];
    assert_eq!(entry.name, "AAA");
    assert_eq!(entry.score, 10);
    assert_eq!(entry.mode, GameMode::Classic);
}

#[test]
fn test_submit_requires_finished_run() {
    let mut game = session(GameMode::Classic);
    assert_eq!(game.submit_score("ace"), None);
}

#[test]
fn test_market_event_expires_on_the_clock() {
    let mut game = session(GameMode::Classic);
    game.start_market_event(MarketEvent::BullMarket);
    assert_eq!(game.market_event(), Some(MarketEvent::BullMarket));

    game.tick(BULL_MARKET_MS - 1);
    assert_eq!(game.market_event(), Some(MarketEvent::BullMarket));
    game.tick(1);
    assert_eq!(game.market_event(), None);
    assert!(game
        .drain_events()
        .contains(&GameEvent::MarketEventEnded(MarketEvent::BullMarket)));
}

#[test]
fn test_snapshot_exposes_clearing_lines() {
    let mut game = session(GameMode::Classic);
    for x in 1..8 {
        game.board_mut().set(x, 5, filled());
    }
    script(&mut game, &["1x1", "1x1", "1x1"]);
    game.place_piece(0, 0, 5).unwrap();

    let snap = game.snapshot();
    assert!(snap.resolving);
    assert!(!snap.playable());
    assert_eq!(snap.clearing_rows.as_slice(), &[5]);
    assert!(snap.clearing_cols.is_empty());
    assert!(snap.can_undo);

    game.settle_pending();
    let snap = game.snapshot();
    assert!(snap.playable());
    assert!(snap.clearing_rows.is_empty());
}

#[test]
fn test_achievement_unlocks_on_placement() {
    let mut profile = Profile::default();
    profile.stats.blocks_placed = 49;
    let mut game = session_with(GameMode::Classic, Policy::None, profile);
    script(&mut game, &["1x1", "1x1", "1x1"]);
    game.place_piece(0, 4, 4).unwrap();

    assert!(game.profile().is_unlocked("novice"));
    assert!(game
        .drain_events()
        .contains(&GameEvent::AchievementUnlocked { id: "novice" }));
}

#[test]
fn test_high_score_tracked_per_mode() {
    let mut game = session(GameMode::Bomb);
    script(&mut game, &["2x2", "1x1", "1x1"]);
    game.place_piece(0, 0, 0).unwrap();
    assert_eq!(game.profile().high_score(GameMode::Bomb), 40);
    assert_eq!(game.profile().high_score(GameMode::Classic), 0);
}
