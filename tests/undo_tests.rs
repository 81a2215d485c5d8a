//! Undo tests - single-slot snapshots, charges and insurance refunds

use block_riser::core::{ActionError, GameSession, Piece, Profile, SessionConfig};
use block_riser::types::{Cell, CellKind, Color, GameEvent, GameMode, Policy, CLEAR_RESOLVE_MS};

fn filled() -> Option<Cell> {
    Some(Cell::new(Color(0x777777), CellKind::Normal))
}

fn session_with(config: SessionConfig, profile: Profile) -> GameSession {
    let mut game = GameSession::new(config, profile);
    game.drain_events();
    game
}

fn session() -> GameSession {
    session_with(SessionConfig::default(), Profile::default())
}

fn script(game: &mut GameSession, names: &[&str]) {
    let pieces: Vec<Option<Piece>> = names
        .iter()
        .map(|n| Some(Piece::named(n, Color(0x654321))))
        .collect();
    game.queue_mut().set_slots(&pieces);
}

#[test]
fn test_undo_restores_state_exactly() {
    let mut game = session();
    game.board_mut().set(0, 7, filled());
    let before = game.state();

    game.place_piece(1, 3, 0).unwrap();
    assert_ne!(game.state(), before);

    assert_eq!(game.perform_undo(), Ok(false));
    assert_eq!(game.state(), before);
    assert_eq!(game.profile().inventory.undo, 0);
    assert!(game
        .drain_events()
        .contains(&GameEvent::UndoPerformed { refunded: false }));
}

#[test]
fn test_undo_rolls_back_a_committed_clear() {
    let mut game = session();
    for x in 1..8 {
        game.board_mut().set(x, 0, filled());
    }
    script(&mut game, &["1x1", "2x1", "1x1"]);
    let before = game.state();

    game.place_piece(0, 0, 0).unwrap();
    game.tick(CLEAR_RESOLVE_MS);
    assert_eq!(game.lines(), 1);

    game.perform_undo().unwrap();
    assert_eq!(game.state(), before);
    assert_eq!(game.lines(), 0);
    assert_eq!(game.streak(), 0);
    assert!(game.board().is_occupied(7, 0));
    // Coins already paid out stay in the wallet
    assert_eq!(game.profile().coins, 5);
}

#[test]
fn test_undo_is_one_level_deep() {
    let mut profile = Profile::default();
    profile.inventory.undo = 5;
    let mut game = session_with(SessionConfig::default(), profile);
    script(&mut game, &["1x1", "1x1", "1x1"]);

    game.place_piece(0, 0, 0).unwrap();
    let middle = game.state();
    game.place_piece(1, 2, 2).unwrap();

    game.perform_undo().unwrap();
    assert_eq!(game.state(), middle);
    assert_eq!(game.perform_undo(), Err(ActionError::NothingToUndo));
    assert_eq!(game.profile().inventory.undo, 4);
}

#[test]
fn test_undo_needs_a_charge() {
    let mut profile = Profile::default();
    profile.inventory.undo = 0;
    let mut game = session_with(SessionConfig::default(), profile);
    assert_eq!(game.perform_undo(), Err(ActionError::NothingToUndo));

    script(&mut game, &["1x1", "1x1", "1x1"]);
    game.place_piece(0, 0, 0).unwrap();
    assert_eq!(game.perform_undo(), Err(ActionError::NoUndoCharges));
    assert_eq!(ActionError::NoUndoCharges.code(), "exhausted");
    // The snapshot survives the rejection
    assert!(game.can_undo());
}

#[test]
fn test_undo_rejected_while_resolving() {
    let mut game = session();
    for x in 1..8 {
        game.board_mut().set(x, 3, filled());
    }
    script(&mut game, &["1x1", "1x1", "1x1"]);
    game.place_piece(0, 0, 3).unwrap();
    assert_eq!(game.perform_undo(), Err(ActionError::Busy));
    game.tick(CLEAR_RESOLVE_MS);
    assert!(game.perform_undo().is_ok());
}

#[test]
fn test_insurance_sometimes_refunds() {
    let mut refunds = 0;
    let mut charged = 0;
    for seed in 1..=40 {
        let mut profile = Profile::default();
        profile.upgrades.insurance = 5;
        let config = SessionConfig {
            seed,
            ..SessionConfig::default()
        };
        let mut game = session_with(config, profile);
        script(&mut game, &["1x1", "1x1", "1x1"]);
        game.place_piece(0, 0, 0).unwrap();

        if game.perform_undo().unwrap() {
            refunds += 1;
            assert_eq!(game.profile().inventory.undo, 1);
        } else {
            charged += 1;
            assert_eq!(game.profile().inventory.undo, 0);
        }
    }
    assert!(refunds > 0, "insurance never refunded");
    assert!(charged > 0, "insurance always refunded");
}

#[test]
fn test_undo_restores_adventure_moves() {
    let config = SessionConfig {
        mode: GameMode::Adventure,
        adventure_level: 2,
        ..SessionConfig::default()
    };
    let mut game = session_with(config, Profile::default());
    let moves = game.goal().map(|g| g.moves_left);
    script(&mut game, &["1x1", "1x1", "1x1"]);

    game.place_piece(0, 0, 0).unwrap();
    assert_eq!(game.goal().map(|g| g.moves_left), moves.map(|m| m - 1));
    game.perform_undo().unwrap();
    assert_eq!(game.goal().map(|g| g.moves_left), moves);
}

#[test]
fn test_undo_does_not_repay_level_rewards() {
    let mut profile = Profile::default();
    profile.inventory.undo = 5;
    let fresh = session_with(SessionConfig::default(), profile);
    let mut state = fresh.state();
    state.lines = 9;
    let mut game = GameSession::resume(*fresh.config(), fresh.profile().clone(), state);
    for x in 1..8 {
        game.board_mut().set(x, 0, filled());
    }
    script(&mut game, &["1x1", "1x1", "1x1"]);
    let hammers = game.profile().inventory.hammer;
    let rerolls = game.profile().inventory.reroll;

    for _ in 0..3 {
        game.place_piece(0, 0, 0).unwrap();
        game.tick(CLEAR_RESOLVE_MS);
        assert_eq!(game.level(), 2);
        game.perform_undo().unwrap();
        assert_eq!(game.level(), 1);
        assert_eq!(game.lines(), 9);
    }
    assert_eq!(game.profile().inventory.hammer, hammers + 1);
    assert_eq!(game.profile().inventory.reroll, rerolls + 1);
    assert_eq!(game.profile().inventory.undo, 2);
}

#[test]
fn test_undo_restores_a_spent_bailout() {
    let config = SessionConfig {
        policy: Policy::TaxHaven,
        ..SessionConfig::default()
    };
    let mut game = session_with(config, Profile::default());
    // Checkerboard with one hole: the single fills it and nothing else fits
    for y in 0..8 {
        for x in 0..8 {
            if (x + y) % 2 == 0 {
                game.board_mut().set(x, y, filled());
            }
        }
    }
    game.board_mut().set(7, 7, None);
    game.board_mut().set(6, 7, filled());
    script(&mut game, &["1x1", "2x2", "2x2"]);
    let board = *game.board();
    let queue = game.queue().descriptors();

    game.place_piece(0, 7, 7).unwrap();
    assert_eq!(game.bailouts_left(), 1);
    assert!(game.board().is_empty());

    game.perform_undo().unwrap();
    assert_eq!(game.bailouts_left(), 2);
    assert_eq!(*game.board(), board);
    assert_eq!(game.queue().descriptors(), queue);
    assert!(!game.is_finished());
}
