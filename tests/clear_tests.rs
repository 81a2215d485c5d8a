//! Line-clear tests - detection, special cells and the payouts they trigger

use block_riser::core::clear::{detect, resolve};
use block_riser::core::{Board, GameSession, Piece, Profile, SessionConfig, SimpleRng};
use block_riser::types::{Cell, CellKind, Color, GameEvent, MultiplierKind, Policy, CLEAR_RESOLVE_MS};

fn cell(kind: CellKind) -> Option<Cell> {
    Some(Cell::new(Color(0x808080), kind))
}

fn fill_row(board: &mut Board, y: i8, from: i8, kind: CellKind) {
    for x in from..8 {
        board.set(x, y, cell(kind));
    }
}

fn session(policy: Policy) -> GameSession {
    let config = SessionConfig {
        policy,
        ..SessionConfig::default()
    };
    let mut game = GameSession::new(config, Profile::default());
    let singles = [Some(Piece::named("1x1", Color(0xFF3366))); 3];
    game.queue_mut().set_slots(&singles);
    game.drain_events();
    game
}

#[test]
fn test_metal_takes_two_clears() {
    let mut board = Board::new();
    fill_row(&mut board, 0, 0, CellKind::Metal { durability: 2 });
    let mut rng = SimpleRng::new(7);

    let lines = detect(&board).unwrap();
    let first = resolve(&mut board, &lines, &mut rng);
    assert_eq!((first.cleared, first.damaged), (0, 8));
    assert_eq!(
        board.get(3, 0).flatten().map(|c| c.kind),
        Some(CellKind::Metal { durability: 1 })
    );

    let lines = detect(&board).unwrap();
    let second = resolve(&mut board, &lines, &mut rng);
    assert_eq!((second.cleared, second.damaged), (8, 0));
    assert!(board.is_empty());
}

#[test]
fn test_chain_hit_unlinks_every_chain() {
    let mut board = Board::new();
    fill_row(&mut board, 0, 1, CellKind::Normal);
    board.set(0, 0, cell(CellKind::Chain { linked: true }));
    board.set(5, 5, cell(CellKind::Chain { linked: true }));

    let lines = detect(&board).unwrap();
    let res = resolve(&mut board, &lines, &mut SimpleRng::new(1));
    assert_eq!(res.cleared, 7);
    assert_eq!(res.chains_unlinked, 2);
    assert_eq!(
        board.get(0, 0).flatten().map(|c| c.kind),
        Some(CellKind::Chain { linked: false })
    );
    assert_eq!(
        board.get(5, 5).flatten().map(|c| c.kind),
        Some(CellKind::Chain { linked: false })
    );

    // Unlinked chains clear like anything else
    fill_row(&mut board, 0, 1, CellKind::Normal);
    let lines = detect(&board).unwrap();
    let res = resolve(&mut board, &lines, &mut SimpleRng::new(1));
    assert_eq!(res.cleared, 8);
    assert_eq!(res.chains_unlinked, 0);
}

#[test]
fn test_cross_clear_counts_both_lines() {
    let mut board = Board::new();
    for i in 0..8 {
        board.set(i, 4, cell(CellKind::Normal));
        board.set(2, i, cell(CellKind::Gem));
    }
    let lines = detect(&board).unwrap();
    assert_eq!(lines.count(), 2);
    assert_eq!(lines.affected().count(), 15);

    let res = resolve(&mut board, &lines, &mut SimpleRng::new(3));
    assert_eq!(res.cleared, 15);
    assert_eq!(res.gems, 8);
    assert!(board.is_empty());
}

#[test]
fn test_crypto_payout_is_bounded() {
    for seed in 1..50 {
        let mut board = Board::new();
        fill_row(&mut board, 6, 0, CellKind::Crypto);
        let lines = detect(&board).unwrap();
        let res = resolve(&mut board, &lines, &mut SimpleRng::new(seed));
        assert!(res.bonus_coins <= 8 * 25);
    }
}

#[test]
fn test_gold_row_pays_coins() {
    let mut game = session(Policy::None);
    fill_row(game.board_mut(), 0, 1, CellKind::Gold);

    game.place_piece(0, 0, 0).unwrap();
    game.tick(CLEAR_RESOLVE_MS);

    // 5 for the line, 10 per gold cell
    assert_eq!(game.profile().coins, 5 + 7 * 10);
    assert_eq!(game.score(), 110);
}

#[test]
fn test_lean_startup_doubles_coins() {
    let mut game = session(Policy::LeanStartup);
    assert_eq!(game.queue().capacity(), 1);
    game.queue_mut()
        .set_slots(&[Some(Piece::named("1x1", Color(0xFF3366)))]);
    fill_row(game.board_mut(), 2, 1, CellKind::Normal);

    game.place_piece(0, 0, 2).unwrap();
    game.tick(CLEAR_RESOLVE_MS);
    assert_eq!(game.profile().coins, 10);
}

#[test]
fn test_inflation_grows_before_it_pays() {
    let mut game = session(Policy::None);
    fill_row(game.board_mut(), 0, 1, CellKind::Normal);
    game.board_mut().set(7, 0, cell(CellKind::Inflation { timer: 5 }));

    game.place_piece(0, 0, 0).unwrap();
    game.tick(CLEAR_RESOLVE_MS);
    assert_eq!(game.profile().coins, 5 + 6);
}

#[test]
fn test_multiplier_arms_frenzy_for_later_placements() {
    let mut game = session(Policy::None);
    fill_row(game.board_mut(), 0, 1, CellKind::Multiplier(MultiplierKind::Square));

    game.place_piece(0, 0, 0).unwrap();
    game.tick(CLEAR_RESOLVE_MS);
    assert_eq!(game.score(), 110);
    assert_eq!(game.frenzy().map(|f| f.kind), Some(MultiplierKind::Square));
    assert!(game
        .drain_events()
        .contains(&GameEvent::FrenzyArmed(MultiplierKind::Square)));

    game.place_piece(1, 0, 5).unwrap();
    assert_eq!(game.score(), 130);
}
