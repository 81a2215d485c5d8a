//! Piece factory - builds queue pieces from the shape catalog
//!
//! A shape is drawn uniformly, then at most one special kind is rolled. Kinds
//! are tried in a fixed priority order; the first roll that succeeds wins.

use rand::Rng;

use crate::pieces::{palette_for_level, Piece, ShapeId, PALETTE_DRAW, SHAPES};
use crate::types::{MultiplierKind, PieceKind, Upgrades};

/// Base gold chance before magnet upgrades
pub const GOLD_BASE_CHANCE: f64 = 0.02;

/// Gold chance added per magnet level
pub const GOLD_CHANCE_PER_MAGNET: f64 = 0.08;

/// A level-gated special kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindRoll {
    pub kind: PieceKind,
    pub min_level: u32,
    pub chance: f64,
}

/// Level-gated kinds in priority order (gold is rolled before all of these)
///
/// A multiplier entry rolls its shape (square or cross) separately.
pub const KIND_ROLLS: [KindRoll; 5] = [
    KindRoll {
        kind: PieceKind::Metal,
        min_level: 3,
        chance: 0.05,
    },
    KindRoll {
        kind: PieceKind::Multiplier(MultiplierKind::Square),
        min_level: 4,
        chance: 0.04,
    },
    KindRoll {
        kind: PieceKind::Inflation,
        min_level: 5,
        chance: 0.04,
    },
    KindRoll {
        kind: PieceKind::Liquid,
        min_level: 6,
        chance: 0.03,
    },
    KindRoll {
        kind: PieceKind::Crypto,
        min_level: 8,
        chance: 0.03,
    },
];

/// Gold chance for a magnet level, capped at certainty
pub fn gold_chance(magnet: u8) -> f64 {
    (GOLD_BASE_CHANCE + GOLD_CHANCE_PER_MAGNET * magnet as f64).min(1.0)
}

/// Roll the special kind of a new piece
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R, level: u32, upgrades: &Upgrades) -> PieceKind {
    if rng.gen_bool(gold_chance(upgrades.magnet)) {
        return PieceKind::Gold;
    }
    for roll in KIND_ROLLS.iter() {
        if level < roll.min_level {
            continue;
        }
        if rng.gen_bool(roll.chance) {
            return match roll.kind {
                PieceKind::Multiplier(_) => {
                    let shape = if rng.gen_bool(0.5) {
                        MultiplierKind::Square
                    } else {
                        MultiplierKind::Cross
                    };
                    PieceKind::Multiplier(shape)
                }
                kind => kind,
            };
        }
    }
    PieceKind::Normal
}

/// Build a fresh piece for the given level and upgrades
pub fn build_piece<R: Rng + ?Sized>(rng: &mut R, level: u32, upgrades: &Upgrades) -> Piece {
    let shape = ShapeId::from_index(rng.gen_range(0..SHAPES.len()));
    let kind = roll_kind(rng, level, upgrades);
    let palette = palette_for_level(level);
    let color = palette[rng.gen_range(0..PALETTE_DRAW)];
    Piece::new(shape, kind, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;

    #[test]
    fn test_gold_chance_scales_with_magnet() {
        assert!((gold_chance(0) - 0.02).abs() < 1e-9);
        assert!((gold_chance(1) - 0.10).abs() < 1e-9);
        assert!((gold_chance(5) - 0.42).abs() < 1e-9);
        assert_eq!(gold_chance(200), 1.0);
    }

    #[test]
    fn test_level_one_only_rolls_gold_or_normal() {
        let mut rng = SimpleRng::new(42);
        let upgrades = Upgrades::default();
        for _ in 0..2000 {
            let kind = roll_kind(&mut rng, 1, &upgrades);
            assert!(matches!(kind, PieceKind::Normal | PieceKind::Gold), "{:?}", kind);
        }
    }

    #[test]
    fn test_full_magnet_rolls_more_gold() {
        let mut rng = SimpleRng::new(9);
        let none = Upgrades::default();
        let maxed = Upgrades {
            magnet: 5,
            ..Upgrades::default()
        };
        let count = |rng: &mut SimpleRng, u: &Upgrades| {
            (0..2000)
                .filter(|_| roll_kind(rng, 1, u) == PieceKind::Gold)
                .count()
        };
        let base = count(&mut rng, &none);
        let boosted = count(&mut rng, &maxed);
        assert!(boosted > base * 4, "base={} boosted={}", base, boosted);
    }

    #[test]
    fn test_high_levels_unlock_specials() {
        let mut rng = SimpleRng::new(5);
        let upgrades = Upgrades::default();
        let kinds: Vec<_> = (0..5000).map(|_| roll_kind(&mut rng, 10, &upgrades)).collect();
        assert!(kinds.contains(&PieceKind::Metal));
        assert!(kinds.contains(&PieceKind::Crypto));
        assert!(kinds.iter().any(|k| matches!(k, PieceKind::Multiplier(_))));
    }

    #[test]
    fn test_build_piece_is_deterministic() {
        let upgrades = Upgrades::default();
        let a = build_piece(&mut SimpleRng::new(77), 2, &upgrades);
        let b = build_piece(&mut SimpleRng::new(77), 2, &upgrades);
        assert_eq!(a, b);
        assert!(palette_for_level(2).contains(&a.color));
    }
}
