//! Pieces module - shape catalog and queue pieces
//!
//! Shapes are fixed binary matrices looked up by id. Pieces are never
//! rotated after spawn: a piece is its shape, its special kind and a colour.

use crate::types::{Color, PieceKind};

/// Offset of a single cell relative to piece origin (dx = column, dy = row)
pub type CellOffset = (u8, u8);

/// A catalog shape - `map[row][col]` is 1 where the piece has a cell
#[derive(Debug, PartialEq, Eq)]
pub struct Shape {
    pub id: &'static str,
    pub map: &'static [&'static [u8]],
}

impl Shape {
    pub fn rows(&self) -> u8 {
        self.map.len() as u8
    }

    pub fn cols(&self) -> u8 {
        self.map.first().map_or(0, |row| row.len() as u8)
    }

    /// Filled cell offsets in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellOffset> + '_ {
        self.map.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &v)| v != 0)
                .map(move |(dx, _)| (dx as u8, dy as u8))
        })
    }

    pub fn cell_count(&self) -> u8 {
        self.cells().count() as u8
    }
}

/// Every shape a piece can take
pub static SHAPES: [Shape; 31] = [
    Shape { id: "1x1", map: &[&[1]] },
    Shape { id: "2x1", map: &[&[1, 1]] },
    Shape { id: "3x1", map: &[&[1, 1, 1]] },
    Shape { id: "2x2", map: &[&[1, 1], &[1, 1]] },
    Shape { id: "L1", map: &[&[1, 0], &[1, 0], &[1, 1]] },
    Shape { id: "L2", map: &[&[0, 1], &[0, 1], &[1, 1]] },
    Shape { id: "T1", map: &[&[1, 1, 1], &[0, 1, 0]] },
    Shape { id: "Z1", map: &[&[1, 1, 0], &[0, 1, 1]] },
    Shape { id: "S1", map: &[&[0, 1, 1], &[1, 1, 0]] },
    Shape { id: "3x3L", map: &[&[1, 1, 1], &[1, 0, 0], &[1, 0, 0]] },
    Shape { id: "U", map: &[&[1, 0, 1], &[1, 1, 1]] },
    Shape { id: "4x1", map: &[&[1, 1, 1, 1]] },
    Shape { id: "Plus", map: &[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]] },
    Shape { id: "BigT", map: &[&[1, 1, 1], &[0, 1, 0], &[0, 1, 0]] },
    Shape { id: "Diag3", map: &[&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]] },
    Shape { id: "H", map: &[&[1, 0, 1], &[1, 1, 1], &[1, 0, 1]] },
    Shape { id: "X5", map: &[&[1, 0, 1], &[0, 1, 0], &[1, 0, 1]] },
    Shape {
        id: "Stairs4",
        map: &[&[1, 0, 0, 0], &[0, 1, 0, 0], &[0, 0, 1, 0], &[0, 0, 0, 1]],
    },
    Shape { id: "Tank", map: &[&[0, 1, 0], &[1, 1, 1], &[1, 0, 1]] },
    Shape { id: "U_big", map: &[&[1, 0, 1], &[1, 0, 1], &[1, 1, 1]] },
    Shape { id: "T_long", map: &[&[1, 1, 1], &[0, 1, 0], &[0, 1, 0]] },
    Shape { id: "W_shape", map: &[&[1, 0, 0], &[1, 1, 0], &[0, 1, 1]] },
    Shape { id: "Glider", map: &[&[0, 1, 0], &[0, 0, 1], &[1, 1, 1]] },
    Shape { id: "J_long", map: &[&[0, 1], &[0, 1], &[1, 1]] },
    Shape { id: "L_long", map: &[&[1, 0], &[1, 0], &[1, 1]] },
    Shape { id: "Donut", map: &[&[1, 1, 1], &[1, 0, 1], &[1, 1, 1]] },
    Shape { id: "Anchor", map: &[&[1, 0, 1], &[1, 1, 1], &[0, 1, 0]] },
    Shape { id: "Bird", map: &[&[0, 1, 0], &[1, 1, 1], &[1, 0, 1]] },
    Shape { id: "C_big", map: &[&[1, 1, 1], &[1, 0, 0], &[1, 1, 1]] },
    Shape {
        id: "Tree",
        map: &[&[0, 1, 0], &[0, 1, 0], &[1, 1, 1], &[0, 1, 0]],
    },
    Shape { id: "Zigzag4", map: &[&[1, 1, 0, 0], &[0, 1, 1, 1]] },
];

/// Colour palettes, one per level band (the last one repeats)
pub static PALETTES: [&[Color]; 5] = [
    &[
        Color(0xFF3366),
        Color(0x33FF57),
        Color(0x3366FF),
        Color(0xFF33FF),
        Color(0xFFFF33),
        Color(0x33FFFF),
        Color(0xFF9933),
    ],
    &[
        Color(0xFF6B6B),
        Color(0x4ECDC4),
        Color(0x556270),
        Color(0xC7F464),
        Color(0xFFCC5C),
    ],
    &[
        Color(0xD30C7B),
        Color(0xFFE314),
        Color(0x007CBE),
        Color(0xFFFFFF),
        Color(0x000000),
    ],
    &[
        Color(0x00FF00),
        Color(0x00FF99),
        Color(0xCCFF00),
        Color(0x00CCFF),
        Color(0x9900FF),
    ],
    &[
        Color(0xFF0000),
        Color(0x00FF00),
        Color(0x0000FF),
        Color(0xFFFF00),
        Color(0x00FFFF),
        Color(0xFF00FF),
    ],
];

/// Colours drawn per palette (the smallest palette size)
pub const PALETTE_DRAW: usize = 5;

/// Palette used at `level` (1-based)
pub fn palette_for_level(level: u32) -> &'static [Color] {
    let idx = (level.max(1) as usize - 1).min(PALETTES.len() - 1);
    PALETTES[idx]
}

/// Index of a shape in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(u8);

impl ShapeId {
    /// Look up a shape by catalog id; unknown ids fall back to the first shape
    pub fn from_name(name: &str) -> Self {
        match SHAPES.iter().position(|s| s.id == name) {
            Some(idx) => ShapeId(idx as u8),
            None => {
                log::warn!("unknown shape id {:?}, using {}", name, SHAPES[0].id);
                ShapeId(0)
            }
        }
    }

    /// Catalog index; out-of-range indices fall back to the first shape
    pub fn from_index(idx: usize) -> Self {
        if idx < SHAPES.len() {
            ShapeId(idx as u8)
        } else {
            ShapeId(0)
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn shape(self) -> &'static Shape {
        SHAPES.get(self.index()).unwrap_or(&SHAPES[0])
    }

    pub fn name(self) -> &'static str {
        self.shape().id
    }
}

/// A piece waiting in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub shape: ShapeId,
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub fn new(shape: ShapeId, kind: PieceKind, color: Color) -> Self {
        Self { shape, kind, color }
    }

    /// Plain piece of the named shape (handy for scripted boards and tests)
    pub fn named(name: &str, color: Color) -> Self {
        Self::new(ShapeId::from_name(name), PieceKind::Normal, color)
    }

    pub fn shape(&self) -> &'static Shape {
        self.shape.shape()
    }

    pub fn cells(&self) -> impl Iterator<Item = CellOffset> {
        self.shape().cells()
    }

    pub fn cell_count(&self) -> u8 {
        self.shape().cell_count()
    }

    pub fn descriptor(&self) -> PieceDescriptor {
        PieceDescriptor {
            shape: self.shape,
            kind: self.kind,
            color: self.color,
            rotated: false,
        }
    }
}

/// Value copy of a queued piece, used by undo snapshots and saves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceDescriptor {
    pub shape: ShapeId,
    pub kind: PieceKind,
    pub color: Color,
    /// Legacy flag from rotatable rulesets; ignored on rebuild
    pub rotated: bool,
}

impl PieceDescriptor {
    pub fn rebuild(&self) -> Piece {
        Piece::new(self.shape, self.kind, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in SHAPES.iter().enumerate() {
            for b in SHAPES.iter().skip(i + 1) {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_catalog_maps_are_rectangular_and_fit_board() {
        for shape in SHAPES.iter() {
            let cols = shape.cols();
            assert!(shape.map.iter().all(|row| row.len() as u8 == cols), "{}", shape.id);
            assert!(shape.rows() <= 4 && cols <= 4, "{}", shape.id);
            assert!(shape.cell_count() > 0, "{}", shape.id);
        }
    }

    #[test]
    fn test_shape_cells_row_major() {
        let l1 = ShapeId::from_name("L1").shape();
        let cells: Vec<_> = l1.cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_unknown_shape_falls_back_to_first() {
        assert_eq!(ShapeId::from_name("nope").name(), "1x1");
        assert_eq!(ShapeId::from_index(999).name(), "1x1");
    }

    #[test]
    fn test_descriptor_rebuild() {
        let piece = Piece::new(ShapeId::from_name("Plus"), PieceKind::Gold, Color(0x123456));
        let rebuilt = piece.descriptor().rebuild();
        assert_eq!(rebuilt, piece);
        assert_eq!(rebuilt.cell_count(), 5);
    }

    #[test]
    fn test_palette_bands() {
        assert_eq!(palette_for_level(1), PALETTES[0]);
        assert_eq!(palette_for_level(0), PALETTES[0]);
        assert_eq!(palette_for_level(3), PALETTES[2]);
        assert_eq!(palette_for_level(40), PALETTES[4]);
        assert!(PALETTES.iter().all(|p| p.len() >= PALETTE_DRAW));
    }
}
