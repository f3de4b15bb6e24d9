//! Per-square constants computed at compile time: leaper masks, rays and
//! the square-to-square line geometry used by pin and x-ray tests.

use crate::Bitboard;
use rotchess_core::{Color, Square};

/// The eight compass directions. Diagonals come first, so `index() < 4`
/// selects bishop lines and `index() >= 4` rook lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    NorthEast = 0,
    NorthWest = 1,
    SouthEast = 2,
    SouthWest = 3,
    North = 4,
    South = 5,
    East = 6,
    West = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `(file, rank)` step.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (-1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        (self as u8) < 4
    }

    /// True when stepping this way raises the square index, so the nearest
    /// square along the ray is its lowest bit.
    #[inline]
    pub const fn is_ascending(self) -> bool {
        let (df, dr) = self.delta();
        dr > 0 || (dr == 0 && df > 0)
    }
}

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const fn leaper_masks(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut masks = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let (file, rank) = ((sq & 7) as i8, (sq >> 3) as i8);
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            let (f, r) = (file + steps[i].0, rank + steps[i].1);
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        masks[sq] = Bitboard(bits);
        sq += 1;
    }
    masks
}

const fn king_steps() -> [(i8, i8); 8] {
    let mut steps = [(0, 0); 8];
    let mut i = 0;
    while i < 8 {
        steps[i] = Direction::ALL[i].delta();
        i += 1;
    }
    steps
}

const fn pawn_capture_masks() -> [[Bitboard; 64]; 2] {
    [
        leaper_masks(&[(-1, 1), (1, 1)]),
        leaper_masks(&[(-1, -1), (1, -1)]),
    ]
}

const fn compute_rays() -> [[Bitboard; 8]; 64] {
    let mut rays = [[Bitboard::EMPTY; 8]; 64];
    let mut sq = 0;
    while sq < 64 {
        let mut d = 0;
        while d < 8 {
            let (df, dr) = Direction::ALL[d].delta();
            let (mut f, mut r) = ((sq & 7) as i8 + df, (sq >> 3) as i8 + dr);
            let mut bits = 0u64;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
                f += df;
                r += dr;
            }
            rays[sq][d] = Bitboard(bits);
            d += 1;
        }
        sq += 1;
    }
    rays
}

/// `DIRECTIONS[from][to]`: direction index from `from` to `to`, or -1 if the
/// squares share no line.
const fn compute_directions() -> [[i8; 64]; 64] {
    let rays = RAYS;
    let mut dirs = [[-1i8; 64]; 64];
    let mut from = 0;
    while from < 64 {
        let mut d = 0;
        while d < 8 {
            let mut ray = rays[from][d].0;
            while ray != 0 {
                dirs[from][ray.trailing_zeros() as usize] = d as i8;
                ray &= ray - 1;
            }
            d += 1;
        }
        from += 1;
    }
    dirs
}

/// `FROM_TO_RAY[from][to]`: squares after `from` up to and including `to`
/// along their shared line, empty if unaligned.
const fn compute_from_to_rays() -> [[Bitboard; 64]; 64] {
    let (rays, dirs) = (RAYS, DIRECTION_TABLE);
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut from = 0;
    while from < 64 {
        let mut to = 0;
        while to < 64 {
            let d = dirs[from][to];
            if d >= 0 {
                // The ray from `from` minus the ray continuing past `to`.
                let beyond = rays[to][d as usize].0;
                table[from][to] = Bitboard(rays[from][d as usize].0 & !beyond);
            }
            to += 1;
        }
        from += 1;
    }
    table
}

pub(crate) const KNIGHT_MASKS: [Bitboard; 64] = leaper_masks(&KNIGHT_STEPS);
pub(crate) const KING_MASKS: [Bitboard; 64] = leaper_masks(&king_steps());
pub(crate) const PAWN_CAPTURES: [[Bitboard; 64]; 2] = pawn_capture_masks();
pub(crate) const RAYS: [[Bitboard; 8]; 64] = compute_rays();
const DIRECTION_TABLE: [[i8; 64]; 64] = compute_directions();
static DIRECTIONS: [[i8; 64]; 64] = DIRECTION_TABLE;
static FROM_TO_RAY: [[Bitboard; 64]; 64] = compute_from_to_rays();

#[inline]
pub fn knight_mask(sq: Square) -> Bitboard {
    KNIGHT_MASKS[sq.idx()]
}

#[inline]
pub fn king_mask(sq: Square) -> Bitboard {
    KING_MASKS[sq.idx()]
}

/// Squares a pawn of `color` standing on `sq` captures on.
#[inline]
pub fn pawn_captures(color: Color, sq: Square) -> Bitboard {
    PAWN_CAPTURES[color.index()][sq.idx()]
}

/// Every square from `sq` to the board edge in `dir`, `sq` excluded.
#[inline]
pub fn ray(sq: Square, dir: Direction) -> Bitboard {
    RAYS[sq.idx()][dir.index()]
}

/// Empty-board rook reach.
#[inline]
pub fn orthogonal_mask(sq: Square) -> Bitboard {
    let r = &RAYS[sq.idx()];
    r[4] | r[5] | r[6] | r[7]
}

/// Empty-board bishop reach.
#[inline]
pub fn diagonal_mask(sq: Square) -> Bitboard {
    let r = &RAYS[sq.idx()];
    r[0] | r[1] | r[2] | r[3]
}

/// Direction leading from `from` to `to`, if they share a rank, file or diagonal.
#[inline]
pub fn direction(from: Square, to: Square) -> Option<Direction> {
    match DIRECTIONS[from.idx()][to.idx()] {
        d if d >= 0 => Some(Direction::ALL[d as usize]),
        _ => None,
    }
}

/// Squares after `from` up to and including `to`.
#[inline]
pub fn from_to_ray(from: Square, to: Square) -> Bitboard {
    FROM_TO_RAY[from.idx()][to.idx()]
}

/// Squares strictly between `a` and `b`; empty when they are unaligned or adjacent.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    FROM_TO_RAY[a.idx()][b.idx()].without(b)
}

/// True when `a`, `b` and `c` lie on one rank, file or diagonal.
#[inline]
pub fn aligned(a: Square, b: Square, c: Square) -> bool {
    match direction(a, b) {
        Some(dir) => (ray(a, dir) | ray(a, dir.opposite())).with(a).contains(c),
        None => false,
    }
}
