//! Rotated bitboards and slider attack tables.
//!
//! The occupied set is kept in four bit orders, one per line family. In each
//! order the squares of every rank, file, diagonal or anti-diagonal form one
//! contiguous run of bits, so the occupancy along the line through a square
//! is a shift and a mask away. That byte indexes a table holding the
//! slider's reachable squares, the first blocker in each direction included.
//!
//! | Line          | Run order                                         |
//! |---------------|---------------------------------------------------|
//! | rank          | a1..h1, a2..h2, ... (the plain square order)      |
//! | file          | a1..a8, b1..b8, ...                               |
//! | diagonal      | a8; a7 b8; a6 b7 c8; ... h1 (a1-h8 direction)     |
//! | anti-diagonal | a1; a2 b1; a3 b2 c1; ... h8 (a8-h1 direction)     |

use crate::Bitboard;
use rotchess_core::Square;
use std::sync::OnceLock;
use tracing::debug;

/// A family of lines a slider moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Line {
    Rank = 0,
    File = 1,
    /// a1-h8 direction (45°).
    Diagonal = 2,
    /// a8-h1 direction (315°).
    AntiDiagonal = 3,
}

impl Line {
    pub const ALL: [Line; 4] = [Line::Rank, Line::File, Line::Diagonal, Line::AntiDiagonal];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Where a square sits inside one rotated encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    /// Bit index of the square in the rotated board.
    bit: u8,
    /// Bit index of the first square of the square's line.
    start: u8,
    /// Number of squares on the line.
    len: u8,
    /// Position of the square along its line.
    offset: u8,
}

const fn slot(line: Line, sq: usize) -> Slot {
    let (file, rank) = (sq & 7, sq >> 3);
    match line {
        Line::Rank => Slot {
            bit: sq as u8,
            start: (rank * 8) as u8,
            len: 8,
            offset: file as u8,
        },
        Line::File => Slot {
            bit: (file * 8 + rank) as u8,
            start: (file * 8) as u8,
            len: 8,
            offset: rank as u8,
        },
        Line::Diagonal => {
            // id 0 is the a8 corner, id 14 the h1 corner.
            let id = file + 7 - rank;
            let len = 8 - file.abs_diff(rank);
            let start = run_start(id);
            let offset = if file < rank { file } else { rank };
            Slot {
                bit: (start + offset) as u8,
                start: start as u8,
                len: len as u8,
                offset: offset as u8,
            }
        }
        Line::AntiDiagonal => {
            let id = file + rank;
            let len = 8 - id.abs_diff(7);
            let start = run_start(id);
            let offset = if id > 7 { file - (id - 7) } else { file };
            Slot {
                bit: (start + offset) as u8,
                start: start as u8,
                len: len as u8,
                offset: offset as u8,
            }
        }
    }
}

/// First bit of diagonal run `id`; run `i` holds 8 - |i - 7| squares.
const fn run_start(id: usize) -> usize {
    let mut start = 0;
    let mut i = 0;
    while i < id {
        start += 8 - i.abs_diff(7);
        i += 1;
    }
    start
}

const fn compute_slots() -> [[Slot; 64]; 4] {
    let empty = Slot {
        bit: 0,
        start: 0,
        len: 0,
        offset: 0,
    };
    let mut slots = [[empty; 64]; 4];
    let mut l = 0;
    while l < 4 {
        let mut sq = 0;
        while sq < 64 {
            slots[l][sq] = slot(Line::ALL[l], sq);
            sq += 1;
        }
        l += 1;
    }
    slots
}

static SLOTS: [[Slot; 64]; 4] = compute_slots();

/// Bit of `sq` in the rotated board for `line`.
#[inline]
pub fn rotated_bit(line: Line, sq: Square) -> u64 {
    1u64 << SLOTS[line.index()][sq.idx()].bit
}

/// The occupied set in all four rotated orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RotatedOccupancy {
    boards: [u64; 4],
}

impl RotatedOccupancy {
    pub const EMPTY: RotatedOccupancy = RotatedOccupancy { boards: [0; 4] };

    /// Flips `sq` in every encoding.
    #[inline]
    pub fn toggle(&mut self, sq: Square) {
        for line in Line::ALL {
            self.boards[line.index()] ^= rotated_bit(line, sq);
        }
    }

    /// A copy with `sq` flipped, used for "what if this piece were gone" probes.
    #[inline]
    pub fn toggled(mut self, sq: Square) -> Self {
        self.toggle(sq);
        self
    }

    /// The occupied set in square order.
    #[inline]
    pub fn blocker(&self) -> Bitboard {
        Bitboard(self.boards[Line::Rank.index()])
    }

    /// The raw rotated board for `line`.
    #[inline]
    pub fn rotated(&self, line: Line) -> u64 {
        self.boards[line.index()]
    }

    /// Occupancy of the line through `sq`, as a byte with bit `i` standing
    /// for the line's `i`-th square.
    #[inline]
    pub fn line_byte(&self, line: Line, sq: Square) -> u8 {
        let slot = SLOTS[line.index()][sq.idx()];
        let mask = (1u64 << slot.len) - 1;
        ((self.boards[line.index()] >> slot.start) & mask) as u8
    }
}

impl From<Bitboard> for RotatedOccupancy {
    fn from(occupied: Bitboard) -> Self {
        let mut occ = RotatedOccupancy::EMPTY;
        for sq in occupied {
            occ.toggle(sq);
        }
        occ
    }
}

/// Precomputed slider reach, `[line][square][occupancy byte]`.
pub struct AttackTables {
    attacks: Vec<Bitboard>,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

/// The shared tables, built on first use.
pub fn attack_tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(AttackTables::build)
}

impl AttackTables {
    fn build() -> Self {
        let mut attacks = vec![Bitboard::EMPTY; 4 * 64 * 256];
        for line in Line::ALL {
            for sq in Square::all() {
                let members = line_members(line, sq);
                let slot = SLOTS[line.index()][sq.idx()];
                for occupancy in 0..(1usize << slot.len) {
                    attacks[Self::index(line, sq, occupancy as u8)] =
                        walk(&members, slot.offset as usize, occupancy);
                }
            }
        }
        debug!(entries = attacks.len(), "built rotated attack tables");
        AttackTables { attacks }
    }

    #[inline]
    fn index(line: Line, sq: Square, occupancy: u8) -> usize {
        (line.index() * 64 + sq.idx()) * 256 + occupancy as usize
    }

    /// Squares a slider on `sq` reaches along `line`.
    #[inline]
    pub fn line_attacks(&self, line: Line, sq: Square, occ: &RotatedOccupancy) -> Bitboard {
        self.attacks[Self::index(line, sq, occ.line_byte(line, sq))]
    }

    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occ: &RotatedOccupancy) -> Bitboard {
        self.line_attacks(Line::Diagonal, sq, occ) | self.line_attacks(Line::AntiDiagonal, sq, occ)
    }

    #[inline]
    pub fn rook_attacks(&self, sq: Square, occ: &RotatedOccupancy) -> Bitboard {
        self.line_attacks(Line::Rank, sq, occ) | self.line_attacks(Line::File, sq, occ)
    }

    #[inline]
    pub fn queen_attacks(&self, sq: Square, occ: &RotatedOccupancy) -> Bitboard {
        self.bishop_attacks(sq, occ) | self.rook_attacks(sq, occ)
    }
}

/// The squares of the `line` through `sq`, in rotated-bit order.
fn line_members(line: Line, sq: Square) -> Vec<Square> {
    let slot = SLOTS[line.index()][sq.idx()];
    let mut members: Vec<Square> = Square::all()
        .filter(|&other| {
            let s = SLOTS[line.index()][other.idx()];
            s.start == slot.start
        })
        .collect();
    members.sort_by_key(|&other| SLOTS[line.index()][other.idx()].offset);
    members
}

/// Reach from position `from` along `members`, stopping on (and including)
/// the first occupied square each way.
fn walk(members: &[Square], from: usize, occupancy: usize) -> Bitboard {
    let mut reach = Bitboard::EMPTY;
    for i in (from + 1)..members.len() {
        reach.set(members[i]);
        if occupancy >> i & 1 == 1 {
            break;
        }
    }
    for i in (0..from).rev() {
        reach.set(members[i]);
        if occupancy >> i & 1 == 1 {
            break;
        }
    }
    reach
}

#[inline]
pub fn bishop_attacks(sq: Square, occ: &RotatedOccupancy) -> Bitboard {
    attack_tables().bishop_attacks(sq, occ)
}

#[inline]
pub fn rook_attacks(sq: Square, occ: &RotatedOccupancy) -> Bitboard {
    attack_tables().rook_attacks(sq, occ)
}

#[inline]
pub fn queen_attacks(sq: Square, occ: &RotatedOccupancy) -> Bitboard {
    attack_tables().queen_attacks(sq, occ)
}
