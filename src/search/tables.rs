//! Bit-packed piece-square tables.
//!
//! Each piece kind has 8 rank words. A word holds four signed 16-bit values
//! for files a..d; files e..h mirror d..a. Rows are written from White's
//! side with row 0 being the eighth rank, so White pieces index row
//! `7 - rank` and Black pieces index row `rank`.

use cozy_chess::{Color, Piece, Square};

pub const PIECE_KINDS: usize = 6;
pub const RANKS: usize = 8;
pub const PACKED_FILES: usize = 4;

pub type Unpacked = [[i16; RANKS * PACKED_FILES]; PIECE_KINDS];
pub type Packed = [[u64; RANKS]; PIECE_KINDS];

#[rustfmt::skip]
const RAW: Unpacked = [
    // pawn
    [
          0,   0,   0,   0,
        150, 150, 150, 150,
        110, 110, 120, 130,
        105, 105, 110, 125,
        100, 100, 100, 130,
        105,  95,  90, 100,
        105, 110, 110,  80,
          0,   0,   0,   0,
    ],
    // knight
    [
        270, 280, 290, 290,
        280, 300, 320, 320,
        290, 320, 330, 335,
        290, 325, 335, 340,
        290, 320, 335, 340,
        290, 325, 330, 335,
        280, 300, 320, 325,
        270, 280, 290, 290,
    ],
    // bishop
    [
        310, 320, 320, 320,
        320, 330, 330, 330,
        320, 330, 335, 340,
        320, 335, 335, 340,
        320, 330, 340, 340,
        320, 340, 340, 340,
        320, 335, 330, 330,
        310, 320, 320, 320,
    ],
    // rook
    [
        500, 500, 500, 500,
        505, 510, 510, 510,
        495, 500, 500, 500,
        495, 500, 500, 500,
        495, 500, 500, 500,
        495, 500, 500, 500,
        495, 500, 500, 500,
        500, 500, 500, 505,
    ],
    // queen
    [
        880, 890, 890, 895,
        890, 900, 900, 900,
        890, 900, 905, 905,
        895, 900, 905, 905,
        900, 900, 905, 905,
        890, 905, 905, 905,
        890, 900, 905, 900,
        880, 890, 890, 895,
    ],
    // king
    [
        -30, -40, -40, -50,
        -30, -40, -40, -50,
        -30, -40, -40, -50,
        -30, -40, -40, -50,
        -20, -30, -30, -40,
        -10, -20, -20, -20,
         20,  20,   0,   0,
         20,  30,  10,   0,
    ],
];

pub const PACKED: Packed = pack(&RAW);

pub const fn pack(values: &Unpacked) -> Packed {
    let mut out = [[0u64; RANKS]; PIECE_KINDS];
    let mut p = 0;
    while p < PIECE_KINDS {
        let mut r = 0;
        while r < RANKS {
            let mut word = 0u64;
            let mut f = 0;
            while f < PACKED_FILES {
                word |= (values[p][r * PACKED_FILES + f] as u16 as u64) << (16 * f);
                f += 1;
            }
            out[p][r] = word;
            r += 1;
        }
        p += 1;
    }
    out
}

pub const fn unpack(packed: &Packed) -> Unpacked {
    let mut out = [[0i16; RANKS * PACKED_FILES]; PIECE_KINDS];
    let mut p = 0;
    while p < PIECE_KINDS {
        let mut r = 0;
        while r < RANKS {
            let mut f = 0;
            while f < PACKED_FILES {
                out[p][r * PACKED_FILES + f] = (packed[p][r] >> (16 * f)) as u16 as i16;
                f += 1;
            }
            r += 1;
        }
        p += 1;
    }
    out
}

/// Table value for a piece on (`file`, `row`); `row` is already mirrored
/// for color. Files 4..7 fold onto 3..0.
#[inline]
pub fn value(piece: Piece, file: usize, row: usize) -> i32 {
    let folded = file.min(7 - file);
    (PACKED[piece as usize][row] >> (16 * folded)) as u16 as i16 as i32
}

#[inline]
pub fn square_value(color: Color, piece: Piece, square: Square) -> i32 {
    let rank = square.rank() as usize;
    let row = match color {
        Color::White => 7 - rank,
        Color::Black => rank,
    };
    value(piece, square.file() as usize, row)
}
