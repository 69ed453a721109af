//! Board collaborator boundary.
//!
//! The search core never touches a concrete board type directly. It talks to
//! anything implementing [`SearchBoard`]: legal move generation, make/undo,
//! terminal detection and a position hash. [`cozy::Position`] is the
//! production implementation on top of `cozy-chess`.

pub mod cozy;

use std::fmt;

use arrayvec::ArrayVec;
use cozy_chess::{BitBoard, Color, File, Piece, Square};

/// Upper bound on legal moves in any reachable chess position.
pub const MAX_MOVES: usize = 218;

pub type MoveList = ArrayVec<Move, MAX_MOVES>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    Normal,
    EnPassant,
    Castle,
}

/// A fully described move. For castling `to` is the king's destination
/// square (g- or c-file), not the rook square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<Piece>,
    pub flag: MoveFlag,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Square the captured piece stands on. Differs from `to` only for en passant.
    pub fn capture_square(&self) -> Square {
        match self.flag {
            MoveFlag::EnPassant => Square::new(self.to.file(), self.from.rank()),
            _ => self.to,
        }
    }

    /// Rook (from, to) squares of a castling move.
    pub fn castle_rook_squares(&self) -> Option<(Square, Square)> {
        if self.flag != MoveFlag::Castle {
            return None;
        }
        let rank = self.from.rank();
        if self.to.file() == File::G {
            Some((Square::new(File::H, rank), Square::new(File::F, rank)))
        } else {
            Some((Square::new(File::A, rank), Square::new(File::D, rank)))
        }
    }

    /// The collaborator's native encoding (castling is king-takes-rook in cozy-chess).
    pub fn to_cozy(&self) -> cozy_chess::Move {
        let to = match self.castle_rook_squares() {
            Some((rook_from, _)) => rook_from,
            None => self.to,
        };
        cozy_chess::Move { from: self.from, to, promotion: self.promotion }
    }
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", piece_char(p))?;
        }
        Ok(())
    }
}

/// Services the search needs from a board. Implementations must keep
/// `make_move`/`undo_move` strictly paired (stack order).
pub trait SearchBoard {
    fn side_to_move(&self) -> Color;

    /// Clears `out` and fills it with legal moves, or only captures
    /// (en passant included) when `captures_only` is set.
    fn generate_moves(&self, captures_only: bool, out: &mut MoveList);

    fn make_move(&mut self, mv: Move);

    fn undo_move(&mut self, mv: Move);

    /// Repetition, fifty-move rule, insufficient material or stalemate.
    fn is_draw(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn hash(&self) -> u64;

    /// Half-moves since the start of the game.
    fn ply_count(&self) -> u32;

    fn pieces(&self, color: Color, piece: Piece) -> BitBoard;
}
