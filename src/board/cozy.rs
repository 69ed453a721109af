use cozy_chess::{BitBoard, Board as CozyBoard, Color, File, Piece, Square};

use super::{Move, MoveFlag, MoveList, SearchBoard};
use crate::error::{EngineError, Result};

/// Game-level adjudication. Repetition here means threefold; inside the
/// search tree [`SearchBoard::is_draw`] already scores a twofold repetition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    Repetition,
    FiftyMoveRule,
    InsufficientMaterial,
}

/// A cozy-chess board with make/undo and the hash history needed for
/// repetition detection.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    undo: Vec<CozyBoard>,
    history: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(CozyBoard::default())
    }

    pub fn from_board(board: CozyBoard) -> Self {
        Self { board, undo: Vec::with_capacity(256), history: Vec::with_capacity(256) }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        CozyBoard::from_fen(fen, false)
            .map(Self::from_board)
            .map_err(|e| EngineError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    pub fn board(&self) -> &CozyBoard {
        &self.board
    }

    pub fn fen(&self) -> String {
        format!("{}", self.board)
    }

    pub fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_moves(false, &mut moves);
        moves
    }

    /// Looks up a legal move by UCI text. Castling is accepted both as the
    /// king's two-square move (`e1g1`) and as king-takes-rook (`e1h1`).
    pub fn find_move(&self, uci: &str) -> Option<Move> {
        self.legal_moves()
            .into_iter()
            .find(|m| m.to_string() == uci || m.to_cozy().to_string() == uci)
    }

    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move> {
        let mv = self.find_move(uci).ok_or_else(|| EngineError::IllegalMove(uci.to_string()))?;
        self.make_move(mv);
        Ok(mv)
    }

    pub fn set_from_start_and_moves(moves: &[String]) -> Result<Self> {
        let mut pos = Self::startpos();
        for m in moves {
            pos.make_move_uci(m)?;
        }
        Ok(pos)
    }

    pub fn from_fen_and_moves(fen: &str, moves: &[String]) -> Result<Self> {
        let mut pos = Self::from_fen(fen)?;
        for m in moves {
            pos.make_move_uci(m)?;
        }
        Ok(pos)
    }

    /// The same position with colors swapped and the board flipped vertically.
    pub fn mirrored(&self) -> Result<Self> {
        Self::from_fen(&mirror_fen(&self.fen()))
    }

    pub fn status(&self) -> GameStatus {
        if !self.has_legal_moves() {
            return if self.in_check() { GameStatus::Checkmate } else { GameStatus::Stalemate };
        }
        if self.board.halfmove_clock() >= 100 {
            GameStatus::FiftyMoveRule
        } else if self.insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if self.repetitions() >= 2 {
            GameStatus::Repetition
        } else {
            GameStatus::Ongoing
        }
    }

    fn has_legal_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|moves| {
            if !moves.is_empty() {
                any = true;
            }
            any
        });
        any
    }

    /// Earlier occurrences of the current position since the last
    /// irreversible move.
    fn repetitions(&self) -> usize {
        let key = self.board.hash();
        let window = (self.board.halfmove_clock() as usize).min(self.history.len());
        self.history.iter().rev().take(window).skip(1).step_by(2).filter(|&&h| h == key).count()
    }

    fn insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let knights = b.pieces(Piece::Knight);
        let bishops = b.pieces(Piece::Bishop);
        if knights.len() + bishops.len() <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }
        let mut shades = bishops.into_iter().map(|sq| (sq.file() as usize + sq.rank() as usize) % 2);
        match shades.next() {
            Some(first) => shades.all(|s| s == first),
            None => true,
        }
    }
}

fn describe(board: &CozyBoard, piece: Piece, mv: cozy_chess::Move) -> Move {
    let us = board.side_to_move();
    if piece == Piece::King && board.colors(us).has(mv.to) {
        let file = if (mv.to.file() as usize) > (mv.from.file() as usize) { File::G } else { File::C };
        return Move {
            from: mv.from,
            to: Square::new(file, mv.from.rank()),
            piece,
            captured: None,
            promotion: None,
            flag: MoveFlag::Castle,
        };
    }
    let captured = board.piece_on(mv.to);
    if piece == Piece::Pawn && captured.is_none() && mv.from.file() != mv.to.file() {
        return Move {
            from: mv.from,
            to: mv.to,
            piece,
            captured: Some(Piece::Pawn),
            promotion: None,
            flag: MoveFlag::EnPassant,
        };
    }
    Move { from: mv.from, to: mv.to, piece, captured, promotion: mv.promotion, flag: MoveFlag::Normal }
}

impl SearchBoard for Position {
    fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    fn generate_moves(&self, captures_only: bool, out: &mut MoveList) {
        out.clear();
        let board = &self.board;
        board.generate_moves(|moves| {
            for m in moves {
                let Some(piece) = board.piece_on(m.from) else { continue };
                let mv = describe(board, piece, m);
                if !captures_only || mv.is_capture() {
                    out.push(mv);
                }
            }
            false
        });
    }

    fn make_move(&mut self, mv: Move) {
        self.history.push(self.board.hash());
        self.undo.push(self.board.clone());
        self.board.play_unchecked(mv.to_cozy());
    }

    fn undo_move(&mut self, _mv: Move) {
        if let Some(prev) = self.undo.pop() {
            self.board = prev;
            self.history.pop();
        }
    }

    fn is_draw(&self) -> bool {
        if self.board.halfmove_clock() >= 100 || self.insufficient_material() || self.repetitions() >= 1 {
            return true;
        }
        !self.in_check() && !self.has_legal_moves()
    }

    fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_moves()
    }

    fn hash(&self) -> u64 {
        self.board.hash()
    }

    fn ply_count(&self) -> u32 {
        let full = (self.board.fullmove_number() as u32).saturating_sub(1);
        full * 2 + u32::from(self.board.side_to_move() == Color::Black)
    }

    fn pieces(&self, color: Color, piece: Piece) -> BitBoard {
        self.board.colors(color) & self.board.pieces(piece)
    }
}

fn swap_case(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_uppercase() { c.to_ascii_lowercase() } else { c.to_ascii_uppercase() })
        .collect()
}

fn mirror_fen(fen: &str) -> String {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let field = |i: usize, default: &'static str| fields.get(i).copied().unwrap_or(default);

    let placement = field(0, "8/8/8/8/8/8/8/8").split('/').rev().map(swap_case).collect::<Vec<_>>().join("/");
    let stm = if field(1, "w") == "w" { "b" } else { "w" };
    let castling = match field(2, "-") {
        "-" => "-".to_string(),
        rights => {
            let swapped = swap_case(rights);
            "KQkq".chars().filter(|c| swapped.contains(*c)).collect()
        }
    };
    let ep = match field(3, "-") {
        "-" => "-".to_string(),
        sq => sq.chars().map(|c| match c { '3' => '6', '6' => '3', other => other }).collect(),
    };
    format!("{} {} {} {} {} {}", placement, stm, castling, ep, field(4, "0"), field(5, "1"))
}
