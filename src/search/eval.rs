use cozy_chess::{Color, Piece};

use crate::board::{Move, SearchBoard};
use crate::search::tables::square_value;

// Mate scoring helpers
pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;
pub const INFINITY: i32 = 32_000;
pub const MAX_PLY: i32 = 256;

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_SCORE - MAX_PLY
}

/// Static evaluation from `color`'s point of view.
pub fn eval_cp_for<B: SearchBoard>(board: &B, color: Color) -> i32 {
    let mut score = 0;
    for side in [Color::White, Color::Black] {
        let sign = if side == color { 1 } else { -1 };
        for piece in Piece::ALL {
            for sq in board.pieces(side, piece) {
                score += sign * square_value(side, piece, sq);
            }
        }
    }
    score
}

/// Static evaluation from the side to move's perspective (negamax-friendly).
pub fn eval_cp<B: SearchBoard>(board: &B) -> i32 {
    eval_cp_for(board, board.side_to_move())
}

/// Change in the mover's evaluation caused by `mv`, computed before the move
/// is made. Adding it to `eval_cp(board)` gives the mover's score after the
/// move; the opponent sees the negation.
pub fn move_delta<B: SearchBoard>(board: &B, mv: Move) -> i32 {
    let us = board.side_to_move();
    let landed = mv.promotion.unwrap_or(mv.piece);
    let mut delta = square_value(us, landed, mv.to) - square_value(us, mv.piece, mv.from);
    if let Some(captured) = mv.captured {
        delta += square_value(!us, captured, mv.capture_square());
    }
    if let Some((rook_from, rook_to)) = mv.castle_rook_squares() {
        delta += square_value(us, Piece::Rook, rook_to) - square_value(us, Piece::Rook, rook_from);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::cozy::Position;

    #[test]
    fn startpos_is_balanced() {
        let pos = Position::startpos();
        assert_eq!(eval_cp(&pos), 0);
    }

    #[test]
    fn perspectives_are_negations() {
        let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3").unwrap();
        assert_eq!(eval_cp_for(&pos, Color::White), -eval_cp_for(&pos, Color::Black));
    }

    #[test]
    fn mate_scores_dominate_material() {
        // Everything White could ever own, on its best squares.
        let ceiling = 9 * 905 + 2 * 510 + 2 * 340 + 2 * 340 + 30;
        assert!(ceiling < MATE_SCORE - MAX_PLY);
        assert!(is_mate_score(MATE_SCORE - 3));
        assert!(is_mate_score(-MATE_SCORE + 10));
        assert!(!is_mate_score(ceiling));
    }

    #[test]
    fn capture_delta_counts_victim() {
        let pos = Position::from_fen("k7/8/8/8/8/8/3qQ3/7K w - - 0 1").unwrap();
        let mv = pos.find_move("e2d2").unwrap();
        let d = move_delta(&pos, mv);
        // Queen leaves e2 for d2 and removes a queen worth at least 880.
        assert!(d >= 880, "capture delta too small: {d}");
    }
}
