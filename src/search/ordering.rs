use std::cmp::Reverse;

use arrayvec::ArrayVec;

use crate::board::{Move, MoveList, SearchBoard, MAX_MOVES};
use crate::search::eval::move_delta;

/// Bonus lifting the transposition-table move ahead of every other move.
pub const TT_MOVE_BONUS: i32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    /// Incremental evaluation change, reused by the search.
    pub delta: i32,
    pub score: i32,
}

pub type ScoredMoves = ArrayVec<ScoredMove, MAX_MOVES>;

/// Ranks `moves` best-first. The sort is stable, so equal scores keep the
/// generator's order.
pub fn order_moves<B: SearchBoard>(board: &B, moves: &MoveList, tt_move: Option<Move>) -> ScoredMoves {
    let mut scored: ScoredMoves = moves
        .iter()
        .map(|&mv| {
            let delta = move_delta(board, mv);
            let bonus = if tt_move == Some(mv) { TT_MOVE_BONUS } else { 0 };
            ScoredMove { mv, delta, score: bonus + delta }
        })
        .collect();
    scored.sort_by_key(|s| Reverse(s.score));
    scored
}
