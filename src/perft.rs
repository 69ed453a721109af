// Perft over the search board interface, make/undo without cloning.
use rayon::prelude::*;

use crate::board::{Move, MoveList, SearchBoard};

pub fn perft<B: SearchBoard>(board: &mut B, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = MoveList::new();
    board.generate_moves(false, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for &mv in &moves {
        board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.undo_move(mv);
    }
    nodes
}

/// Node count below each root move.
pub fn divide<B: SearchBoard>(board: &mut B, depth: u32) -> Vec<(Move, u64)> {
    let mut moves = MoveList::new();
    board.generate_moves(false, &mut moves);
    let mut out = Vec::with_capacity(moves.len());
    for &mv in &moves {
        board.make_move(mv);
        out.push((mv, perft(board, depth.saturating_sub(1))));
        board.undo_move(mv);
    }
    out
}

// Root-split across the current rayon pool; each worker owns a copy of the board.
pub fn perft_parallel<B: SearchBoard + Clone + Send + Sync>(board: &B, depth: u32) -> u64 {
    if depth <= 1 {
        return perft(&mut board.clone(), depth);
    }
    let mut moves = MoveList::new();
    board.generate_moves(false, &mut moves);
    moves
        .par_iter()
        .map(|&mv| {
            let mut b = board.clone();
            b.make_move(mv);
            perft(&mut b, depth - 1)
        })
        .sum()
}
